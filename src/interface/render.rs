use crate::models::{Blend, Macros, RankedRecipe};

fn signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{:.1}%", value)
    } else {
        format!("{:.1}%", value)
    }
}

/// Column width for names, counted in characters.
fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(|n| n.chars().count()).max().unwrap_or(0).max(10)
}

fn macro_row(label: &str, grams: &str, m: &Macros, width: usize) -> String {
    format!(
        "{:<width$} {:>8} {:>9.1} {:>9.1} {:>8.1} {:>8.1}",
        label,
        grams,
        m.calories,
        m.proteins,
        m.fats,
        m.carbs,
        width = width
    )
}

/// Display a blend as an aligned table with totals and deviations.
pub fn display_blend(blend: &Blend) {
    if blend.is_empty() {
        println!("Empty blend.");
        return;
    }

    let width = name_width(blend.ingredients.iter().map(|e| e.name.as_str()));

    println!();
    println!("=== Blend ({} ingredients) ===", blend.len());
    println!();
    println!(
        "{:<width$} {:>8} {:>9} {:>9} {:>8} {:>8}",
        "Ingredient",
        "Grams",
        "Kcal",
        "Protein",
        "Fat",
        "Carbs",
        width = width
    );

    for entry in &blend.ingredients {
        let n = &entry.nutrition;
        println!(
            "{:<width$} {:>8.0} {:>9.1} {:>9.1} {:>8.1} {:>8.1}",
            entry.name,
            entry.grams,
            n.calories,
            n.proteins,
            n.fats,
            n.carbs,
            width = width
        );
    }

    println!("{}", "-".repeat(width + 46));
    let weight = format!("{:.0}", blend.total_weight);
    println!("{}", macro_row("Total", &weight, &blend.total_nutrition, width));
    println!("{}", macro_row("Target", "", &blend.target_nutrition, width));

    let d = &blend.deviations;
    println!(
        "{:<width$} {:>8} {:>9} {:>9} {:>8} {:>8}",
        "Deviation",
        "",
        signed(d.calories),
        signed(d.proteins),
        signed(d.fats),
        signed(d.carbs),
        width = width
    );
    println!();
}

/// Display ranked recipes with their similarity diagnostics.
pub fn display_ranked_recipes(ranked: &[RankedRecipe]) {
    if ranked.is_empty() {
        println!("No similar recipes found.");
        return;
    }

    println!();
    println!("=== Similar Recipes ===");
    println!();

    for (i, recipe) in ranked.iter().enumerate() {
        println!("{:>3}. {} (score {:.2})", i + 1, recipe.name, recipe.score);
        println!(
            "     {} matching | {:.1}% of ingredients | {:.1}% of weight | {:.0} g",
            recipe.matching_count, recipe.match_percentage, recipe.weight_coverage, recipe.recipe_weight
        );
        let n = &recipe.nutrition;
        println!(
            "     {:.1} kcal, P:{:.1} F:{:.1} C:{:.1}",
            n.calories, n.proteins, n.fats, n.carbs
        );
    }

    println!();
}
