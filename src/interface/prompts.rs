use dialoguer::{Confirm, Input, Select};

use crate::error::{NutriError, Result};
use crate::models::{IngredientProfile, Macros};
use crate::state::Catalog;

/// Parse a non-negative, finite amount.
pub fn parse_amount(input: &str) -> Result<f64> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| NutriError::InvalidInput(format!("Invalid number: '{}'", input.trim())))?;

    if !value.is_finite() || value < 0.0 {
        return Err(NutriError::InvalidInput(format!(
            "Amount must be a non-negative number, got {}",
            value
        )));
    }
    Ok(value)
}

/// Parse a comma-separated list of gram amounts, e.g. `"100, 250,0"`.
pub fn parse_amount_list(input: &str) -> Result<Vec<f64>> {
    input
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(parse_amount)
        .collect()
}

/// Split a comma-separated list of names, dropping blanks.
pub fn parse_name_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn prompt_amount(prompt: &str, default: &str) -> Result<f64> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?;
    parse_amount(&input)
}

/// Prompt for the four target macros.
pub fn prompt_target() -> Result<Macros> {
    let calories = prompt_amount("Target calories (kcal)", "2000")?;
    let proteins = prompt_amount("Target proteins (g)", "100")?;
    let fats = prompt_amount("Target fats (g)", "70")?;
    let carbs = prompt_amount("Target carbs (g)", "250")?;
    Ok(Macros::new(calories, proteins, fats, carbs))
}

/// Ask which ingredient a typed name refers to.
///
/// Exact (case-insensitive) names are taken directly; otherwise fuzzy
/// candidates are offered for confirmation.
fn resolve_name<'a>(catalog: &'a Catalog, input: &str) -> Result<Option<&'a IngredientProfile>> {
    if let Some(ingredient) = catalog.get_by_name(input) {
        return Ok(Some(ingredient));
    }

    let candidates = catalog.fuzzy_matches(input);
    match candidates.as_slice() {
        [] => {
            println!("No matching ingredient found for '{}'", input);
            Ok(None)
        }
        [(ingredient, _)] => {
            let confirm = Confirm::new()
                .with_prompt(format!("Did you mean '{}'?", ingredient.label()))
                .default(true)
                .interact()?;
            Ok(confirm.then_some(*ingredient))
        }
        _ => {
            let shown: Vec<&IngredientProfile> = candidates.iter().take(5).map(|(i, _)| *i).collect();
            let mut options: Vec<String> = shown.iter().map(|i| i.label()).collect();
            options.push("None of these".to_string());

            let selection = Select::new()
                .with_prompt("Which did you mean?")
                .items(&options)
                .default(0)
                .interact()?;
            Ok(shown.get(selection).copied())
        }
    }
}

/// Collect ingredients to blend; an empty selection means the whole catalog.
pub fn prompt_ingredients(catalog: &Catalog) -> Result<Vec<IngredientProfile>> {
    let mut chosen: Vec<IngredientProfile> = Vec::new();

    loop {
        let input: String = Input::new()
            .with_prompt("Add ingredients, comma-separated (or press Enter to finish)")
            .allow_empty(true)
            .interact_text()?;

        let names = parse_name_list(&input);
        if names.is_empty() {
            break;
        }

        for name in &names {
            match resolve_name(catalog, name)? {
                Some(ingredient) if chosen.iter().any(|c| c.id == ingredient.id) => {
                    println!("Already added: {}", ingredient.label());
                }
                Some(ingredient) => {
                    println!("Added: {}", ingredient.label());
                    chosen.push(ingredient.clone());
                }
                None => {}
            }
        }
    }

    if chosen.is_empty() {
        println!("No ingredients chosen; using all {} from the catalog.", catalog.len());
        return Ok(catalog.all().to_vec());
    }
    Ok(chosen)
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
