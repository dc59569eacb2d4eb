use clap::Parser;
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use nutri_blend_rs::cli::{Cli, Command, SolverArgs};
use nutri_blend_rs::error::{NutriError, Result};
use nutri_blend_rs::interface::{
    display_blend, display_ranked_recipes, parse_amount_list, prompt_ingredients, prompt_target,
    prompt_yes_no,
};
use nutri_blend_rs::models::{Blend, BlendReport, Macros, RecipeProfile};
use nutri_blend_rs::planner::{rank, solve, solve_with, SolverOptions, DEFAULT_TOP_N};
use nutri_blend_rs::state::{
    load_blend, load_ingredients, load_recipes, save_blend, write_blend_csv, Catalog,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_default();

    match command {
        Command::Plan => cmd_plan(&cli.ingredients, &cli.recipes),
        Command::Solve {
            calories,
            proteins,
            fats,
            carbs,
            names,
            prior,
            top,
            json,
            csv,
            solver,
        } => cmd_solve(
            &cli.ingredients,
            &cli.recipes,
            Macros::new(calories, proteins, fats, carbs),
            &names,
            prior.as_deref(),
            top,
            json.as_deref(),
            csv.as_deref(),
            &solver,
        ),
        Command::Rank { blend, top } => cmd_rank(&cli.ingredients, &cli.recipes, &blend, top),
    }
}

fn load_catalog(file_path: &str) -> Result<Catalog> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(NutriError::InvalidInput(format!(
            "Ingredient catalog not found: {}",
            file_path
        )));
    }
    Ok(Catalog::new(load_ingredients(path)?))
}

/// Recipes resolved against the catalog; a missing recipe file means none.
fn load_recipe_profiles(file_path: &str, catalog: &Catalog) -> Result<Vec<RecipeProfile>> {
    let path = Path::new(file_path);
    if !path.exists() {
        warn!(path = file_path, "recipe catalog not found; skipping ranking");
        return Ok(Vec::new());
    }

    let profiles = load_recipes(path)?
        .iter()
        .filter_map(|recipe| match catalog.recipe_profile(recipe) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(recipe = recipe.id, error = %e, "skipping recipe");
                None
            }
        })
        .collect();
    Ok(profiles)
}

fn show_similar_recipes(blend: &Blend, recipes_path: &str, catalog: &Catalog, top: usize) -> Result<()> {
    let recipes = load_recipe_profiles(recipes_path, catalog)?;
    if recipes.is_empty() {
        return Ok(());
    }
    display_ranked_recipes(&rank(&blend.grams_by_id(), &recipes, top));
    Ok(())
}

/// Interactively pick targets and ingredients, then solve.
fn cmd_plan(ingredients_path: &str, recipes_path: &str) -> Result<()> {
    let catalog = load_catalog(ingredients_path)?;
    println!("Loaded {} ingredients", catalog.len());
    println!();

    let target = prompt_target()?;
    let profiles = prompt_ingredients(&catalog)?;

    println!();
    println!("Solving a blend of {} ingredients...", profiles.len());

    let result = solve(&profiles, &target, None);
    let report = BlendReport::from(&result);
    let blend = result?;

    display_blend(&blend);
    show_similar_recipes(&blend, recipes_path, &catalog, DEFAULT_TOP_N)?;

    if prompt_yes_no("Save this blend?", false)? {
        let path = "blend.json";
        save_blend(path, &report)?;
        println!("Blend saved to {}.", path);
    }

    Ok(())
}

/// Solve a blend from command-line targets.
#[allow(clippy::too_many_arguments)]
fn cmd_solve(
    ingredients_path: &str,
    recipes_path: &str,
    target: Macros,
    names: &[String],
    prior: Option<&str>,
    top: usize,
    json_path: Option<&str>,
    csv_path: Option<&str>,
    solver: &SolverArgs,
) -> Result<()> {
    let catalog = load_catalog(ingredients_path)?;
    let profiles = if names.is_empty() {
        catalog.all().to_vec()
    } else {
        catalog.select(names)?
    };
    let prior = prior.map(parse_amount_list).transpose()?;

    let options = SolverOptions {
        max_iterations: solver.max_iter,
        tolerance: solver.tolerance,
    };
    let result = solve_with(&profiles, &target, prior.as_deref(), &options);

    if let Some(path) = json_path {
        save_blend(path, &BlendReport::from(&result))?;
        println!("Result saved to {}.", path);
    }

    let blend = result?;
    display_blend(&blend);

    if let Some(path) = csv_path {
        write_blend_csv(&blend, path)?;
        println!("Blend exported to {}.", path);
    }

    show_similar_recipes(&blend, recipes_path, &catalog, top)
}

/// Rank recipes against a saved blend.
fn cmd_rank(ingredients_path: &str, recipes_path: &str, blend_path: &str, top: usize) -> Result<()> {
    let report = load_blend(blend_path)?;
    let Some(blend) = report.into_blend() else {
        return Err(NutriError::InvalidInput(format!(
            "{} holds no successful blend",
            blend_path
        )));
    };

    let catalog = load_catalog(ingredients_path)?;
    display_blend(&blend);
    show_similar_recipes(&blend, recipes_path, &catalog, top)
}
