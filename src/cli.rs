use clap::{Parser, Subcommand};

use crate::planner::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, DEFAULT_TOP_N};

/// NutriBlend: solve ingredient amounts for macro targets and find similar recipes.
#[derive(Parser, Debug)]
#[command(name = "nutri_blend")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the ingredient catalog JSON file.
    #[arg(short, long, default_value = "ingredients.json", global = true)]
    pub ingredients: String,

    /// Path to the recipe catalog JSON file.
    #[arg(short, long, default_value = "recipes.json", global = true)]
    pub recipes: String,
}

/// Solver overrides shared by the solving subcommands.
#[derive(clap::Args, Debug, Clone)]
pub struct SolverArgs {
    /// Maximum solver iterations.
    #[arg(long = "max-iter", default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iter: usize,

    /// Relative stationarity tolerance of the solver.
    #[arg(long = "tol", default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: f64,
}

#[derive(Subcommand, Debug, Default)]
pub enum Command {
    /// Interactively choose targets and ingredients, then solve a blend.
    #[default]
    Plan,

    /// Solve a blend from command-line targets.
    Solve {
        /// Target calories (kcal).
        #[arg(long)]
        calories: f64,

        /// Target proteins (g).
        #[arg(long)]
        proteins: f64,

        /// Target fats (g).
        #[arg(long)]
        fats: f64,

        /// Target carbs (g).
        #[arg(long)]
        carbs: f64,

        /// Ingredient names to blend, comma-separated (default: whole catalog).
        #[arg(long = "use", value_delimiter = ',')]
        names: Vec<String>,

        /// Previous gram amounts in ingredient order, comma-separated.
        #[arg(long)]
        prior: Option<String>,

        /// Number of similar recipes to show.
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,

        /// Save the result as JSON.
        #[arg(long)]
        json: Option<String>,

        /// Export the blend as CSV.
        #[arg(long)]
        csv: Option<String>,

        #[command(flatten)]
        solver: SolverArgs,
    },

    /// Rank recipes against a saved blend.
    Rank {
        /// Path to a blend saved with `solve --json`.
        #[arg(long)]
        blend: String,

        /// Number of recipes to show.
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },
}
