pub mod cli;
pub mod error;
pub mod interface;
pub mod models;
pub mod planner;
pub mod state;

pub use error::{BlendError, NutriError, Result};
pub use models::{Blend, BlendReport, IngredientProfile, Macros, RankedRecipe, RecipeProfile};
pub use planner::{rank, solve, solve_with};
