mod blend;
pub(crate) mod ingredient;
mod recipe;

pub use blend::{Blend, BlendEntry, BlendReport};
pub use ingredient::{IngredientId, IngredientProfile, Macros};
pub use recipe::{RankedRecipe, Recipe, RecipeAmount, RecipeItem, RecipeProfile};
