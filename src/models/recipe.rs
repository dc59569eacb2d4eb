use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{IngredientId, Macros};

fn default_amount() -> f64 {
    100.0
}

/// Grams of one ingredient used by a stored recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeAmount {
    pub ingredient_id: IngredientId,

    #[serde(default = "default_amount")]
    pub amount_grams: f64,
}

/// A recipe as stored in the recipe catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: u32,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub ingredients: Vec<RecipeAmount>,
}

/// An ingredient line of a recipe resolved against the ingredient catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeItem {
    pub ingredient_id: IngredientId,
    /// Grams used; zero means listed but not used.
    pub grams: f64,
    pub per_100g: Macros,
}

/// What the ranker needs to know about a recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeProfile {
    pub id: u32,
    pub name: String,
    pub items: Vec<RecipeItem>,
}

impl RecipeProfile {
    /// Distinct ingredient ids listed by the recipe, used or not.
    pub fn ingredient_ids(&self) -> BTreeSet<IngredientId> {
        self.items.iter().map(|i| i.ingredient_id).collect()
    }

    /// Sum of the per-ingredient gram amounts.
    pub fn total_weight(&self) -> f64 {
        self.items
            .iter()
            .filter(|i| i.grams > 0.0)
            .map(|i| i.grams)
            .sum()
    }

    /// Macros of the whole recipe, each rounded to one decimal place.
    pub fn nutrition(&self) -> Macros {
        self.items
            .iter()
            .filter(|i| i.grams > 0.0)
            .map(|i| i.per_100g.scaled(i.grams))
            .sum::<Macros>()
            .rounded(1)
    }
}

/// A recipe scored against a blend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecipe {
    pub recipe_id: u32,
    pub name: String,
    /// Combined score, two decimal places.
    pub score: f64,
    pub matching_count: usize,
    pub match_percentage: f64,
    pub weight_coverage: f64,
    pub recipe_weight: f64,
    pub nutrition: Macros,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: IngredientId, grams: f64) -> RecipeItem {
        RecipeItem {
            ingredient_id: id,
            grams,
            per_100g: Macros::new(100.0, 10.0, 5.0, 20.0),
        }
    }

    #[test]
    fn test_unused_ingredient_still_listed() {
        let recipe = RecipeProfile {
            id: 1,
            name: "Bowl".to_string(),
            items: vec![item(1, 100.0), item(2, 50.0), item(3, 0.0)],
        };
        assert_eq!(recipe.ingredient_ids().len(), 3);
        assert_eq!(recipe.total_weight(), 150.0);
    }

    #[test]
    fn test_nutrition_is_rounded() {
        let recipe = RecipeProfile {
            id: 1,
            name: "Bowl".to_string(),
            items: vec![item(1, 34.0), item(2, 0.0)],
        };
        let n = recipe.nutrition();
        assert_eq!(n, Macros::new(34.0, 3.4, 1.7, 6.8));
    }

    #[test]
    fn test_recipe_amount_defaults_to_100g() {
        let json = r#"{"id": 2, "name": "Omelette", "ingredients": [{"ingredient_id": 3}]}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.ingredients[0].amount_grams, 100.0);
        assert!(recipe.description.is_none());
    }
}
