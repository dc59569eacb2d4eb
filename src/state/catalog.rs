use std::collections::HashMap;

use strsim::jaro_winkler;

use crate::error::{NutriError, Result};
use crate::models::{IngredientId, IngredientProfile, Recipe, RecipeItem, RecipeProfile};

/// Minimum Jaro-Winkler similarity for a fuzzy name match.
const FUZZY_THRESHOLD: f64 = 0.7;

/// Read-only view of the ingredient catalog with id and name lookups.
pub struct Catalog {
    /// Ingredients in catalog order.
    ingredients: Vec<IngredientProfile>,
    by_id: HashMap<IngredientId, usize>,
    /// Lowercase name to position.
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Create a catalog; on duplicate ids the later ingredient wins.
    pub fn new(ingredients: Vec<IngredientProfile>) -> Self {
        let mut catalog = Self {
            ingredients: Vec::with_capacity(ingredients.len()),
            by_id: HashMap::new(),
            by_name: HashMap::new(),
        };
        for ingredient in ingredients {
            match catalog.by_id.get(&ingredient.id) {
                Some(&i) => catalog.ingredients[i] = ingredient,
                None => {
                    catalog.by_id.insert(ingredient.id, catalog.ingredients.len());
                    catalog.ingredients.push(ingredient);
                }
            }
        }
        for (i, ingredient) in catalog.ingredients.iter().enumerate() {
            catalog.by_name.entry(ingredient.key()).or_insert(i);
        }
        catalog
    }

    pub fn get(&self, id: IngredientId) -> Option<&IngredientProfile> {
        self.by_id.get(&id).map(|&i| &self.ingredients[i])
    }

    /// Get an ingredient by name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<&IngredientProfile> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&i| &self.ingredients[i])
    }

    /// Resolve names to profiles, in the order given.
    pub fn select(&self, names: &[String]) -> Result<Vec<IngredientProfile>> {
        names
            .iter()
            .map(|name| {
                self.get_by_name(name)
                    .cloned()
                    .ok_or_else(|| NutriError::IngredientNotFound(name.clone()))
            })
            .collect()
    }

    /// Ingredients whose name resembles `query`, best first.
    pub fn fuzzy_matches(&self, query: &str) -> Vec<(&IngredientProfile, f64)> {
        let query = query.trim().to_lowercase();
        let mut candidates: Vec<(&IngredientProfile, f64)> = self
            .ingredients
            .iter()
            .map(|i| (i, jaro_winkler(&i.key(), &query)))
            .filter(|(_, score)| *score > FUZZY_THRESHOLD)
            .collect();

        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        candidates
    }

    /// All ingredients, in catalog order.
    pub fn all(&self) -> &[IngredientProfile] {
        &self.ingredients
    }

    /// Resolve a stored recipe into the profile the ranker scores.
    pub fn recipe_profile(&self, recipe: &Recipe) -> Result<RecipeProfile> {
        let items = recipe
            .ingredients
            .iter()
            .map(|amount| {
                let ingredient = self.get(amount.ingredient_id).ok_or_else(|| {
                    NutriError::IngredientNotFound(format!(
                        "#{} (used by recipe '{}')",
                        amount.ingredient_id, recipe.name
                    ))
                })?;
                Ok(RecipeItem {
                    ingredient_id: ingredient.id,
                    grams: amount.amount_grams,
                    per_100g: ingredient.per_100g,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RecipeProfile {
            id: recipe.id,
            name: recipe.name.clone(),
            items,
        })
    }

    pub fn recipe_profiles(&self, recipes: &[Recipe]) -> Result<Vec<RecipeProfile>> {
        recipes.iter().map(|r| self.recipe_profile(r)).collect()
    }

    /// Count of ingredients in the catalog.
    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Macros, RecipeAmount};

    fn sample_ingredients() -> Vec<IngredientProfile> {
        vec![
            IngredientProfile::new(1, "Chicken breast", Macros::new(165.0, 31.0, 3.6, 0.0)),
            IngredientProfile::new(2, "Boiled rice", Macros::new(130.0, 2.7, 0.3, 28.0)),
            IngredientProfile::new(3, "Broccoli", Macros::new(34.0, 2.8, 0.4, 6.6)),
        ]
    }

    #[test]
    fn test_get_by_name_case_insensitive() {
        let catalog = Catalog::new(sample_ingredients());
        assert_eq!(catalog.get_by_name("broccoli").unwrap().id, 3);
        assert_eq!(catalog.get_by_name("BOILED RICE").unwrap().id, 2);
        assert!(catalog.get_by_name("banana").is_none());
    }

    #[test]
    fn test_duplicate_id_later_wins() {
        let mut ingredients = sample_ingredients();
        ingredients.push(IngredientProfile::new(3, "Steamed broccoli", Macros::new(35.0, 2.4, 0.4, 7.2)));
        let catalog = Catalog::new(ingredients);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(3).unwrap().name, "Steamed broccoli");
        assert!(catalog.get_by_name("broccoli").is_none());
    }

    #[test]
    fn test_select_reports_missing_name() {
        let catalog = Catalog::new(sample_ingredients());
        let picked = catalog
            .select(&["broccoli".to_string(), "chicken breast".to_string()])
            .unwrap();
        assert_eq!(picked.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 1]);

        let err = catalog.select(&["tofu".to_string()]).unwrap_err();
        assert!(matches!(err, NutriError::IngredientNotFound(name) if name == "tofu"));
    }

    #[test]
    fn test_fuzzy_matches() {
        let catalog = Catalog::new(sample_ingredients());
        let matches = catalog.fuzzy_matches("brocoli");
        assert!(!matches.is_empty());
        assert_eq!(matches[0].0.id, 3);
    }

    #[test]
    fn test_recipe_profile_resolves_macros() {
        let catalog = Catalog::new(sample_ingredients());
        let recipe = Recipe {
            id: 10,
            name: "Chicken and rice".to_string(),
            description: None,
            ingredients: vec![
                RecipeAmount {
                    ingredient_id: 1,
                    amount_grams: 150.0,
                },
                RecipeAmount {
                    ingredient_id: 2,
                    amount_grams: 200.0,
                },
            ],
        };
        let profile = catalog.recipe_profile(&recipe).unwrap();
        assert_eq!(profile.items.len(), 2);
        assert_eq!(profile.total_weight(), 350.0);
        assert_eq!(profile.nutrition().calories, 507.5);
    }

    #[test]
    fn test_recipe_profile_unknown_ingredient() {
        let catalog = Catalog::new(sample_ingredients());
        let recipe = Recipe {
            id: 11,
            name: "Mystery".to_string(),
            description: None,
            ingredients: vec![RecipeAmount {
                ingredient_id: 99,
                amount_grams: 100.0,
            }],
        };
        assert!(matches!(
            catalog.recipe_profile(&recipe),
            Err(NutriError::IngredientNotFound(_))
        ));
    }
}
