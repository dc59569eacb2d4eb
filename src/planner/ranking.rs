use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace};

use crate::models::ingredient::round_to;
use crate::models::{IngredientId, RankedRecipe, RecipeProfile};
use crate::planner::constants::*;

/// Combined similarity score from its three components, two decimal places.
///
/// Formula: 0.4 * match_percentage + 0.4 * weight_coverage + 0.2 * (matching_count * 10)
///
/// The last term grows with every matching ingredient and is not capped.
pub fn combined_score(match_percentage: f64, weight_coverage: f64, matching_count: usize) -> f64 {
    let score = match_percentage * MATCH_PERCENTAGE_WEIGHT
        + weight_coverage * WEIGHT_COVERAGE_WEIGHT
        + (matching_count as f64 * POINTS_PER_MATCH) * MATCH_COUNT_WEIGHT;
    round_to(score, 2)
}

/// Score a single recipe against blend grams.
///
/// Returns `None` for recipes that list no ingredients or weigh nothing.
pub fn score_recipe(
    blend: &HashMap<IngredientId, f64>,
    recipe: &RecipeProfile,
) -> Option<RankedRecipe> {
    let recipe_ids = recipe.ingredient_ids();
    if recipe_ids.is_empty() {
        trace!(recipe = recipe.id, "skipping recipe without ingredients");
        return None;
    }

    let recipe_weight = recipe.total_weight();
    if recipe_weight == 0.0 {
        trace!(recipe = recipe.id, "skipping recipe with zero weight");
        return None;
    }

    let blend_ids: BTreeSet<IngredientId> = blend.keys().copied().collect();
    let matching: Vec<IngredientId> = blend_ids.intersection(&recipe_ids).copied().collect();
    let matching_count = matching.len();

    let match_percentage = matching_count as f64 / recipe_ids.len() as f64 * 100.0;

    let total_matching_weight: f64 = matching
        .iter()
        .map(|id| blend.get(id).copied().unwrap_or(0.0))
        .sum();

    let weight_coverage = (total_matching_weight / recipe_weight * 100.0).min(MAX_WEIGHT_COVERAGE);

    Some(RankedRecipe {
        recipe_id: recipe.id,
        name: recipe.name.clone(),
        score: combined_score(match_percentage, weight_coverage, matching_count),
        matching_count,
        match_percentage: round_to(match_percentage, 1),
        weight_coverage: round_to(weight_coverage, 1),
        recipe_weight: round_to(recipe_weight, 1),
        nutrition: recipe.nutrition(),
    })
}

/// Rank recipes by similarity to a blend and keep the best `top_n`.
///
/// `blend` maps ingredient ids to resolved grams. Degenerate recipes are left
/// out. Equal scores keep their input order.
pub fn rank(
    blend: &HashMap<IngredientId, f64>,
    recipes: &[RecipeProfile],
    top_n: usize,
) -> Vec<RankedRecipe> {
    if blend.is_empty() || recipes.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<RankedRecipe> = recipes
        .iter()
        .filter_map(|recipe| score_recipe(blend, recipe))
        .collect();

    debug!(
        candidates = recipes.len(),
        scored = scored.len(),
        "ranked recipes"
    );

    // Higher is better; sort_by is stable
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(top_n);
    scored
}
