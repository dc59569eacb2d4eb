use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{NutriError, Result};
use crate::models::{BlendReport, IngredientProfile, Recipe};

/// Keep one record per key, in first-seen order, with the last occurrence's
/// contents.
fn dedup_last_wins<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        match slots.get(&key(&item)) {
            Some(&i) => out[i] = item,
            None => {
                slots.insert(key(&item), out.len());
                out.push(item);
            }
        }
    }
    out
}

/// Load ingredient profiles from a JSON file.
///
/// Deduplicates by id (last occurrence wins) and rejects negative or
/// non-finite macros.
pub fn load_ingredients<P: AsRef<Path>>(path: P) -> Result<Vec<IngredientProfile>> {
    let content = fs::read_to_string(path)?;
    let ingredients: Vec<IngredientProfile> = serde_json::from_str(&content)?;

    if let Some(bad) = ingredients.iter().find(|i| !i.per_100g.is_valid()) {
        return Err(NutriError::InvalidInput(format!(
            "ingredient {} has negative or non-finite macros",
            bad.label()
        )));
    }

    Ok(dedup_last_wins(ingredients, |i| i.id))
}

/// Load recipes from a JSON file.
///
/// Deduplicates by id (last occurrence wins).
pub fn load_recipes<P: AsRef<Path>>(path: P) -> Result<Vec<Recipe>> {
    let content = fs::read_to_string(path)?;
    let recipes: Vec<Recipe> = serde_json::from_str(&content)?;
    Ok(dedup_last_wins(recipes, |r| r.id))
}

/// Save a solve outcome as pretty JSON.
pub fn save_blend<P: AsRef<Path>>(path: P, report: &BlendReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a solve outcome saved by [`save_blend`].
pub fn load_blend<P: AsRef<Path>>(path: P) -> Result<BlendReport> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
