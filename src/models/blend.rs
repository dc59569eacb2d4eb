use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::BlendError;
use crate::models::{IngredientId, Macros};

/// One retained ingredient of a solved blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendEntry {
    pub ingredient_id: IngredientId,

    #[serde(default)]
    pub name: String,

    /// Resolved amount, always a multiple of 5 and at least 5.
    pub grams: f64,

    /// Macros contributed by `grams` of the ingredient (unrounded).
    pub nutrition: Macros,
}

/// A solved ingredient blend.
///
/// Entries keep the order of the profile list that was solved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blend {
    pub ingredients: Vec<BlendEntry>,
    pub total_nutrition: Macros,
    pub target_nutrition: Macros,
    /// Signed percentage difference from target, 0 where the target is 0.
    pub deviations: Macros,
    pub total_weight: f64,
}

impl Blend {
    /// Resolved grams keyed by ingredient id, the shape the ranker consumes.
    pub fn grams_by_id(&self) -> HashMap<IngredientId, f64> {
        self.ingredients
            .iter()
            .map(|e| (e.ingredient_id, e.grams))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

/// Tagged wire form of a solve outcome: a success flag plus either the blend
/// fields or the error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendReport {
    pub success: bool,

    #[serde(flatten)]
    pub blend: Option<Blend>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BlendReport {
    /// The blend, if the report describes a successful solve.
    pub fn into_blend(self) -> Option<Blend> {
        if self.success { self.blend } else { None }
    }
}

impl From<&std::result::Result<Blend, BlendError>> for BlendReport {
    fn from(outcome: &std::result::Result<Blend, BlendError>) -> Self {
        match outcome {
            Ok(blend) => Self {
                success: true,
                blend: Some(blend.clone()),
                error: None,
            },
            Err(e) => Self {
                success: false,
                blend: None,
                error: Some(e.to_string()),
            },
        }
    }
}
