use thiserror::Error;

/// Failure kinds of the blend solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlendError {
    #[error("No ingredients available")]
    NoIngredients,

    #[error("Optimization error: {0}")]
    OptimizationFailed(String),

    #[error("Could not find suitable ingredient amounts")]
    NoViableBlend,
}

#[derive(Debug, Error)]
pub enum NutriError {
    #[error("Ingredient not found: {0}")]
    IngredientNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Blend(#[from] BlendError),
}

pub type Result<T> = std::result::Result<T, NutriError>;
