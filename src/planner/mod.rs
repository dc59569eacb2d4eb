pub mod blend;
pub mod constants;
pub mod minimize;
pub mod objective;
pub mod ranking;

pub use crate::error::BlendError;
pub use blend::{build_blend, deviation_percent, fit_amounts, round_grams, solve, solve_with};
pub use constants::*;
pub use minimize::{minimize, FeasibleRegion, Minimum, QuadraticModel, SolverOptions};
pub use objective::{AnchorPiece, BlendObjective};
pub use ranking::{combined_score, rank, score_recipe};
