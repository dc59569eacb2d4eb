use nalgebra::{DMatrix, DVector};

use crate::models::{IngredientProfile, Macros};
use crate::planner::constants::*;
use crate::planner::minimize::{FeasibleRegion, QuadraticModel};

/// Which side of its prior an anchored amount is confined to.
///
/// Inside `[p/2, 2·p]` the anchor is silent; outside it the amount pays
/// `100·(x − p)²`. Confining each amount to one piece turns the objective
/// into a convex quadratic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorPiece {
    /// No positive prior: the amount is never anchored.
    Unanchored,
    Within,
    Below,
    Above,
}

/// Least-squares fit of a blend to a macro target, with soft penalties.
///
/// Value at `x` (grams per ingredient):
///
/// ```text
/// ‖M·x/100 − t‖²
///   + 1000 · Σ max(0, −x_i)²
///   + 0.01 · Σ max(0, x_i − 1000)²
///   + 100  · Σ (x_i − p_i)²   for p_i > 0 and x_i outside [p_i/2, 2·p_i]
/// ```
///
/// The anchor term switches on abruptly, so the function is only piecewise
/// smooth. Restricted to one [`AnchorPiece`] per amount and to the hard
/// bounds it is the convex quadratic returned by [`BlendObjective::quadratic`].
#[derive(Debug, Clone)]
pub struct BlendObjective {
    /// 4×n, column `i` holds ingredient `i`'s per-100g macros.
    nutrients: DMatrix<f64>,
    target: DVector<f64>,
    prior: Option<DVector<f64>>,
}

impl BlendObjective {
    /// `prior`, when given, must have one entry per profile.
    pub fn new(profiles: &[IngredientProfile], target: &Macros, prior: Option<&[f64]>) -> Self {
        let n = profiles.len();
        let nutrients =
            DMatrix::from_fn(4, n, |row, col| profiles[col].per_100g.to_array()[row]);
        let target = DVector::from_column_slice(&target.to_array());
        let prior = prior
            .filter(|p| p.len() == n)
            .map(|p| DVector::from_column_slice(p));

        Self {
            nutrients,
            target,
            prior,
        }
    }

    pub fn dimension(&self) -> usize {
        self.nutrients.ncols()
    }

    /// Predicted macro vector for `x`.
    pub fn predicted(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.nutrients * (x / 100.0)
    }

    fn prior_of(&self, i: usize) -> f64 {
        self.prior.as_ref().map_or(0.0, |p| p[i])
    }

    fn anchor_active(x: f64, prior: f64) -> bool {
        prior > 0.0 && (x > prior * ANCHOR_UPPER_RATIO || x < prior * ANCHOR_LOWER_RATIO)
    }

    pub fn value(&self, x: &DVector<f64>) -> f64 {
        let residual = self.predicted(x) - &self.target;
        let fit = residual.norm_squared();

        let negative: f64 = x.iter().map(|&v| (-v).max(0.0).powi(2)).sum();
        let oversize: f64 = x
            .iter()
            .map(|&v| (v - MAX_INGREDIENT_GRAMS).max(0.0).powi(2))
            .sum();

        let anchor: f64 = x
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, self.prior_of(i)))
            .filter(|&(v, p)| Self::anchor_active(v, p))
            .map(|(v, p)| (v - p).powi(2))
            .sum();

        fit + NEGATIVE_PENALTY_WEIGHT * negative
            + OVERSIZE_PENALTY_WEIGHT * oversize
            + ANCHOR_PENALTY_WEIGHT * anchor
    }

    /// The piece each amount's prior places it in at `x`.
    pub fn pieces_at(&self, x: &DVector<f64>) -> Vec<AnchorPiece> {
        (0..self.dimension())
            .map(|i| {
                let p = self.prior_of(i);
                if p <= 0.0 {
                    AnchorPiece::Unanchored
                } else if x[i] > p * ANCHOR_UPPER_RATIO {
                    AnchorPiece::Above
                } else if x[i] < p * ANCHOR_LOWER_RATIO {
                    AnchorPiece::Below
                } else {
                    AnchorPiece::Within
                }
            })
            .collect()
    }

    /// Hard bounds of amount `i` inside `piece`, `None` when the piece and the
    /// per-ingredient bounds do not overlap.
    pub fn piece_bounds(&self, i: usize, piece: AnchorPiece) -> Option<(f64, f64)> {
        let p = self.prior_of(i);
        let (lo, hi) = match piece {
            AnchorPiece::Unanchored => (MIN_INGREDIENT_GRAMS, MAX_INGREDIENT_GRAMS),
            AnchorPiece::Within => (p * ANCHOR_LOWER_RATIO, p * ANCHOR_UPPER_RATIO),
            AnchorPiece::Below => (MIN_INGREDIENT_GRAMS, p * ANCHOR_LOWER_RATIO),
            AnchorPiece::Above => (p * ANCHOR_UPPER_RATIO, MAX_INGREDIENT_GRAMS),
        };
        let (lo, hi) = (lo.max(MIN_INGREDIENT_GRAMS), hi.min(MAX_INGREDIENT_GRAMS));
        (lo <= hi).then_some((lo, hi))
    }

    /// Feasible region of a piece assignment, `None` if some piece is empty.
    pub fn region(&self, pieces: &[AnchorPiece]) -> Option<FeasibleRegion> {
        let n = self.dimension();
        let mut region = FeasibleRegion::uniform(n, MIN_INGREDIENT_GRAMS, MAX_INGREDIENT_GRAMS);
        for (i, &piece) in pieces.iter().enumerate() {
            let (lo, hi) = self.piece_bounds(i, piece)?;
            region.lower[i] = lo;
            region.upper[i] = hi;
        }
        Some(region)
    }

    /// The objective as a quadratic, exact on the region of `pieces`.
    ///
    /// The fit term has the constant Hessian `2·MᵀM/100²`; each anchored
    /// piece outside the band adds `2·100` on its diagonal. The negative and
    /// oversize penalties vanish inside the hard bounds.
    pub fn quadratic(&self, pieces: &[AnchorPiece]) -> QuadraticModel {
        let scaled = &self.nutrients / 100.0;
        let mut hessian = scaled.tr_mul(&scaled) * 2.0;
        let mut linear = scaled.tr_mul(&self.target) * -2.0;
        let mut constant = self.target.norm_squared();

        for (i, &piece) in pieces.iter().enumerate() {
            if matches!(piece, AnchorPiece::Below | AnchorPiece::Above) {
                let p = self.prior_of(i);
                hessian[(i, i)] += 2.0 * ANCHOR_PENALTY_WEIGHT;
                linear[i] -= 2.0 * ANCHOR_PENALTY_WEIGHT * p;
                constant += ANCHOR_PENALTY_WEIGHT * p * p;
            }
        }

        QuadraticModel {
            hessian,
            linear,
            constant,
        }
    }
}
