use nalgebra::DVector;
use tracing::{debug, trace, warn};

use crate::error::BlendError;
use crate::models::ingredient::round_to;
use crate::models::{Blend, BlendEntry, IngredientProfile, Macros};
use crate::planner::constants::*;
use crate::planner::minimize::{minimize, Minimum, SolverOptions, MSG_INFEASIBLE};
use crate::planner::objective::{AnchorPiece, BlendObjective};

/// Round a resolved amount to the nearest multiple of 5 g.
#[inline]
pub fn round_grams(grams: f64) -> f64 {
    (grams / ROUNDING_STEP_GRAMS).round() * ROUNDING_STEP_GRAMS
}

/// Signed percentage deviation of `total` from `target`, one decimal place.
///
/// A zero target reports 0 rather than dividing by zero.
pub fn deviation_percent(total: f64, target: f64) -> f64 {
    if target > 0.0 {
        round_to((total - target) / target * 100.0, 1)
    } else {
        0.0
    }
}

/// Starting point: the prior when one is given, else 500 g split evenly.
fn initial_guess(n: usize, prior: Option<&[f64]>) -> DVector<f64> {
    match prior {
        Some(p) => DVector::from_column_slice(p),
        None => DVector::from_element(n, DEFAULT_START_TOTAL_GRAMS / n.max(1) as f64),
    }
}

/// Pieces holding the warm start, widened until the mass band is reachable.
fn starting_pieces(objective: &BlendObjective, x0: &DVector<f64>) -> Vec<AnchorPiece> {
    let mut pieces = objective.pieces_at(x0);
    for (i, piece) in pieces.iter_mut().enumerate() {
        if objective.piece_bounds(i, *piece).is_none() {
            *piece = AnchorPiece::Below;
        }
    }

    while let Some(region) = objective.region(&pieces) {
        if region.is_feasible() {
            break;
        }
        let wider = if region.upper.sum() < region.min_total {
            AnchorPiece::Above
        } else {
            AnchorPiece::Below
        };
        let Some(i) = (0..pieces.len()).find(|&i| {
            pieces[i] == AnchorPiece::Within && objective.piece_bounds(i, wider).is_some()
        }) else {
            break;
        };
        pieces[i] = wider;
    }
    pieces
}

/// Pieces an anchored amount may move to from `piece`.
fn neighbours(piece: AnchorPiece) -> &'static [AnchorPiece] {
    match piece {
        AnchorPiece::Unanchored => &[],
        AnchorPiece::Within => &[AnchorPiece::Below, AnchorPiece::Above],
        AnchorPiece::Below | AnchorPiece::Above => &[AnchorPiece::Within],
    }
}

/// Minimize the objective with every amount confined to its piece.
fn fit_pieces(
    objective: &BlendObjective,
    pieces: &[AnchorPiece],
    x0: &DVector<f64>,
    options: &SolverOptions,
) -> Result<Minimum, BlendError> {
    let region = objective
        .region(pieces)
        .ok_or_else(|| BlendError::OptimizationFailed(MSG_INFEASIBLE.to_string()))?;
    let mut minimum = minimize(&objective.quadratic(pieces), x0, &region, options);
    if !minimum.converged {
        return Err(BlendError::OptimizationFailed(minimum.message));
    }
    minimum.objective = objective.value(&minimum.x);
    Ok(minimum)
}

/// Raw (unrounded) amounts minimizing the blend objective.
///
/// Without a prior the objective is a convex quadratic and the result is its
/// global minimum. With a prior, amounts start in the pieces holding the
/// prior; single-amount moves across an anchor boundary are then taken while
/// they lower the objective.
pub fn fit_amounts(
    profiles: &[IngredientProfile],
    target: &Macros,
    prior: Option<&[f64]>,
    options: &SolverOptions,
) -> Result<Minimum, BlendError> {
    if profiles.is_empty() {
        return Err(BlendError::NoIngredients);
    }

    let n = profiles.len();
    let prior = match prior {
        Some(p) if p.len() != n => {
            warn!(
                expected = n,
                got = p.len(),
                "prior amounts do not match ingredient count; ignoring them"
            );
            None
        }
        other => other,
    };

    let objective = BlendObjective::new(profiles, target, prior);
    let x0 = initial_guess(n, prior);
    debug!(
        ingredients = objective.dimension(),
        warm_start = prior.is_some(),
        "solving blend"
    );

    let mut pieces = starting_pieces(&objective, &x0);
    let mut best = fit_pieces(&objective, &pieces, &x0, options)?;

    for _ in 0..MAX_ANCHOR_SWITCHES {
        let mut improved: Option<(Vec<AnchorPiece>, Minimum)> = None;
        for (i, &piece) in pieces.iter().enumerate() {
            for &alternative in neighbours(piece) {
                let mut trial = pieces.clone();
                trial[i] = alternative;
                if !objective.region(&trial).is_some_and(|r| r.is_feasible()) {
                    continue;
                }
                let Ok(candidate) = fit_pieces(&objective, &trial, &best.x, options) else {
                    continue;
                };
                let bar = improved.as_ref().map_or(best.objective, |(_, m)| m.objective);
                if candidate.objective < bar - 1e-9 * (1.0 + bar.abs()) {
                    improved = Some((trial, candidate));
                }
            }
        }

        match improved {
            Some((next, candidate)) => {
                trace!(objective = candidate.objective, "anchor piece switched");
                pieces = next;
                best = candidate;
            }
            None => break,
        }
    }

    debug!(
        iterations = best.iterations,
        objective = best.objective,
        "blend converged"
    );
    Ok(best)
}

/// Solve a blend with the default solver options.
///
/// See [`solve_with`].
pub fn solve(
    profiles: &[IngredientProfile],
    target: &Macros,
    prior: Option<&[f64]>,
) -> Result<Blend, BlendError> {
    solve_with(profiles, target, prior, &SolverOptions::default())
}

/// Find gram amounts of `profiles` whose combined macros best match `target`.
///
/// `prior` holds previous amounts in profile order; it seeds the search and
/// anchors amounts that would otherwise move past half or double their prior.
/// A prior of the wrong length is ignored.
///
/// Amounts are bounded to 0..=1000 g each and 200..=5000 g in total, rounded to
/// multiples of 5 g, and dropped below 5 g.
pub fn solve_with(
    profiles: &[IngredientProfile],
    target: &Macros,
    prior: Option<&[f64]>,
    options: &SolverOptions,
) -> Result<Blend, BlendError> {
    let minimum = fit_amounts(profiles, target, prior, options)?;
    build_blend(profiles, target, minimum.x.as_slice())
}

/// Round the raw amounts, drop the negligible ones and total the rest.
pub fn build_blend(
    profiles: &[IngredientProfile],
    target: &Macros,
    amounts: &[f64],
) -> Result<Blend, BlendError> {
    let ingredients: Vec<BlendEntry> = profiles
        .iter()
        .zip(amounts)
        .map(|(profile, &raw)| (profile, round_grams(raw)))
        .filter(|&(_, grams)| grams >= MIN_REPORTED_GRAMS)
        .map(|(profile, grams)| BlendEntry {
            ingredient_id: profile.id,
            name: profile.label(),
            grams,
            nutrition: profile.nutrition_for(grams),
        })
        .collect();

    if ingredients.is_empty() {
        return Err(BlendError::NoViableBlend);
    }

    let total: Macros = ingredients.iter().map(|e| e.nutrition).sum();
    let deviations = total.zip_with(target, deviation_percent);
    let total_weight: f64 = ingredients.iter().map(|e| e.grams).sum();

    Ok(Blend {
        ingredients,
        total_nutrition: total.rounded(1),
        target_nutrition: *target,
        deviations,
        total_weight: round_to(total_weight, 1),
    })
}
