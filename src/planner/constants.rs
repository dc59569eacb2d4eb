//! Literal constants of the blend solver and the recipe ranker.

/// Total grams of the equal-split starting point when no prior is given.
pub const DEFAULT_START_TOTAL_GRAMS: f64 = 500.0;

/// Hard per-ingredient upper bound in grams.
pub const MAX_INGREDIENT_GRAMS: f64 = 1000.0;

/// Hard per-ingredient lower bound in grams.
pub const MIN_INGREDIENT_GRAMS: f64 = 0.0;

/// Minimum total blend mass in grams.
pub const MIN_TOTAL_GRAMS: f64 = 200.0;

/// Maximum total blend mass in grams.
pub const MAX_TOTAL_GRAMS: f64 = 5000.0;

// ─────────────────────────────────────────────────────────────────────────────
// Objective weights
// ─────────────────────────────────────────────────────────────────────────────

/// Weight of the quadratic penalty on negative amounts.
pub const NEGATIVE_PENALTY_WEIGHT: f64 = 1000.0;

/// Weight of the quadratic penalty on amounts above `MAX_INGREDIENT_GRAMS`.
pub const OVERSIZE_PENALTY_WEIGHT: f64 = 0.01;

/// Weight of the quadratic penalty pulling an amount back to its prior.
pub const ANCHOR_PENALTY_WEIGHT: f64 = 100.0;

/// The anchor penalty applies above `prior * ANCHOR_UPPER_RATIO`...
pub const ANCHOR_UPPER_RATIO: f64 = 2.0;

/// ...and below `prior * ANCHOR_LOWER_RATIO`.
pub const ANCHOR_LOWER_RATIO: f64 = 0.5;

// ─────────────────────────────────────────────────────────────────────────────
// Minimizer defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Iteration cap of the active-set solver. Each iteration either takes a
/// step or changes the working set by one constraint.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Optimality tolerance, relative to the gradient scale of the problem.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Eigenvalues of the reduced Hessian below this fraction of the largest
/// one count as zero curvature.
pub const CURVATURE_CUTOFF: f64 = 1e-10;

/// Cap on anchor piece switches tried after the first fit.
pub const MAX_ANCHOR_SWITCHES: usize = 50;

/// Bisection rounds used to project onto the total-mass band.
pub const PROJECTION_BISECTIONS: usize = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Post-processing
// ─────────────────────────────────────────────────────────────────────────────

/// Resolved amounts are rounded to a multiple of this many grams.
pub const ROUNDING_STEP_GRAMS: f64 = 5.0;

/// Rounded amounts below this are dropped from the blend.
pub const MIN_REPORTED_GRAMS: f64 = 5.0;

// ─────────────────────────────────────────────────────────────────────────────
// Recipe ranking
// ─────────────────────────────────────────────────────────────────────────────

/// Default number of recipes returned by the ranker.
pub const DEFAULT_TOP_N: usize = 3;

/// Score weight of the ingredient match percentage.
pub const MATCH_PERCENTAGE_WEIGHT: f64 = 0.4;

/// Score weight of the weight coverage.
pub const WEIGHT_COVERAGE_WEIGHT: f64 = 0.4;

/// Score weight of the matching-count term.
pub const MATCH_COUNT_WEIGHT: f64 = 0.2;

/// Points per matching ingredient in the matching-count term (not capped).
pub const POINTS_PER_MATCH: f64 = 10.0;

/// Weight coverage is capped at this percentage.
pub const MAX_WEIGHT_COVERAGE: f64 = 100.0;
