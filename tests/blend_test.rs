#[macro_use]
extern crate assert_float_eq;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use nalgebra::DVector;

use nutri_blend_rs::models::{IngredientProfile, Macros};
use nutri_blend_rs::planner::{
    fit_amounts, solve, AnchorPiece, BlendError, BlendObjective, FeasibleRegion, SolverOptions,
    MAX_INGREDIENT_GRAMS, MAX_TOTAL_GRAMS, MIN_INGREDIENT_GRAMS, MIN_TOTAL_GRAMS,
};

fn protein_and_carb() -> Vec<IngredientProfile> {
    vec![
        IngredientProfile::new(1, "Whey", Macros::new(100.0, 25.0, 1.0, 0.0)),
        IngredientProfile::new(2, "Maltodextrin", Macros::new(100.0, 2.0, 0.0, 25.0)),
    ]
}

#[test]
fn test_two_ingredients_cover_target() {
    let target = Macros::new(500.0, 50.0, 10.0, 50.0);
    let blend = solve(&protein_and_carb(), &target, None).unwrap();

    assert_eq!(blend.len(), 2);
    // Calories dominate the unweighted fit; the least-squares optimum sits
    // near 241 g and 255 g, giving about 65.3 g protein and 63.8 g carbs.
    assert!((blend.total_nutrition.calories - 500.0).abs() <= 25.0);
    assert_float_absolute_eq!(blend.total_nutrition.proteins, 65.3, 3.0);
    assert_float_absolute_eq!(blend.total_nutrition.carbs, 63.8, 3.0);
    assert_float_absolute_eq!(blend.total_weight, 495.0, 10.0);
}

#[test]
fn test_all_zero_ingredient_and_target() {
    let profiles = vec![IngredientProfile::new(1, "Water", Macros::default())];
    let result = solve(&profiles, &Macros::default(), None);

    match result {
        Ok(blend) => {
            assert_eq!(blend.total_nutrition, Macros::default());
            assert_eq!(blend.deviations, Macros::default());
            assert!(blend.ingredients.iter().all(|e| e.grams % 5.0 == 0.0));
        }
        Err(e) => assert!(matches!(
            e,
            BlendError::OptimizationFailed(_) | BlendError::NoViableBlend
        )),
    }
}

#[test]
fn test_zero_target_settles_at_min_total() {
    let profiles = vec![IngredientProfile::new(1, "Bread", Macros::new(100.0, 10.0, 5.0, 2.0))];
    let blend = solve(&profiles, &Macros::default(), None).unwrap();

    assert_eq!(blend.len(), 1);
    assert_eq!(blend.ingredients[0].grams, 200.0);
    assert_eq!(blend.total_nutrition, Macros::new(200.0, 20.0, 10.0, 4.0));
    assert_eq!(blend.deviations, Macros::default());
}

#[test]
fn test_zero_target_component_has_zero_deviation() {
    let target = Macros::new(500.0, 50.0, 0.0, 50.0);
    let blend = solve(&protein_and_carb(), &target, None).unwrap();
    assert_eq!(blend.deviations.fats, 0.0);
    assert!(blend.total_nutrition.fats > 0.0);
}

#[test]
fn test_no_ingredients() {
    let err = solve(&[], &Macros::new(2000.0, 100.0, 70.0, 250.0), None).unwrap_err();
    assert_eq!(err, BlendError::NoIngredients);
    assert_eq!(err.to_string(), "No ingredients available");
}

#[test]
fn test_failure_message_prefix() {
    let err = BlendError::OptimizationFailed("Iteration limit reached".to_string());
    assert_eq!(err.to_string(), "Optimization error: Iteration limit reached");
    assert_eq!(
        BlendError::NoViableBlend.to_string(),
        "Could not find suitable ingredient amounts"
    );
}

fn everyday_foods() -> Vec<IngredientProfile> {
    [
        ("Egg", 143.0, 12.6, 9.5, 0.7),
        ("Whole milk", 61.0, 3.2, 3.3, 4.8),
        ("Boiled rice", 130.0, 2.7, 0.3, 28.2),
        ("Rolled oats", 389.0, 16.9, 6.9, 66.3),
        ("Chicken breast", 165.0, 31.0, 3.6, 0.0),
        ("Broccoli", 34.0, 2.8, 0.4, 6.6),
        ("Banana", 89.0, 1.1, 0.3, 22.8),
        ("Olive oil", 884.0, 0.0, 100.0, 0.0),
    ]
    .iter()
    .enumerate()
    .map(|(i, &(name, kcal, p, f, c))| {
        IngredientProfile::new(i as u32 + 1, name, Macros::new(kcal, p, f, c))
    })
    .collect()
}

/// Frank-Wolfe gap `gᵀ(x − y)` with `y` minimizing `gᵀy` over the box and
/// mass band. For a convex objective it bounds `f(x) − f*` from above.
fn frank_wolfe_gap(gradient: &DVector<f64>, x: &DVector<f64>, region: &FeasibleRegion) -> f64 {
    let mut order: Vec<usize> = (0..x.len()).collect();
    order.sort_by(|&a, &b| gradient[a].total_cmp(&gradient[b]));

    let mut y = region.lower.clone();
    let mut need = region.min_total - y.sum();
    for &i in &order {
        let add = (region.upper[i] - y[i]).min(need.max(0.0));
        y[i] += add;
        need -= add;
    }
    let mut room = region.max_total - y.sum();
    for &i in order.iter().filter(|&&i| gradient[i] < 0.0) {
        let add = (region.upper[i] - y[i]).min(room.max(0.0));
        y[i] += add;
        room -= add;
    }
    gradient.dot(&(x - y))
}

fn assert_global_minimum(profiles: &[IngredientProfile], target: &Macros, expected: f64) {
    let minimum = fit_amounts(profiles, target, None, &SolverOptions::default()).unwrap();
    assert!(minimum.converged, "{}", minimum.message);

    let n = profiles.len();
    let pieces = vec![AnchorPiece::Unanchored; n];
    let model = BlendObjective::new(profiles, target, None).quadratic(&pieces);
    let region = FeasibleRegion::uniform(n, MIN_INGREDIENT_GRAMS, MAX_INGREDIENT_GRAMS);
    let gap = frank_wolfe_gap(&model.gradient(&minimum.x), &minimum.x, &region);

    assert!(gap <= 1e-4, "gap {gap} at {:?}", minimum.x.as_slice());
    assert_float_absolute_eq!(minimum.objective, expected, 1e-3);
    assert!(minimum.x.sum() >= MIN_TOTAL_GRAMS - 1e-6);
    assert!(minimum.x.sum() <= MAX_TOTAL_GRAMS + 1e-6);
}

#[test]
fn test_everyday_foods_reach_global_minimum() {
    let foods = everyday_foods();
    assert_global_minimum(&foods, &Macros::new(1800.0, 60.0, 40.0, 350.0), 6.2087);
    assert_global_minimum(&foods, &Macros::new(1760.0, 61.0, 35.0, 345.0), 0.3954);
    assert_global_minimum(&foods, &Macros::new(2200.0, 140.0, 70.0, 220.0), 33.6925);
}

#[test]
fn test_everyday_foods_blend_tracks_calories() {
    let foods = everyday_foods();
    for target in [
        Macros::new(1800.0, 60.0, 40.0, 350.0),
        Macros::new(1760.0, 61.0, 35.0, 345.0),
        Macros::new(2200.0, 140.0, 70.0, 220.0),
    ] {
        let blend = solve(&foods, &target, None).unwrap();
        assert!(
            blend.deviations.calories.abs() <= 2.0,
            "calories off by {}% for {:?}",
            blend.deviations.calories,
            target
        );
        assert!(blend.ingredients.iter().all(|e| e.grams <= MAX_INGREDIENT_GRAMS));
    }
}

fn random_catalog(rng: &mut StdRng, n: usize) -> Vec<IngredientProfile> {
    (0..n)
        .map(|i| {
            let proteins = rng.gen_range(0.0..35.0);
            let fats = if rng.gen_bool(0.2) {
                rng.gen_range(0.0..100.0)
            } else {
                rng.gen_range(0.0..25.0)
            };
            let carbs = rng.gen_range(0.0..80.0);
            let calories = rng.gen_range(10.0..900.0);
            IngredientProfile::new(
                i as u32 + 1,
                &format!("Ingredient {}", i + 1),
                Macros::new(calories, proteins, fats, carbs),
            )
        })
        .collect()
}

#[test]
fn test_random_catalogs_keep_blend_invariants() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..100 {
        let n = rng.gen_range(1..=8);
        let profiles = random_catalog(&mut rng, n);
        let target = Macros::new(
            rng.gen_range(300.0..3000.0),
            rng.gen_range(10.0..150.0),
            rng.gen_range(5.0..100.0),
            rng.gen_range(20.0..300.0),
        );

        let blend = solve(&profiles, &target, None)
            .unwrap_or_else(|e| panic!("{e} for {n} ingredients and target {target:?}"));

        assert!(!blend.is_empty());
        assert_eq!(blend.target_nutrition, target);

        let mut grams_total = 0.0;
        let mut nutrition_total = Macros::default();
        for entry in &blend.ingredients {
            assert_eq!(entry.grams % 5.0, 0.0);
            assert!(entry.grams >= 5.0);
            assert!(entry.grams <= MAX_INGREDIENT_GRAMS);

            let profile = profiles
                .iter()
                .find(|p| p.id == entry.ingredient_id)
                .unwrap();
            assert_eq!(entry.nutrition, profile.per_100g.scaled(entry.grams));

            grams_total += entry.grams;
            nutrition_total += entry.nutrition;
        }

        assert_eq!(blend.total_weight, grams_total);
        assert!(blend.total_weight >= 200.0 - 5.0 * n as f64);
        assert!(blend.total_weight <= 5000.0);
        assert_float_absolute_eq!(blend.total_nutrition.calories, nutrition_total.calories, 0.051);
        assert_float_absolute_eq!(blend.total_nutrition.proteins, nutrition_total.proteins, 0.051);
        assert_float_absolute_eq!(blend.total_nutrition.fats, nutrition_total.fats, 0.051);
        assert_float_absolute_eq!(blend.total_nutrition.carbs, nutrition_total.carbs, 0.051);
    }
}
