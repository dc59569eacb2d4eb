use serde::{Deserialize, Serialize};

/// Opaque ingredient identity, as assigned by the owning catalog.
pub type IngredientId = u32;

/// The four macro-nutrients tracked for every ingredient, blend and recipe.
///
/// For an ingredient profile the values are per 100 grams; for blends and
/// recipes they are absolute amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
}

impl Macros {
    pub fn new(calories: f64, proteins: f64, fats: f64, carbs: f64) -> Self {
        Self {
            calories,
            proteins,
            fats,
            carbs,
        }
    }

    /// Values in matrix row order: calories, proteins, fats, carbs.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.calories, self.proteins, self.fats, self.carbs]
    }

    /// Contribution of `grams` of a per-100g profile.
    #[inline]
    pub fn scaled(&self, grams: f64) -> Self {
        self.map(|v| v * grams / 100.0)
    }

    /// Apply `f` to every macro.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.calories), f(self.proteins), f(self.fats), f(self.carbs))
    }

    /// Combine two macro vectors field by field.
    pub fn zip_with(&self, other: &Macros, f: impl Fn(f64, f64) -> f64) -> Self {
        Self::new(
            f(self.calories, other.calories),
            f(self.proteins, other.proteins),
            f(self.fats, other.fats),
            f(self.carbs, other.carbs),
        )
    }

    /// Round every macro to `decimals` places.
    pub fn rounded(&self, decimals: u32) -> Self {
        self.map(|v| round_to(v, decimals))
    }

    /// Basic validation: every macro finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl std::ops::Add for Macros {
    type Output = Macros;

    fn add(self, rhs: Macros) -> Macros {
        self.zip_with(&rhs, |a, b| a + b)
    }
}

impl std::ops::AddAssign for Macros {
    fn add_assign(&mut self, rhs: Macros) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Macros {
    fn sum<I: Iterator<Item = Macros>>(iter: I) -> Self {
        iter.fold(Macros::default(), |acc, m| acc + m)
    }
}

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// An ingredient with its per-100g macro profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientProfile {
    pub id: IngredientId,

    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub per_100g: Macros,
}

impl IngredientProfile {
    pub fn new(id: IngredientId, name: &str, per_100g: Macros) -> Self {
        Self {
            id,
            name: name.to_string(),
            per_100g,
        }
    }

    /// Macros contributed by `grams` of this ingredient.
    #[inline]
    pub fn nutrition_for(&self, grams: f64) -> Macros {
        self.per_100g.scaled(grams)
    }

    /// Canonical key for name lookups (lowercase name).
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Display label: the name, or `#id` for unnamed ingredients.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("#{}", self.id)
        } else {
            self.name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicken() -> IngredientProfile {
        IngredientProfile::new(1, "Chicken breast", Macros::new(165.0, 31.0, 3.6, 0.0))
    }

    #[test]
    fn test_nutrition_for_scales_linearly() {
        let n = chicken().nutrition_for(250.0);
        assert!((n.calories - 412.5).abs() < 1e-9);
        assert!((n.proteins - 77.5).abs() < 1e-9);
        assert!((n.fats - 9.0).abs() < 1e-9);
        assert_eq!(n.carbs, 0.0);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(round_to(33.333, 1), 33.3);
        assert_eq!(round_to(0.25, 1), 0.3);
        assert_eq!(round_to(-12.36, 1), -12.4);
        assert_eq!(round_to(71.666, 2), 71.67);
    }

    #[test]
    fn test_sum_of_macros() {
        let total: Macros = vec![Macros::new(1.0, 2.0, 3.0, 4.0); 3].into_iter().sum();
        assert_eq!(total, Macros::new(3.0, 6.0, 9.0, 12.0));
    }

    #[test]
    fn test_is_valid() {
        assert!(chicken().per_100g.is_valid());
        assert!(!Macros::new(-1.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!Macros::new(f64::NAN, 0.0, 0.0, 0.0).is_valid());
    }

    #[test]
    fn test_flat_json_shape() {
        let json = r#"{"id": 7, "name": "Rice", "calories": 130, "proteins": 2.7, "fats": 0.3, "carbs": 28}"#;
        let ing: IngredientProfile = serde_json::from_str(json).unwrap();
        assert_eq!(ing.id, 7);
        assert_eq!(ing.per_100g.carbs, 28.0);
        assert_eq!(ing.label(), "Rice");
    }
}
