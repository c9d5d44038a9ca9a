use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Calories plus the three tracked macros.
///
/// The same shape serves two roles: a per-100g reference profile straight
/// from a food database, and an absolute amount logged against a meal.
/// Field order matches the persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientProfile {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NutrientProfile {
    #[must_use]
    pub const fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Scale a per-100g reference profile to a serving of `target_calories`.
    ///
    /// The reference's own `calories` field is the scaling basis. A reference
    /// without usable calories (zero, negative, or not finite) yields zero
    /// macros with the requested calories, so an entry can still be logged
    /// from a sparse database record.
    #[must_use]
    pub fn scaled_to(&self, target_calories: f64) -> Self {
        if self.calories <= 0.0 || !self.calories.is_finite() {
            return Self {
                calories: target_calories,
                protein: 0.0,
                carbs: 0.0,
                fat: 0.0,
            };
        }
        let ratio = target_calories / self.calories;
        Self {
            calories: target_calories,
            protein: self.protein * ratio,
            carbs: self.carbs * ratio,
            fat: self.fat * ratio,
        }
    }

    /// True when every field is a finite, non-negative number.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        [self.calories, self.protein, self.carbs, self.fat]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl Add for NutrientProfile {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl AddAssign for NutrientProfile {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for NutrientProfile {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_to_proportional() {
        let reference = NutrientProfile::new(200.0, 10.0, 20.0, 5.0);
        let scaled = reference.scaled_to(100.0);
        assert!((scaled.calories - 100.0).abs() < f64::EPSILON);
        assert!((scaled.protein - 5.0).abs() < f64::EPSILON);
        assert!((scaled.carbs - 10.0).abs() < f64::EPSILON);
        assert!((scaled.fat - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scaled_to_upscales() {
        let reference = NutrientProfile::new(389.0, 16.9, 66.3, 6.9);
        let scaled = reference.scaled_to(150.0);
        assert!((scaled.calories - 150.0).abs() < f64::EPSILON);
        // 150 / 389 of each macro
        assert!((scaled.protein - 16.9 * 150.0 / 389.0).abs() < 0.01);
        assert!((scaled.carbs - 66.3 * 150.0 / 389.0).abs() < 0.01);
    }

    #[test]
    fn test_scaled_to_zero_calorie_basis() {
        let reference = NutrientProfile::new(0.0, 10.0, 20.0, 5.0);
        let scaled = reference.scaled_to(150.0);
        assert!((scaled.calories - 150.0).abs() < f64::EPSILON);
        assert!((scaled.protein - 0.0).abs() < f64::EPSILON);
        assert!((scaled.carbs - 0.0).abs() < f64::EPSILON);
        assert!((scaled.fat - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scaled_to_negative_or_nan_basis() {
        let negative = NutrientProfile::new(-50.0, 10.0, 20.0, 5.0);
        let scaled = negative.scaled_to(100.0);
        assert!((scaled.calories - 100.0).abs() < f64::EPSILON);
        assert!((scaled.protein - 0.0).abs() < f64::EPSILON);

        let nan = NutrientProfile::new(f64::NAN, 10.0, 20.0, 5.0);
        let scaled = nan.scaled_to(100.0);
        assert!((scaled.calories - 100.0).abs() < f64::EPSILON);
        assert!((scaled.fat - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_add_element_wise() {
        let a = NutrientProfile::new(150.0, 5.0, 27.0, 3.0);
        let b = NutrientProfile::new(300.0, 12.0, 40.0, 8.0);
        let sum = a + b;
        assert!((sum.calories - 450.0).abs() < f64::EPSILON);
        assert!((sum.protein - 17.0).abs() < f64::EPSILON);
        assert!((sum.carbs - 67.0).abs() < f64::EPSILON);
        assert!((sum.fat - 11.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sum_over_iterator() {
        let profiles = vec![
            NutrientProfile::new(100.0, 1.0, 2.0, 3.0),
            NutrientProfile::new(200.0, 4.0, 5.0, 6.0),
            NutrientProfile::new(50.0, 0.5, 1.5, 0.0),
        ];
        let total: NutrientProfile = profiles.into_iter().sum();
        assert!((total.calories - 350.0).abs() < f64::EPSILON);
        assert!((total.protein - 5.5).abs() < f64::EPSILON);
        assert!((total.carbs - 8.5).abs() < f64::EPSILON);
        assert!((total.fat - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sum_of_nothing_is_zero() {
        let total: NutrientProfile = std::iter::empty().sum();
        assert_eq!(total, NutrientProfile::default());
    }

    #[test]
    fn test_is_non_negative() {
        assert!(NutrientProfile::new(150.0, 5.0, 27.0, 3.0).is_non_negative());
        assert!(NutrientProfile::default().is_non_negative());
        assert!(!NutrientProfile::new(-1.0, 5.0, 27.0, 3.0).is_non_negative());
        assert!(!NutrientProfile::new(150.0, f64::NAN, 27.0, 3.0).is_non_negative());
        assert!(!NutrientProfile::new(f64::INFINITY, 5.0, 27.0, 3.0).is_non_negative());
    }
}
