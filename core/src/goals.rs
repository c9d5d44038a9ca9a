use serde::{Deserialize, Serialize};

use crate::history::Settings;

pub const DEFAULT_CALORIE_GOAL: u32 = 2000;
pub const DEFAULT_PROTEIN_GOAL: u32 = 150;
pub const DEFAULT_CARBS_GOAL: u32 = 200;
pub const DEFAULT_FAT_GOAL: u32 = 70;
pub const DEFAULT_WATER_GOAL: u32 = 8;

/// Daily targets. Only the calorie and water goals are set directly; the
/// macro goals are always derived from the calorie goal, scaling the
/// defaults linearly from their 2000 kcal baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSet {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub water: u32,
}

impl Default for GoalSet {
    fn default() -> Self {
        Self {
            calories: DEFAULT_CALORIE_GOAL,
            protein: DEFAULT_PROTEIN_GOAL,
            carbs: DEFAULT_CARBS_GOAL,
            fat: DEFAULT_FAT_GOAL,
            water: DEFAULT_WATER_GOAL,
        }
    }
}

impl GoalSet {
    /// Set the calorie goal and re-derive the three macro goals from it.
    /// Zero is ignored so a cleared form field never wipes the targets.
    pub fn set_calorie_goal(&mut self, goal: u32) {
        if goal == 0 {
            return;
        }
        self.calories = goal;
        self.protein = derived_macro(DEFAULT_PROTEIN_GOAL, goal);
        self.carbs = derived_macro(DEFAULT_CARBS_GOAL, goal);
        self.fat = derived_macro(DEFAULT_FAT_GOAL, goal);
    }

    /// Set the daily water-glass goal. Zero is ignored.
    pub fn set_water_goal(&mut self, goal: u32) {
        if goal == 0 {
            return;
        }
        self.water = goal;
    }

    /// Rebuild goals from persisted settings. Values a setter would ignore
    /// (zeroes from an old or hand-edited document) leave the defaults.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let mut goals = Self::default();
        goals.set_calorie_goal(settings.calorie_goal);
        goals.set_water_goal(settings.water_goal);
        goals
    }

    /// Projection written into every saved document.
    #[must_use]
    pub fn to_settings(&self) -> Settings {
        Settings {
            calorie_goal: self.calories,
            water_goal: self.water,
        }
    }
}

/// Scale a macro goal from its value at the 2000 kcal baseline, rounding
/// half away from zero.
#[allow(clippy::cast_sign_loss)]
fn derived_macro(base: u32, calories: u32) -> u32 {
    (f64::from(base) * f64::from(calories) / f64::from(DEFAULT_CALORIE_GOAL)).round() as u32
}
