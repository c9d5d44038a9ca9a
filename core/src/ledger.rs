use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::goals::GoalSet;
use crate::history::{DayRecord, History, MealEntry, MealSlot};
use crate::nutrients::NutrientProfile;
use crate::store::HistoryStore;

/// Derived view of one day, ready for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DaySnapshot {
    pub date: NaiveDate,
    pub consumed: NutrientProfile,
    pub remaining_calories: u32,
    pub percent_of_goal: GoalPercentages,
    pub water: u32,
    pub water_goal: u32,
}

/// Progress toward each goal, clamped to `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalPercentages {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// The daily log and everything behind it. There is no separate "today"
/// state: today is the history record under today's date, materialised
/// zeroed when the day has not been seen before. Every mutation recomputes
/// the day aggregate and writes the whole document back to the store.
pub struct Ledger {
    store: Box<dyn HistoryStore>,
    history: History,
    goals: GoalSet,
    today: NaiveDate,
}

impl Ledger {
    /// Open a ledger over `store` for the given calendar day.
    ///
    /// Never fails: an unreadable store is logged and replaced with an
    /// empty history, so a bad disk cannot block logging.
    #[must_use]
    pub fn open(store: impl HistoryStore + 'static, today: NaiveDate) -> Self {
        let store: Box<dyn HistoryStore> = Box::new(store);
        let mut history = match store.load() {
            Ok(history) => history,
            Err(err) => {
                tracing::warn!("failed to load history, starting empty: {err:#}");
                History::default()
            }
        };
        history.normalize();
        history.day_mut(today);
        let goals = history
            .settings
            .as_ref()
            .map_or_else(GoalSet::default, GoalSet::from_settings);
        Self {
            store,
            history,
            goals,
            today,
        }
    }

    // --- Meal entries ---

    /// Log a food in one of today's meal slots. The amounts are absolute
    /// for the serving eaten; scale reference profiles with
    /// [`NutrientProfile::scaled_to`] before calling.
    pub fn add_entry(
        &mut self,
        slot: MealSlot,
        name: &str,
        nutrients: NutrientProfile,
    ) -> Result<MealEntry, LedgerError> {
        if !nutrients.is_non_negative() {
            return Err(LedgerError::InvalidEntry(
                "nutrient amounts must be finite and non-negative".to_string(),
            ));
        }
        if nutrients.calories <= 0.0 {
            return Err(LedgerError::InvalidEntry(
                "calories must be greater than zero".to_string(),
            ));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidEntry(
                "name must not be empty".to_string(),
            ));
        }

        let entry = MealEntry {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            nutrients,
        };
        self.history
            .day_mut(self.today)
            .push_entry(slot, entry.clone());
        self.persist()?;
        Ok(entry)
    }

    /// Remove an entry by id from any recorded day, returning its amounts.
    /// The day record itself stays, so past days never vanish from the
    /// multi-day view.
    pub fn delete_entry(
        &mut self,
        date: NaiveDate,
        slot: MealSlot,
        id: &str,
    ) -> Result<NutrientProfile, LedgerError> {
        let entry = self.take_entry(date, slot, id)?;
        self.persist()?;
        Ok(entry.nutrients)
    }

    /// Begin an edit by removing the entry and handing it back so the
    /// caller can prefill a form. The corrected version re-enters through
    /// [`Ledger::add_entry`] and its validation.
    pub fn edit_entry(
        &mut self,
        date: NaiveDate,
        slot: MealSlot,
        id: &str,
    ) -> Result<MealEntry, LedgerError> {
        let entry = self.take_entry(date, slot, id)?;
        self.persist()?;
        Ok(entry)
    }

    fn take_entry(
        &mut self,
        date: NaiveDate,
        slot: MealSlot,
        id: &str,
    ) -> Result<MealEntry, LedgerError> {
        let not_found = || LedgerError::NotFound {
            date,
            slot,
            id: id.to_string(),
        };
        let Some(day) = self.history.days.get_mut(&date) else {
            return Err(not_found());
        };
        day.remove_entry(slot, id).ok_or_else(not_found)
    }

    // --- Water ---

    /// Add one glass to today's count. At the goal this is a silent no-op
    /// and nothing is written.
    pub fn add_water(&mut self) -> Result<u32, LedgerError> {
        let day = self.history.day_mut(self.today);
        if day.water >= self.goals.water {
            return Ok(day.water);
        }
        day.water += 1;
        let count = day.water;
        self.persist()?;
        Ok(count)
    }

    pub fn reset_water(&mut self) -> Result<(), LedgerError> {
        self.history.day_mut(self.today).water = 0;
        self.persist()
    }

    // --- Goals ---

    /// Set the calorie goal and re-derive the macro goals from it. Zero is
    /// ignored and nothing is written.
    pub fn set_calorie_goal(&mut self, goal: u32) -> Result<GoalSet, LedgerError> {
        if goal == 0 {
            return Ok(self.goals);
        }
        self.goals.set_calorie_goal(goal);
        self.persist()?;
        Ok(self.goals)
    }

    /// Set the water goal. Zero is ignored and nothing is written.
    pub fn set_water_goal(&mut self, goal: u32) -> Result<GoalSet, LedgerError> {
        if goal == 0 {
            return Ok(self.goals);
        }
        self.goals.set_water_goal(goal);
        self.persist()?;
        Ok(self.goals)
    }

    // --- Reset ---

    /// Wipe the whole history and restore default goals. Irreversible;
    /// asking the user first is the caller's job.
    pub fn reset_all(&mut self) -> Result<(), LedgerError> {
        self.history = History::default();
        self.goals = GoalSet::default();
        self.history.day_mut(self.today);
        self.persist()
    }

    // --- Derived views ---

    #[must_use]
    pub fn snapshot(&self) -> DaySnapshot {
        self.snapshot_for(self.today)
    }

    /// Render any day with the same derivation rules as today. Days that
    /// were never recorded come back all zero.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn snapshot_for(&self, date: NaiveDate) -> DaySnapshot {
        let (consumed, water) = self
            .history
            .days
            .get(&date)
            .map_or((NutrientProfile::default(), 0), |day| {
                (day.nutrients, day.water)
            });
        let remaining =
            (f64::from(self.goals.calories) - consumed.calories.round()).max(0.0);
        DaySnapshot {
            date,
            consumed,
            remaining_calories: remaining as u32,
            percent_of_goal: GoalPercentages {
                calories: percent(consumed.calories, self.goals.calories),
                protein: percent(consumed.protein, self.goals.protein),
                carbs: percent(consumed.carbs, self.goals.carbs),
                fat: percent(consumed.fat, self.goals.fat),
            },
            water,
            water_goal: self.goals.water,
        }
    }

    // --- Reads ---

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Today's record. Always present: materialised at open and again
    /// after a full reset, and day records are never deleted.
    #[must_use]
    pub fn today_record(&self) -> &DayRecord {
        self.history
            .days
            .get(&self.today)
            .expect("today's record is materialised at open")
    }

    #[must_use]
    pub fn day(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.history.days.get(&date)
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn goals(&self) -> GoalSet {
        self.goals
    }

    /// Serialize the whole document, with settings stamped from the live
    /// goals. A failed write leaves memory authoritative and surfaces as
    /// `Unavailable`.
    fn persist(&mut self) -> Result<(), LedgerError> {
        self.history.settings = Some(self.goals.to_settings());
        if let Err(err) = self.store.save(&self.history) {
            tracing::warn!("failed to save history, keeping in-memory state: {err:#}");
            return Err(LedgerError::Unavailable(err));
        }
        Ok(())
    }
}

/// Progress toward a single goal. Zero or unusable input pins the bar at
/// zero rather than producing a non-finite value.
fn percent(consumed: f64, goal: u32) -> f64 {
    if goal == 0 || !consumed.is_finite() || consumed <= 0.0 {
        return 0.0;
    }
    (consumed / f64::from(goal)).min(1.0)
}
