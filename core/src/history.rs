use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::nutrients::NutrientProfile;

/// The four fixed meal slots of a day, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snacks,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Snacks => "Snacks",
        }
    }
}

impl std::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MealSlot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snacks" | "snack" => Ok(Self::Snacks),
            _ => anyhow::bail!(
                "Invalid meal slot '{s}'. Must be one of: Breakfast, Lunch, Dinner, Snacks"
            ),
        }
    }
}

/// One logged food. The nutrient amounts are absolute for the serving that
/// was logged, already scaled from whatever reference they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    #[serde(deserialize_with = "entry_id")]
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub nutrients: NutrientProfile,
}

/// Documents written by older clients carry numeric timestamp ids.
fn entry_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom("entry id must be a string or number")),
    }
}

/// A day's entries grouped by slot. All four slots always exist; empty ones
/// serialize as empty arrays, matching the stored document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meals {
    #[serde(rename = "Breakfast", default)]
    pub breakfast: Vec<MealEntry>,
    #[serde(rename = "Lunch", default)]
    pub lunch: Vec<MealEntry>,
    #[serde(rename = "Dinner", default)]
    pub dinner: Vec<MealEntry>,
    #[serde(rename = "Snacks", default)]
    pub snacks: Vec<MealEntry>,
}

impl Meals {
    #[must_use]
    pub fn slot(&self, slot: MealSlot) -> &[MealEntry] {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
            MealSlot::Snacks => &self.snacks,
        }
    }

    pub fn slot_mut(&mut self, slot: MealSlot) -> &mut Vec<MealEntry> {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
            MealSlot::Snacks => &mut self.snacks,
        }
    }

    /// Every entry in slot order, then insertion order within a slot.
    pub fn entries(&self) -> impl Iterator<Item = (MealSlot, &MealEntry)> {
        MealSlot::ALL
            .into_iter()
            .flat_map(|slot| self.slot(slot).iter().map(move |entry| (slot, entry)))
    }

    #[must_use]
    pub fn entry_count(&self) -> usize {
        MealSlot::ALL.iter().map(|slot| self.slot(*slot).len()).sum()
    }

    /// Element-wise sum over all entries in all slots.
    #[must_use]
    pub fn total(&self) -> NutrientProfile {
        self.entries().map(|(_, entry)| entry.nutrients).sum()
    }
}

/// One calendar day: the aggregate, the entries it was computed from, and
/// the water count. `nutrients` always equals `meals.total()`; mutate
/// through the methods here so the two cannot drift.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(default)]
    pub nutrients: NutrientProfile,
    #[serde(default)]
    pub meals: Meals,
    #[serde(default)]
    pub water: u32,
}

impl DayRecord {
    pub fn push_entry(&mut self, slot: MealSlot, entry: MealEntry) {
        self.meals.slot_mut(slot).push(entry);
        self.recalculate();
    }

    /// Remove an entry by id, returning it. `None` leaves the day untouched.
    pub fn remove_entry(&mut self, slot: MealSlot, id: &str) -> Option<MealEntry> {
        let entries = self.meals.slot_mut(slot);
        let index = entries.iter().position(|entry| entry.id == id)?;
        let entry = entries.remove(index);
        self.recalculate();
        Some(entry)
    }

    /// Recompute the day aggregate from the entries.
    pub fn recalculate(&mut self) {
        self.nutrients = self.meals.total();
    }
}

/// Persisted goal settings, stored under the document's reserved `settings`
/// key as camelCase fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub calorie_goal: u32,
    #[serde(default)]
    pub water_goal: u32,
}

/// The whole persisted document: day records keyed by `YYYY-MM-DD` plus the
/// goal settings. This is the single artifact the store loads and saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(flatten)]
    pub days: BTreeMap<NaiveDate, DayRecord>,
}

impl History {
    /// The record for `date`, created zeroed if the day has never been seen.
    pub fn day_mut(&mut self, date: NaiveDate) -> &mut DayRecord {
        self.days.entry(date).or_default()
    }

    /// Recompute every day aggregate from its entries. Run after loading:
    /// documents written by older clients may carry drifted totals.
    pub fn normalize(&mut self) {
        for day in self.days.values_mut() {
            day.recalculate();
        }
    }
}
