use chrono::NaiveDate;
use thiserror::Error;

use crate::history::MealSlot;

/// Ledger failures, returned as values. None of these abort anything:
/// `InvalidEntry` and `NotFound` guarantee nothing changed, and
/// `Unavailable` means the in-memory change applied but the store write
/// failed, leaving memory authoritative until the next successful save.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The entry failed validation; nothing was recorded or written.
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// No such entry on that day and slot; nothing was changed. Deleting
    /// twice surfaces this instead of subtracting twice.
    #[error("no entry '{id}' in {slot} on {date}")]
    NotFound {
        date: NaiveDate,
        slot: MealSlot,
        id: String,
    },

    /// The backing store failed.
    #[error("history store unavailable: {0:#}")]
    Unavailable(anyhow::Error),
}
