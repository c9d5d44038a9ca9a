//! Core nutrition ledger: nutrient math, goal policy, the persisted
//! history document, and the ledger that ties them to a backing store.

pub mod error;
pub mod goals;
pub mod history;
pub mod ledger;
pub mod nutrients;
pub mod openfoodfacts;
pub mod store;
