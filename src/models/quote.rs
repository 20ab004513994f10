//! Persisted quote row model

use serde::{Deserialize, Serialize};

/// One fetched quote as stored in the `stocks` table.
///
/// Rows are append-only: repeated fetches for the same symbol produce
/// duplicate rows and nothing is ever updated or deleted by this service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Surrogate id assigned by the store; `None` before insertion.
    pub id: Option<i64>,
    pub symbol: String,
    pub open_price: f64,
    pub close_price: f64,
}

impl Quote {
    pub fn new(symbol: impl Into<String>, open_price: f64, close_price: f64) -> Self {
        Self {
            id: None,
            symbol: symbol.into(),
            open_price,
            close_price,
        }
    }
}
