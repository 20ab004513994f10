//! Persistence layer.

pub mod postgres;

pub use postgres::{PostgresQuoteStore, QuoteStore, StoreError};
