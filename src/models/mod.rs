//! Shared data models.

pub mod quote;

pub use quote::Quote;
