//! External service clients.

pub mod alpha_vantage;
