//! MarketIQ stock quote service
//!
//! Proxies intraday quote requests to Alpha Vantage, caches payloads in
//! process memory with a fixed freshness window, and appends fetched
//! quotes to PostgreSQL.

pub mod cache;
pub mod config;
pub mod core;
pub mod db;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
