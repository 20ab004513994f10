//! Classification of Alpha Vantage intraday payloads
//!
//! Parsing is decoupled from the request handler: a pure function maps the
//! untyped JSON body onto a tagged variant the handler can match on.

use serde_json::Value;

const TIME_SERIES_KEY: &str = "Time Series (5min)";
const OPEN_FIELD: &str = "1. open";
const CLOSE_FIELD: &str = "4. close";

/// The most recent bar of an intraday series.
#[derive(Clone, Debug, PartialEq)]
pub struct LatestBar {
    pub timestamp: String,
    pub open: f64,
    pub close: f64,
}

/// What an intraday response body turned out to be.
#[derive(Clone, Debug, PartialEq)]
pub enum IntradayPayload {
    /// The API key is exhausted. Alpha Vantage signals this through a
    /// top-level "Note" (classic) or "Information" (current) string instead
    /// of an error status.
    RateLimited,
    /// A well-formed series with a usable latest bar.
    TimeSeries(LatestBar),
    /// Anything else: unknown symbol ("Error Message"), an empty series, or
    /// a bar with missing or unparseable price fields.
    Unrecognized,
}

/// Classify a raw intraday response body.
///
/// The latest bar is the entry with the greatest timestamp key. The
/// provider's `YYYY-MM-DD HH:MM:SS` keys order lexicographically the same
/// as chronologically, so no timestamp parsing is needed to pick it.
pub fn classify(payload: &Value) -> IntradayPayload {
    if payload.get("Note").map_or(false, Value::is_string)
        || payload.get("Information").map_or(false, Value::is_string)
    {
        return IntradayPayload::RateLimited;
    }

    let Some(series) = payload.get(TIME_SERIES_KEY).and_then(Value::as_object) else {
        return IntradayPayload::Unrecognized;
    };

    let Some((timestamp, bar)) = series.iter().max_by(|a, b| a.0.cmp(b.0)) else {
        return IntradayPayload::Unrecognized;
    };

    match (parse_price(bar, OPEN_FIELD), parse_price(bar, CLOSE_FIELD)) {
        (Some(open), Some(close)) => IntradayPayload::TimeSeries(LatestBar {
            timestamp: timestamp.clone(),
            open,
            close,
        }),
        _ => IntradayPayload::Unrecognized,
    }
}

fn parse_price(bar: &Value, field: &str) -> Option<f64> {
    bar.get(field)?.as_str()?.parse().ok()
}
