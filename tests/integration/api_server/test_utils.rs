//! Test utilities for API server integration tests

use async_trait::async_trait;
use axum_test::TestServer;
use marketiq::cache::QuoteCache;
use marketiq::core::http::{create_router, AppState, HealthStatus};
use marketiq::db::{QuoteStore, StoreError};
use marketiq::metrics::Metrics;
use marketiq::models::Quote;
use marketiq::services::alpha_vantage::AlphaVantageClient;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// In-memory quote store that records every insert.
#[derive(Default)]
pub struct RecordingStore {
    rows: RwLock<Vec<Quote>>,
}

impl RecordingStore {
    pub async fn rows(&self) -> Vec<Quote> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl QuoteStore for RecordingStore {
    async fn insert_quote(&self, quote: &Quote) -> Result<i64, StoreError> {
        let mut rows = self.rows.write().await;
        let id = rows.len() as i64 + 1;
        let mut stored = quote.clone();
        stored.id = Some(id);
        rows.push(stored);
        Ok(id)
    }
}

/// Store whose inserts always fail, for exercising the commit-error path.
///
/// `StoreError::Postgres` wraps a `tokio_postgres::Error`, which has no
/// public constructor, so a real one is produced by dialing a closed port.
pub struct FailingStore;

#[async_trait]
impl QuoteStore for FailingStore {
    async fn insert_quote(&self, _quote: &Quote) -> Result<i64, StoreError> {
        let err = tokio_postgres::connect(
            "host=127.0.0.1 port=1 user=marketiq connect_timeout=1",
            tokio_postgres::NoTls,
        )
        .await
        .err()
        .expect("connection to a closed port fails");
        Err(StoreError::Postgres(err))
    }
}

/// Helper structure bundling together the HTTP server and mocked dependencies.
#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub provider: MockServer,
    pub store: Arc<RecordingStore>,
    pub cache: QuoteCache,
    pub metrics: Arc<Metrics>,
}

impl TestApp {
    pub async fn new() -> Self {
        let provider = MockServer::start().await;
        let store = Arc::new(RecordingStore::default());
        let cache = QuoteCache::new();
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));

        let client = AlphaVantageClient::with_client(
            provider.uri(),
            reqwest::Client::new(),
            "test-key".to_string(),
        );

        let state = AppState {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
            cache: cache.clone(),
            store: store.clone(),
            provider: Arc::new(client),
        };

        let router = create_router(state);
        let server = TestServer::new(router).expect("start test server");

        Self {
            server,
            provider,
            store,
            cache,
            metrics,
        }
    }

    /// Server wired to an arbitrary store, for store-failure scenarios.
    pub async fn with_store(store: Arc<dyn QuoteStore>) -> (TestServer, MockServer, QuoteCache) {
        let provider = MockServer::start().await;
        let cache = QuoteCache::new();
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));

        let client = AlphaVantageClient::with_client(
            provider.uri(),
            reqwest::Client::new(),
            "test-key".to_string(),
        );

        let state = AppState {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            cache: cache.clone(),
            store,
            provider: Arc::new(client),
        };

        let server = TestServer::new(create_router(state)).expect("start test server");
        (server, provider, cache)
    }

    /// Number of requests the mocked provider has received.
    pub async fn provider_request_count(&self) -> usize {
        self.provider
            .received_requests()
            .await
            .expect("wiremock requests")
            .len()
    }
}

/// A well-formed intraday response with two bars; the 19:55 bar is latest.
pub fn intraday_payload(symbol: &str) -> Value {
    json!({
        "Meta Data": {
            "1. Information": "Intraday (5min) open, high, low, close prices and volume",
            "2. Symbol": symbol,
            "4. Interval": "5min"
        },
        "Time Series (5min)": {
            "2024-01-02 19:50:00": {
                "1. open": "186.8800",
                "2. high": "187.1000",
                "3. low": "186.7500",
                "4. close": "187.0200",
                "5. volume": "2311"
            },
            "2024-01-02 19:55:00": {
                "1. open": "187.3100",
                "2. high": "187.4000",
                "3. low": "187.0500",
                "4. close": "187.1500",
                "5. volume": "1021"
            }
        }
    })
}

pub fn rate_limit_payload() -> Value {
    json!({
        "Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."
    })
}

pub fn unknown_symbol_payload() -> Value {
    json!({
        "Error Message": "Invalid API call. Please retry or visit the documentation for TIME_SERIES_INTRADAY."
    })
}

/// Mount a provider response for one symbol.
pub async fn mock_intraday(server: &MockServer, symbol: &str, body: Value) {
    Mock::given(method("GET"))
        .and(query_param("function", "TIME_SERIES_INTRADAY"))
        .and(query_param("interval", "5min"))
        .and(query_param("symbol", symbol))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
