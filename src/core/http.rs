//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::cache::QuoteCache;
use crate::db::{PostgresQuoteStore, QuoteStore, StoreError};
use crate::metrics::Metrics;
use crate::models::Quote;
use crate::services::alpha_vantage::{
    classify, AlphaVantageClient, IntradayPayload, ProviderError,
};

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub cache: QuoteCache,
    pub store: Arc<dyn QuoteStore>,
    pub provider: Arc<AlphaVantageClient>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Error taxonomy for the quote endpoint. Each variant maps to a status
/// code and a `{"detail": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The provider reported key exhaustion in the response body.
    #[error("provider rate limit reached")]
    RateLimited,
    /// The response carried neither a rate-limit signal nor a usable series.
    #[error("unrecognized provider response")]
    InvalidResponse,
    /// Transport-level failure reaching the provider.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The quote row could not be committed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "API limit exceeded. Please try again later.",
            ),
            ApiError::InvalidResponse => (
                StatusCode::BAD_REQUEST,
                "Invalid response from API. Please check the stock symbol.",
            ),
            ApiError::Provider(_) => (
                StatusCode::BAD_GATEWAY,
                "Market data provider is unreachable. Please try again later.",
            ),
            ApiError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to persist quote data.",
            ),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

async fn home() -> Json<Value> {
    Json(json!({ "message": "Welcome to MarketIQ AI!" }))
}

/// Fetch a quote for `symbol`: serve from cache when fresh, otherwise call
/// the provider, persist the latest bar, refresh the cache, and return the
/// full provider payload.
///
/// The cache probe and the cache write are not atomic across requests, so
/// two concurrent misses for the same symbol may both reach the provider
/// and both insert a row. Accepted behavior.
async fn get_stock(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if let Some(payload) = state.cache.get_fresh(&symbol).await {
        state.metrics.cache_hits_total.inc();
        info!(symbol = %symbol, "serving quote from cache");
        return Ok(Json(payload));
    }
    state.metrics.cache_misses_total.inc();

    state.metrics.provider_requests_total.inc();
    let payload = state.provider.fetch_intraday(&symbol).await.map_err(|e| {
        error!(error = %e, symbol = %symbol, "provider request failed");
        e
    })?;

    match classify(&payload) {
        IntradayPayload::RateLimited => {
            warn!(symbol = %symbol, "provider rate limit reached");
            Err(ApiError::RateLimited)
        }
        IntradayPayload::TimeSeries(bar) => {
            let quote = Quote::new(symbol.clone(), bar.open, bar.close);
            let id = state.store.insert_quote(&quote).await.map_err(|e| {
                error!(error = %e, symbol = %symbol, "failed to persist quote");
                e
            })?;
            state.cache.put(&symbol, payload.clone(), Utc::now()).await;
            info!(
                symbol = %symbol,
                quote_id = id,
                timestamp = %bar.timestamp,
                open = bar.open,
                close = bar.close,
                "quote fetched and persisted"
            );
            Ok(Json(payload))
        }
        IntradayPayload::Unrecognized => {
            warn!(symbol = %symbol, "unrecognized provider response");
            Err(ApiError::InvalidResponse)
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "marketiq-quote-service"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/stock/{symbol}", get(get_stock))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let start_time = Arc::new(Instant::now());

    let database_url = crate::config::get_database_url();
    let store = PostgresQuoteStore::connect(&database_url).await?;
    info!("PostgreSQL connected for quote store");

    let state = AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics: metrics.clone(),
        start_time: start_time.clone(),
        cache: QuoteCache::new(),
        store: Arc::new(store),
        provider: Arc::new(AlphaVantageClient::new()),
    };
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
