//! PostgreSQL quote store
//!
//! Append-only `stocks` table. Each insert is its own transaction; no read
//! or query operation is part of this service's contract.

use crate::models::Quote;
use async_trait::async_trait;
use thiserror::Error;
use tokio_postgres::{Client, NoTls};
use tracing::error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("quote store operation failed: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

/// Storage seam for fetched quotes, injected into the HTTP state so tests
/// can substitute an in-memory recorder.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Append one quote row and return its generated id.
    async fn insert_quote(&self, quote: &Quote) -> Result<i64, StoreError>;
}

pub struct PostgresQuoteStore {
    client: Client,
}

impl PostgresQuoteStore {
    /// Connect and ensure the schema exists. The connection task is spawned
    /// onto the runtime; a broken connection is logged and subsequent
    /// statements fail with [`StoreError::Postgres`].
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        let store = Self { client };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.client
            .execute(
                "CREATE TABLE IF NOT EXISTS stocks (
                    id BIGSERIAL PRIMARY KEY,
                    symbol TEXT NOT NULL,
                    open_price DOUBLE PRECISION NOT NULL,
                    close_price DOUBLE PRECISION NOT NULL
                )",
                &[],
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl QuoteStore for PostgresQuoteStore {
    async fn insert_quote(&self, quote: &Quote) -> Result<i64, StoreError> {
        let row = self
            .client
            .query_one(
                "INSERT INTO stocks (symbol, open_price, close_price)
                 VALUES ($1, $2, $3)
                 RETURNING id",
                &[&quote.symbol, &quote.open_price, &quote.close_price],
            )
            .await?;
        Ok(row.get(0))
    }
}
