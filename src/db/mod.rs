//! Database module - AppState and the order record store
//!
//! - `order` - PostgreSQL queries for line items, order metadata and parties

mod order;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

use crate::config::AppConfig;
use crate::order::models::{LineItem, OrderId, OrderMeta, Party};
use crate::render::{OrderTemplate, PdfEngine, RenderError, WkhtmltopdfEngine};

pub use order::{PgRecordStore, PgSession};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection failed: {0}")]
    Connection(String),
    #[error("query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Connection(e.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Source of per-request database sessions.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Acquire one session. It is released when dropped.
    async fn open(&self) -> Result<Box<dyn StoreSession>, StoreError>;
}

/// Queries available while a session is held.
#[async_trait]
pub trait StoreSession: Send {
    async fn line_items(&mut self, order_id: OrderId) -> Result<Vec<LineItem>, StoreError>;

    async fn order_meta(&mut self, order_id: OrderId) -> Result<Option<OrderMeta>, StoreError>;

    async fn party(&mut self, user_id: i64) -> Result<Option<Party>, StoreError>;
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub template: Arc<OrderTemplate>,
    pub pdf_engine: Arc<dyn PdfEngine>,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl AppState {
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .idle_timeout(std::time::Duration::from_secs(900))
            .max_lifetime(std::time::Duration::from_secs(1800))
            .connect(&config.database_url)
            .await
            .map_err(StoreError::from)?;

        let pdf_engine = WkhtmltopdfEngine::new(config.pdf_engine_bin.clone());
        Self::new_with_pool_and_engine(pool, Arc::new(pdf_engine))
    }

    pub fn new_with_pool_and_engine(
        pool: PgPool,
        pdf_engine: Arc<dyn PdfEngine>,
    ) -> Result<Self, StartupError> {
        Self::with_parts(Arc::new(PgRecordStore::new(pool)), pdf_engine)
    }

    /// Assemble state from arbitrary collaborators.
    pub fn with_parts(
        store: Arc<dyn RecordStore>,
        pdf_engine: Arc<dyn PdfEngine>,
    ) -> Result<Self, StartupError> {
        Ok(AppState {
            store,
            template: Arc::new(OrderTemplate::load()?),
            pdf_engine,
        })
    }
}
