//! Order lookups against the shop database

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};

use super::{RecordStore, StoreError, StoreSession};
use crate::order::models::{LineItem, OrderId, OrderMeta, Party};

const LINE_ITEMS_SQL: &str = r#"
    SELECT order_id, product_id,
           product_qty::NUMERIC AS product_qty,
           price::NUMERIC AS price,
           customer_id, vendor_id
      FROM wp_wc_order_product_lookup
     WHERE order_id = $1
     ORDER BY order_item_id
"#;

const ORDER_META_SQL: &str = "SELECT contract_number FROM wp_wc_orders WHERE id = $1";

const PARTY_SQL: &str = r#"SELECT "ID", display_name FROM wp_users WHERE "ID" = $1"#;

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn open(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgSession { conn }))
    }
}

/// One pooled connection; returned to the pool on drop.
pub struct PgSession {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl StoreSession for PgSession {
    async fn line_items(&mut self, order_id: OrderId) -> Result<Vec<LineItem>, StoreError> {
        let items = sqlx::query_as::<_, LineItem>(LINE_ITEMS_SQL)
            .bind(order_id.0)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(items)
    }

    async fn order_meta(&mut self, order_id: OrderId) -> Result<Option<OrderMeta>, StoreError> {
        let meta = sqlx::query_as::<_, OrderMeta>(ORDER_META_SQL)
            .bind(order_id.0)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(meta)
    }

    async fn party(&mut self, user_id: i64) -> Result<Option<Party>, StoreError> {
        let party = sqlx::query_as::<_, Party>(PARTY_SQL)
            .bind(user_id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(party)
    }
}
