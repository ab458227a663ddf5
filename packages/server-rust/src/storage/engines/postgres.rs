//! `PostgreSQL` [`InvoiceStore`] implementation using a `sqlx` connection pool.
//!
//! Statements are plain runtime queries with bound parameters. Reads cast
//! `amount` to `BIGINT` so tables created with an `INT` column load too.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::storage::record::{InvoiceChanges, InvoiceRecord};
use crate::traits::InvoiceStore;

pub const CREATE_INVOICES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS invoices (
    id UUID PRIMARY KEY,
    customer_id TEXT NOT NULL,
    amount BIGINT NOT NULL,
    status VARCHAR(255) NOT NULL,
    date DATE NOT NULL
)";

const SELECT_COLUMNS: &str =
    "id, customer_id::TEXT AS customer_id, amount::BIGINT AS amount, status, date";

/// Invoice table in a `PostgreSQL` database.
pub struct PostgresInvoiceStore {
    pool: PgPool,
}

impl PostgresInvoiceStore {
    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool to `database_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or the server is unreachable.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }
}

fn row_to_record(row: &PgRow) -> anyhow::Result<InvoiceRecord> {
    let status: String = row.try_get("status")?;
    Ok(InvoiceRecord {
        id: row.try_get::<Uuid, _>("id")?,
        customer_id: row.try_get("customer_id")?,
        amount: row.try_get::<i64, _>("amount")?,
        status: status.parse()?,
        date: row.try_get::<NaiveDate, _>("date")?,
    })
}

#[async_trait]
impl InvoiceStore for PostgresInvoiceStore {
    async fn insert(&self, invoice: &InvoiceRecord) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO invoices (id, customer_id, amount, status, date) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(invoice.id)
        .bind(&invoice.customer_id)
        .bind(invoice.amount)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &InvoiceChanges,
    ) -> anyhow::Result<Option<InvoiceRecord>> {
        let sql = format!(
            "UPDATE invoices SET amount = $1, customer_id = $2, status = $3 \
             WHERE id = $4 RETURNING {SELECT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(changes.amount)
            .bind(&changes.customer_id)
            .bind(changes.status.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<InvoiceRecord>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM invoices WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn list(&self) -> anyhow::Result<Vec<InvoiceRecord>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM invoices ORDER BY date DESC, id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_record).collect()
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_INVOICES_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
