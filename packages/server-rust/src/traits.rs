use async_trait::async_trait;
use uuid::Uuid;

use crate::storage::{InvoiceChanges, InvoiceRecord};

/// Pluggable persistence backend for invoices.
/// Implementations: `PostgreSQL` (feature `postgres`), memory (default, tests).
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a new row.
    async fn insert(&self, invoice: &InvoiceRecord) -> anyhow::Result<()>;

    /// Overwrite the mutable columns of an existing row.
    /// Returns the updated row, or `None` if no row has this id.
    async fn update(
        &self,
        id: Uuid,
        changes: &InvoiceChanges,
    ) -> anyhow::Result<Option<InvoiceRecord>>;

    /// Delete a row. Returns `false` if no row had this id.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Load a single row by id.
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<InvoiceRecord>>;

    /// Load all rows, newest date first.
    async fn list(&self) -> anyhow::Result<Vec<InvoiceRecord>>;

    /// One-time initialization (e.g., create the table).
    async fn initialize(&self) -> anyhow::Result<()>;

    /// Release resources and close connections.
    async fn close(&self) -> anyhow::Result<()>;
}
