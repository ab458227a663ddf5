//! In-memory [`InvoiceStore`] implementation backed by [`DashMap`].
//!
//! Provides concurrent read/write access without external locking.
//! Suitable for development, testing, and single-node deployments where
//! invoices do not need to survive a restart.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::storage::record::{InvoiceChanges, InvoiceRecord};
use crate::traits::InvoiceStore;

/// In-memory invoice table keyed by invoice id.
pub struct MemoryInvoiceStore {
    rows: DashMap<Uuid, InvoiceRecord>,
}

impl MemoryInvoiceStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }

    /// Number of stored invoices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for MemoryInvoiceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn insert(&self, invoice: &InvoiceRecord) -> anyhow::Result<()> {
        match self.rows.entry(invoice.id) {
            Entry::Occupied(_) => anyhow::bail!("duplicate invoice id {}", invoice.id),
            Entry::Vacant(slot) => {
                slot.insert(invoice.clone());
                Ok(())
            }
        }
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &InvoiceChanges,
    ) -> anyhow::Result<Option<InvoiceRecord>> {
        Ok(self.rows.get_mut(&id).map(|mut row| {
            row.apply(changes);
            row.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.rows.remove(&id).is_some())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<InvoiceRecord>> {
        Ok(self.rows.get(&id).map(|r| r.clone()))
    }

    async fn list(&self) -> anyhow::Result<Vec<InvoiceRecord>> {
        let mut rows: Vec<InvoiceRecord> = self.rows.iter().map(|r| r.value().clone()).collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
