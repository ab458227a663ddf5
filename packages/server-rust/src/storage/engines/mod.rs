//! [`InvoiceStore`](crate::traits::InvoiceStore) implementations.
//!
//! [`MemoryInvoiceStore`] is always available; [`PostgresInvoiceStore`]
//! requires the `postgres` feature.

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use memory::MemoryInvoiceStore;
#[cfg(feature = "postgres")]
pub use postgres::{PostgresInvoiceStore, CREATE_INVOICES_TABLE};
