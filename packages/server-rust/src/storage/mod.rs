//! Invoice persistence.
//!
//! Defines the row types written by the invoice actions and the concrete
//! [`InvoiceStore`](crate::traits::InvoiceStore) backends:
//!
//! - [`MemoryInvoiceStore`]: `DashMap`-backed, for development and tests
//! - [`PostgresInvoiceStore`]: `sqlx` pool over an `invoices` table
//!   (feature `postgres`)

pub mod engines;
pub mod record;

pub use engines::*;
pub use record::*;
