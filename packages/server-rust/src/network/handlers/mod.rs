//! HTTP handler definitions for the `InvoiceDesk` server.
//!
//! Defines `AppState` (the shared state carried through axum extractors)
//! and re-exports the handler functions used to build the router.

pub mod health;
pub mod invoices;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use invoices::{
    create_invoice_handler, delete_invoice_handler, get_invoice_handler, list_invoices_handler,
    update_invoice_handler,
};

use std::sync::Arc;
use std::time::Instant;

use super::ShutdownController;
use crate::actions::InvoiceActions;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Invoice mutation actions (and, through them, the store).
    pub actions: Arc<InvoiceActions>,
    /// Health state and in-flight mutation tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}
