//! Invoice mutation actions: validate a form submission, then write it.
//!
//! Each action validates against its schema first and only touches the
//! store when the submission is valid. Validation failures carry every
//! field's messages so the caller can show them all at once.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use invoicedesk_core::{
    create_invoice_schema, update_invoice_schema, FieldErrors, FormSchema, FormValidator,
    InvoiceForm, InvoiceFormError, Submission,
};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::storage::{InvoiceChanges, InvoiceRecord};
use crate::traits::InvoiceStore;

pub const CREATE_VALIDATION_MESSAGE: &str = "Missing Fields. Failed to Create Invoice.";
pub const UPDATE_VALIDATION_MESSAGE: &str = "Missing Fields. Failed to Update Invoice.";
pub const CREATE_STORAGE_MESSAGE: &str = "Database Error: Failed to Create Invoice.";
pub const UPDATE_STORAGE_MESSAGE: &str = "Database Error: Failed to Update Invoice.";
pub const DELETE_STORAGE_MESSAGE: &str = "Database Error: Failed to Delete Invoice.";
pub const INTERNAL_FORM_MESSAGE: &str = "Internal Error: Invoice form did not match its schema.";

/// Errors returned by invoice actions.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("{message}")]
    Validation {
        message: &'static str,
        errors: FieldErrors,
    },
    #[error("invoice not found: {id}")]
    NotFound { id: String },
    #[error("{message}")]
    Storage {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
    /// A valid record could not be read as an invoice form.
    #[error("Internal Error: Invoice form did not match its schema.")]
    Internal(#[source] InvoiceFormError),
}

/// Which action ran, for logs and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Create,
    Update,
    Delete,
}

impl ActionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Runs an action inside an `invoice_action` span and records its outcome.
async fn observe<T, F>(kind: ActionKind, action: F) -> Result<T, ActionError>
where
    F: Future<Output = Result<T, ActionError>>,
{
    let span = info_span!(
        "invoice_action",
        action = kind.as_str(),
        duration_ms = tracing::field::Empty,
        outcome = tracing::field::Empty,
    );

    async move {
        let start = Instant::now();
        let result = action.await;
        let elapsed = start.elapsed();

        let outcome = match &result {
            Ok(_) => "ok",
            Err(ActionError::Validation { .. }) => "invalid",
            Err(ActionError::NotFound { .. }) => "not_found",
            Err(ActionError::Storage { .. } | ActionError::Internal(_)) => "error",
        };

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = elapsed.as_millis() as u64;
        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::Span::current().record("outcome", outcome);

        metrics::counter!(
            "invoice_mutations_total",
            "action" => kind.as_str(),
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!("invoice_mutation_duration_seconds", "action" => kind.as_str())
            .record(elapsed.as_secs_f64());

        result
    }
    .instrument(span)
    .await
}

/// Parses a route id. Malformed ids cannot name an existing invoice.
fn parse_id(id: &str) -> Result<Uuid, ActionError> {
    Uuid::parse_str(id).map_err(|_| ActionError::NotFound { id: id.to_string() })
}

/// Create, update, and delete operations over an [`InvoiceStore`].
pub struct InvoiceActions {
    store: Arc<dyn InvoiceStore>,
    create_schema: FormSchema,
    update_schema: FormSchema,
    today: fn() -> NaiveDate,
}

impl InvoiceActions {
    /// Creates actions over `store`, dating new invoices with the UTC calendar day.
    #[must_use]
    pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
        Self {
            store,
            create_schema: create_invoice_schema(),
            update_schema: update_invoice_schema(),
            today: || Utc::now().date_naive(),
        }
    }

    /// Replaces the date source for new invoices.
    #[must_use]
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Shared handle to the underlying store.
    #[must_use]
    pub fn store(&self) -> Arc<dyn InvoiceStore> {
        Arc::clone(&self.store)
    }

    fn validate(
        schema: &FormSchema,
        submission: &Submission,
        message: &'static str,
    ) -> Result<InvoiceForm, ActionError> {
        let record = FormValidator::new(schema)
            .validate(submission)
            .into_result()
            .map_err(|errors| ActionError::Validation { message, errors })?;
        InvoiceForm::from_record(&record).map_err(|e| {
            error!(error = %e, "validated record does not convert to an invoice form");
            ActionError::Internal(e)
        })
    }

    /// Validates a submission and inserts a new invoice dated today.
    ///
    /// # Errors
    ///
    /// [`ActionError::Validation`] for an invalid form, [`ActionError::Storage`]
    /// if the insert fails.
    pub async fn create_invoice(&self, submission: &Submission) -> Result<InvoiceRecord, ActionError> {
        observe(ActionKind::Create, self.create_inner(submission)).await
    }

    async fn create_inner(&self, submission: &Submission) -> Result<InvoiceRecord, ActionError> {
        let form = Self::validate(&self.create_schema, submission, CREATE_VALIDATION_MESSAGE)?;
        let invoice = InvoiceRecord::from_form(&form, (self.today)());

        self.store
            .insert(&invoice)
            .await
            .map_err(|source| ActionError::Storage {
                message: CREATE_STORAGE_MESSAGE,
                source,
            })?;

        info!(
            invoice_id = %invoice.id,
            customer_id = %invoice.customer_id,
            amount_cents = invoice.amount,
            status = %invoice.status,
            "invoice created"
        );
        Ok(invoice)
    }

    /// Validates a submission and overwrites amount, customer, and status.
    ///
    /// # Errors
    ///
    /// [`ActionError::Validation`] for an invalid form, [`ActionError::NotFound`]
    /// if no invoice has `id`, [`ActionError::Storage`] if the update fails.
    pub async fn update_invoice(
        &self,
        id: &str,
        submission: &Submission,
    ) -> Result<InvoiceRecord, ActionError> {
        observe(ActionKind::Update, self.update_inner(id, submission)).await
    }

    async fn update_inner(
        &self,
        id: &str,
        submission: &Submission,
    ) -> Result<InvoiceRecord, ActionError> {
        let form = Self::validate(&self.update_schema, submission, UPDATE_VALIDATION_MESSAGE)?;
        let uuid = parse_id(id)?;
        let changes = InvoiceChanges::from(&form);

        let updated = self
            .store
            .update(uuid, &changes)
            .await
            .map_err(|source| ActionError::Storage {
                message: UPDATE_STORAGE_MESSAGE,
                source,
            })?
            .ok_or_else(|| ActionError::NotFound { id: id.to_string() })?;

        info!(invoice_id = %updated.id, amount_cents = updated.amount, status = %updated.status, "invoice updated");
        Ok(updated)
    }

    /// Deletes an invoice.
    ///
    /// # Errors
    ///
    /// [`ActionError::NotFound`] if no invoice has `id`, [`ActionError::Storage`]
    /// if the delete fails.
    pub async fn delete_invoice(&self, id: &str) -> Result<(), ActionError> {
        observe(ActionKind::Delete, self.delete_inner(id)).await
    }

    async fn delete_inner(&self, id: &str) -> Result<(), ActionError> {
        let uuid = parse_id(id)?;
        let removed = self
            .store
            .delete(uuid)
            .await
            .map_err(|source| ActionError::Storage {
                message: DELETE_STORAGE_MESSAGE,
                source,
            })?;

        if removed {
            info!(invoice_id = %uuid, "invoice deleted");
            Ok(())
        } else {
            warn!(invoice_id = %uuid, "delete requested for unknown invoice");
            Err(ActionError::NotFound { id: id.to_string() })
        }
    }
}
