//! Record types for the invoice storage layer.
//!
//! [`InvoiceRecord`] is the persisted row; [`InvoiceChanges`] is the subset
//! an update writes.

use chrono::NaiveDate;
use invoicedesk_core::{InvoiceForm, InvoiceStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted row of the `invoices` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Primary key, assigned on creation.
    pub id: Uuid,
    /// Identifier of the billed customer.
    pub customer_id: String,
    /// Amount in whole cents.
    pub amount: i64,
    /// Payment state.
    pub status: InvoiceStatus,
    /// Issue date (UTC calendar day of creation).
    pub date: NaiveDate,
}

impl InvoiceRecord {
    /// Builds a new row from a validated form, with a fresh id.
    #[must_use]
    pub fn from_form(form: &InvoiceForm, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id: form.customer_id.clone(),
            amount: form.amount_in_cents(),
            status: form.status,
            date,
        }
    }

    /// Applies an update in place. The id and date are never changed.
    pub fn apply(&mut self, changes: &InvoiceChanges) {
        self.customer_id.clone_from(&changes.customer_id);
        self.amount = changes.amount;
        self.status = changes.status;
    }
}

/// Columns written by an invoice update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceChanges {
    pub customer_id: String,
    /// Amount in whole cents.
    pub amount: i64,
    pub status: InvoiceStatus,
}

impl From<&InvoiceForm> for InvoiceChanges {
    fn from(form: &InvoiceForm) -> Self {
        Self {
            customer_id: form.customer_id.clone(),
            amount: form.amount_in_cents(),
            status: form.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(amount: f64, status: InvoiceStatus) -> InvoiceForm {
        InvoiceForm {
            customer_id: "cust-1".to_string(),
            amount,
            status,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn from_form_converts_amount_to_cents() {
        let record = InvoiceRecord::from_form(&form(12.34, InvoiceStatus::Pending), day());
        assert_eq!(record.amount, 1234);
        assert_eq!(record.customer_id, "cust-1");
        assert_eq!(record.date, day());
    }

    #[test]
    fn from_form_assigns_distinct_ids() {
        let f = form(1.0, InvoiceStatus::Paid);
        assert_ne!(
            InvoiceRecord::from_form(&f, day()).id,
            InvoiceRecord::from_form(&f, day()).id
        );
    }

    #[test]
    fn apply_keeps_id_and_date() {
        let mut record = InvoiceRecord::from_form(&form(1.0, InvoiceStatus::Pending), day());
        let id = record.id;
        record.apply(&InvoiceChanges {
            customer_id: "cust-2".to_string(),
            amount: 999,
            status: InvoiceStatus::Paid,
        });
        assert_eq!(record.id, id);
        assert_eq!(record.date, day());
        assert_eq!(record.customer_id, "cust-2");
        assert_eq!(record.amount, 999);
        assert_eq!(record.status, InvoiceStatus::Paid);
    }

    #[test]
    fn record_serializes_with_lowercase_status() {
        let record = InvoiceRecord::from_form(&form(5.0, InvoiceStatus::Paid), day());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "paid");
        assert_eq!(json["amount"], 500);
        assert_eq!(json["date"], "2024-06-01");
    }
}
