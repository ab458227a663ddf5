//! Invoice form schemas and the typed form extracted from a valid record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::{Constraint, FieldRule, FormSchema, Record};

pub const FIELD_ID: &str = "id";
pub const FIELD_CUSTOMER_ID: &str = "customerId";
pub const FIELD_AMOUNT: &str = "amount";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_DATE: &str = "date";

/// Smallest accepted amount in dollars: one cent.
pub const MIN_AMOUNT: f64 = 0.01;
/// Largest accepted amount in dollars. Its cents stay exact in `f64` and `i64`.
pub const MAX_AMOUNT: f64 = 10_000_000_000.0;

const AMOUNT_MESSAGE: &str = "Please enter an amount greater than $0.";
const AMOUNT_TOO_LARGE_MESSAGE: &str = "Please enter an amount no greater than $10,000,000,000.";

/// Payment state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    /// All statuses, in form order.
    pub const ALL: [Self; 2] = [Self::Pending, Self::Paid];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing an [`InvoiceStatus`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown invoice status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for InvoiceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Full invoice form: `id`, `customerId`, `amount`, `status`, `date`.
#[must_use]
pub fn invoice_form_schema() -> FormSchema {
    let statuses: Vec<&str> = InvoiceStatus::ALL.iter().map(|s| s.as_str()).collect();

    FormSchema::new()
        .field(FieldRule::text(FIELD_ID))
        .field(FieldRule::text(FIELD_CUSTOMER_ID).type_message("Please select a customer."))
        .field(
            FieldRule::number(FIELD_AMOUNT)
                .constraint(Constraint::at_least(MIN_AMOUNT).with_message(AMOUNT_MESSAGE))
                .constraint(Constraint::at_most(MAX_AMOUNT).with_message(AMOUNT_TOO_LARGE_MESSAGE)),
        )
        .field(
            FieldRule::text(FIELD_STATUS)
                .type_message("Please select an invoice status.")
                .constraint(
                    Constraint::one_of(&statuses).with_message("Please select an invoice status."),
                ),
        )
        .field(FieldRule::text(FIELD_DATE))
}

/// Schema for creating an invoice. `id` and `date` are assigned server-side.
#[must_use]
pub fn create_invoice_schema() -> FormSchema {
    invoice_form_schema().omit(&[FIELD_ID, FIELD_DATE])
}

/// Schema for updating an invoice. The id comes from the route, not the form.
#[must_use]
pub fn update_invoice_schema() -> FormSchema {
    invoice_form_schema().omit(&[FIELD_ID, FIELD_DATE])
}

/// Error converting a record that did not come from an invoice schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvoiceFormError {
    #[error("record is missing field {0:?}")]
    MissingField(&'static str),
    #[error("field {field:?} has unexpected type {found}")]
    WrongType {
        field: &'static str,
        found: &'static str,
    },
    #[error(transparent)]
    Status(#[from] UnknownStatus),
}

/// Typed invoice fields taken from a validated create/update record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceForm {
    pub customer_id: String,
    /// Amount in dollars, as entered.
    pub amount: f64,
    pub status: InvoiceStatus,
}

impl InvoiceForm {
    /// Extracts the invoice fields from a record validated by
    /// [`create_invoice_schema`] or [`update_invoice_schema`].
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceFormError`] if a field is missing or mistyped,
    /// which only happens for records from a different schema.
    pub fn from_record(record: &Record) -> Result<Self, InvoiceFormError> {
        let customer_id = text_field(record, FIELD_CUSTOMER_ID)?.to_string();
        let amount = match record.get(FIELD_AMOUNT) {
            Some(v) => v.as_number().ok_or(InvoiceFormError::WrongType {
                field: FIELD_AMOUNT,
                found: v.kind(),
            })?,
            None => return Err(InvoiceFormError::MissingField(FIELD_AMOUNT)),
        };
        let status = text_field(record, FIELD_STATUS)?.parse()?;

        Ok(Self {
            customer_id,
            amount,
            status,
        })
    }

    /// Amount in whole cents, rounded to the nearest cent.
    ///
    /// Amounts accepted by the invoice schemas give `1..=MAX_AMOUNT * 100`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn amount_in_cents(&self) -> i64 {
        // f64 -> i64 `as` saturates at the bounds.
        (self.amount * 100.0).round() as i64
    }
}

fn text_field<'r>(record: &'r Record, field: &'static str) -> Result<&'r str, InvoiceFormError> {
    let value = record.get(field).ok_or(InvoiceFormError::MissingField(field))?;
    value.as_text().ok_or(InvoiceFormError::WrongType {
        field,
        found: value.kind(),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::schema::Submission;
    use crate::types::Value;
    use crate::validator::validate;

    fn form(customer: &str, amount: &str, status: &str) -> Submission {
        Submission::new()
            .with(FIELD_CUSTOMER_ID, customer)
            .with(FIELD_AMOUNT, amount)
            .with(FIELD_STATUS, status)
    }

    #[test]
    fn create_schema_omits_id_and_date() {
        let schema = create_invoice_schema();
        let names: Vec<_> = schema.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, [FIELD_CUSTOMER_ID, FIELD_AMOUNT, FIELD_STATUS]);
    }

    #[test]
    fn valid_create_form_converts_to_invoice_form() {
        let record = validate(&create_invoice_schema(), &form("c-1", "42.5", "pending"))
            .into_result()
            .unwrap();
        let invoice = InvoiceForm::from_record(&record).unwrap();
        assert_eq!(invoice.customer_id, "c-1");
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.amount_in_cents(), 4250);
    }

    #[test]
    fn empty_form_reports_every_field_with_customer_messages() {
        let errors = validate(&create_invoice_schema(), &Submission::new())
            .into_result()
            .unwrap_err();
        assert_eq!(
            errors.get(FIELD_CUSTOMER_ID).unwrap(),
            ["Please select a customer."]
        );
        assert_eq!(errors.get(FIELD_AMOUNT).unwrap(), ["Required"]);
        assert_eq!(
            errors.get(FIELD_STATUS).unwrap(),
            ["Please select an invoice status."]
        );
    }

    #[test]
    fn zero_and_blank_amounts_fail_the_positive_check() {
        for raw in ["0", "", "-3"] {
            let errors = validate(&create_invoice_schema(), &form("c-1", raw, "paid"))
                .into_result()
                .unwrap_err();
            assert_eq!(
                errors.get(FIELD_AMOUNT).unwrap(),
                ["Please enter an amount greater than $0."],
                "amount {raw:?}"
            );
        }
    }

    #[test]
    fn sub_cent_amounts_are_rejected() {
        for raw in ["0.001", "0.004", "0.0099"] {
            let errors = validate(&create_invoice_schema(), &form("c-1", raw, "paid"))
                .into_result()
                .unwrap_err();
            assert_eq!(
                errors.get(FIELD_AMOUNT).unwrap(),
                ["Please enter an amount greater than $0."],
                "amount {raw:?}"
            );
        }
    }

    #[test]
    fn one_cent_is_the_smallest_invoice() {
        let record = validate(&create_invoice_schema(), &form("c-1", "0.01", "paid"))
            .into_result()
            .unwrap();
        let invoice = InvoiceForm::from_record(&record).unwrap();
        assert_eq!(invoice.amount_in_cents(), 1);
    }

    #[test]
    fn amounts_beyond_the_maximum_are_rejected() {
        for raw in ["1e300", "10000000000.01", "1e19"] {
            let errors = validate(&update_invoice_schema(), &form("c-1", raw, "paid"))
                .into_result()
                .unwrap_err();
            assert_eq!(
                errors.get(FIELD_AMOUNT).unwrap(),
                ["Please enter an amount no greater than $10,000,000,000."],
                "amount {raw:?}"
            );
        }
    }

    #[test]
    fn maximum_amount_converts_exactly() {
        let record = validate(
            &create_invoice_schema(),
            &form("c-1", &MAX_AMOUNT.to_string(), "paid"),
        )
        .into_result()
        .unwrap();
        let invoice = InvoiceForm::from_record(&record).unwrap();
        assert_eq!(invoice.amount_in_cents(), 1_000_000_000_000);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let errors = validate(&update_invoice_schema(), &form("c-1", "10", "overdue"))
            .into_result()
            .unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), [FIELD_STATUS]);
    }

    #[test]
    fn cents_round_to_nearest() {
        let invoice = InvoiceForm {
            customer_id: "c".into(),
            amount: 0.29,
            status: InvoiceStatus::Paid,
        };
        // 0.29 * 100.0 == 28.999999999999996
        assert_eq!(invoice.amount_in_cents(), 29);
    }

    #[test]
    fn from_record_rejects_foreign_records() {
        let mut record = Record::default();
        record.insert(FIELD_CUSTOMER_ID, Value::Integer(5));
        assert_eq!(
            InvoiceForm::from_record(&record),
            Err(InvoiceFormError::WrongType {
                field: FIELD_CUSTOMER_ID,
                found: "integer",
            })
        );

        let mut record = Record::default();
        record.insert(FIELD_CUSTOMER_ID, Value::from("c"));
        assert_eq!(
            InvoiceForm::from_record(&record),
            Err(InvoiceFormError::MissingField(FIELD_AMOUNT))
        );
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in InvoiceStatus::ALL {
            assert_eq!(status.as_str().parse::<InvoiceStatus>(), Ok(status));
        }
        assert!("PAID".parse::<InvoiceStatus>().is_err());
    }

    proptest! {
        #[test]
        fn entered_cents_survive_the_dollar_round_trip(cents in 1i64..=1_000_000_000_000) {
            #[allow(clippy::cast_precision_loss)]
            let dollars = cents as f64 / 100.0;
            let record = validate(
                &create_invoice_schema(),
                &form("c-1", &dollars.to_string(), "paid"),
            )
            .into_result()
            .expect("positive amount is valid");
            let invoice = InvoiceForm::from_record(&record).expect("record from invoice schema");
            prop_assert_eq!(invoice.amount_in_cents(), cents);
        }

        #[test]
        fn every_accepted_amount_stores_in_range_cents(amount in 0.0f64..2.0e10) {
            let submission = form("c-1", &amount.to_string(), "pending");
            if let Ok(record) = validate(&create_invoice_schema(), &submission).into_result() {
                let invoice = InvoiceForm::from_record(&record).expect("record from invoice schema");
                let cents = invoice.amount_in_cents();
                prop_assert!((1..=1_000_000_000_000).contains(&cents), "{amount} -> {cents}");
            }
        }
    }
}
