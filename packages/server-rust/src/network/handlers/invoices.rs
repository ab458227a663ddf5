//! Invoice endpoints: form-encoded mutations and JSON reads.
//!
//! Mutations reject with 503 once shutdown has begun and hold an in-flight
//! guard while they write, so draining waits for them.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use invoicedesk_core::Submission;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use super::AppState;
use crate::actions::{ActionError, INTERNAL_FORM_MESSAGE};
use crate::network::{HealthState, InFlightGuard};
use crate::storage::InvoiceRecord;

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation { message, errors } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "message": message, "errors": errors })),
            )
                .into_response(),
            Self::NotFound { id } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": format!("Invoice {id} not found.") })),
            )
                .into_response(),
            Self::Storage { message, source } => {
                error!(error = %source, "{message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": message })),
                )
                    .into_response()
            }
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": INTERNAL_FORM_MESSAGE })),
            )
                .into_response(),
        }
    }
}

/// Admits a mutation unless the server is draining.
fn admit(state: &AppState) -> Result<InFlightGuard, Response> {
    match state.shutdown.health_state() {
        HealthState::Draining | HealthState::Stopped => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "Server is shutting down." })),
        )
            .into_response()),
        HealthState::Starting | HealthState::Ready => Ok(state.shutdown.in_flight_guard()),
    }
}

/// `POST /invoices` -- validate the form and create an invoice.
pub async fn create_invoice_handler(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<(StatusCode, Json<InvoiceRecord>), Response> {
    let _guard = admit(&state)?;
    let invoice = state
        .actions
        .create_invoice(&Submission::from(fields))
        .await
        .map_err(IntoResponse::into_response)?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// `PUT /invoices/{id}` -- validate the form and update the invoice.
pub async fn update_invoice_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<InvoiceRecord>, Response> {
    let _guard = admit(&state)?;
    let invoice = state
        .actions
        .update_invoice(&id, &Submission::from(fields))
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(invoice))
}

/// `DELETE /invoices/{id}`.
pub async fn delete_invoice_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, Response> {
    let _guard = admit(&state)?;
    state
        .actions
        .delete_invoice(&id)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /invoices`, newest first.
pub async fn list_invoices_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<InvoiceRecord>>, ActionError> {
    let invoices = state
        .actions
        .store()
        .list()
        .await
        .map_err(|source| ActionError::Storage {
            message: "Database Error: Failed to Fetch Invoices.",
            source,
        })?;
    Ok(Json(invoices))
}

/// `GET /invoices/{id}`.
pub async fn get_invoice_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceRecord>, ActionError> {
    let not_found = || ActionError::NotFound { id: id.clone() };
    let uuid = Uuid::parse_str(&id).map_err(|_| not_found())?;
    state
        .actions
        .store()
        .get(uuid)
        .await
        .map_err(|source| ActionError::Storage {
            message: "Database Error: Failed to Fetch Invoice.",
            source,
        })?
        .map(Json)
        .ok_or_else(not_found)
}
