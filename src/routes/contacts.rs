//! Contact CRUD and search handlers.
//!
//! Each operation validates its input, performs the uniqueness pre-check
//! where relevant, and issues one storage call. The unique index behind the
//! store closes the race the pre-check alone would leave open; a write that
//! loses that race surfaces the same conflict response.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::{ServerError, ServerResult};
use crate::model::ContactInput;
use crate::state::ServerState;

/// Query parameters for contact search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Free-text query; absent or empty matches all contacts.
    #[serde(default)]
    pub query: Option<String>,
}

fn parse_body(payload: Result<Json<ContactInput>, JsonRejection>) -> ServerResult<ContactInput> {
    let Json(input) = payload.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
    Ok(input)
}

/// Create a new contact
pub async fn create_contact(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ContactInput>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let input = parse_body(payload)?;
    input.validate()?;

    if state.store.find_by_email(&input.email).await?.is_some() {
        return Err(ServerError::EmailExists);
    }

    let contact = state.store.insert(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Contact added successfully",
            "contact": contact,
        })),
    ))
}

/// Get all contacts, newest first
pub async fn list_contacts(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let contacts = state.store.list().await?;
    Ok(Json(contacts))
}

/// Search contacts by name or email substring
pub async fn search_contacts(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchQuery>,
) -> ServerResult<impl IntoResponse> {
    let query = params.query.unwrap_or_default();
    // Empty query matches all, keeping an empty search box equivalent to the
    // plain listing.
    let contacts = if query.is_empty() {
        state.store.list().await?
    } else {
        state.store.search(&query).await?
    };
    Ok(Json(contacts))
}

/// Update a contact (full replacement of name, email, phone)
pub async fn update_contact(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    payload: Result<Json<ContactInput>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let input = parse_body(payload)?;
    input.validate()?;

    if state.store.email_taken_by_other(&input.email, &id).await? {
        return Err(ServerError::EmailExists);
    }

    let contact = state
        .store
        .replace(&id, input)
        .await?
        .ok_or(ServerError::ContactNotFound)?;
    Ok(Json(json!({
        "message": "Contact updated successfully",
        "contact": contact,
    })))
}

/// Delete a contact
pub async fn delete_contact(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    if !state.store.remove(&id).await? {
        return Err(ServerError::ContactNotFound);
    }
    Ok(Json(json!({
        "message": "Contact deleted successfully",
    })))
}
