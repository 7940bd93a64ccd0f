//! Live pricing for the signup form.
//!
//! The form calls this on every selection change, so the request is not
//! required to be a complete selection - services without a frequency just
//! price to zero, exactly as the engine defines.

use axum::{Json, extract::State};
use curbside_core::{Quote, SelectionState};
use serde::Deserialize;
use tracing::instrument;

use crate::state::AppState;

/// Quote request body.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    /// The (possibly incomplete) selection to price.
    pub selection: SelectionState,
}

/// POST /api/quote - price a selection.
#[instrument(skip(state, request))]
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Json<Quote> {
    Json(state.pricing().quote(&request.selection))
}
