//! Service-area ZIP lookup.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::area::Zip;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Lookup response body.
#[derive(Debug, Serialize)]
pub struct ServiceAreaResponse {
    /// The ZIP that was checked.
    pub zip: Zip,
    /// Whether Curbside serves it.
    pub eligible: bool,
}

/// GET /api/service-area/{zip} - check a ZIP against the served area.
#[instrument(skip(state))]
pub async fn lookup(
    State(state): State<AppState>,
    Path(zip): Path<String>,
) -> Result<Json<ServiceAreaResponse>> {
    let zip = Zip::parse(&zip).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let eligible = state.service_area().is_served(&zip);

    if !eligible {
        tracing::info!(zip = %zip, "ZIP outside service area");
    }

    Ok(Json(ServiceAreaResponse { zip, eligible }))
}
