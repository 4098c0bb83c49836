//! Recent-history endpoint: the last 72 processed hours for the chart.

use std::sync::Arc;

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use serde::Serialize;
use tracing::{error, info};

use crate::service::RECENT_WINDOW_HOURS;
use crate::AppContext;

// ---

/// JSON error body shared by the API routes.
#[derive(Serialize)]
pub(super) struct ApiError {
    pub error: String,
}

pub fn router() -> Router<Arc<AppContext>> {
    // ---
    Router::new().route("/api/last", get(handler))
}

async fn handler(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    // ---
    info!("GET /api/last");

    match ctx.forecaster.recent_window(RECENT_WINDOW_HOURS) {
        Ok(window) => (StatusCode::OK, Json(window)).into_response(),
        Err(e) => {
            error!("Recent window unavailable: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
