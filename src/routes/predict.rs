//! Next-hour forecast endpoint.
//!
//! Recomputes the feature matrix over the full in-memory series on every
//! request (the series is small and bounded, see the service module), feeds
//! the most recent valid feature row to the model, and maps the prediction
//! through the AQI table.

use std::sync::Arc;

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use tracing::{error, info};

use super::last_window::ApiError;
use crate::AppContext;

// ---

pub fn router() -> Router<Arc<AppContext>> {
    // ---
    Router::new().route("/api/predict", get(handler))
}

async fn handler(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    // ---
    info!("GET /api/predict");

    match ctx.forecaster.predict_next_hour() {
        Ok(forecast) => {
            info!(
                "Forecast: {} ug/m3 (AQI {}, {})",
                forecast.next_hour_prediction_ugm3,
                forecast.next_hour_prediction_aqi,
                forecast.aqi_category_text
            );
            (StatusCode::OK, Json(forecast)).into_response()
        }
        Err(e) => {
            error!("Prediction unavailable: {}", e);
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
