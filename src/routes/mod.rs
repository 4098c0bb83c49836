use std::sync::Arc;

use axum::Router;

use crate::AppContext;

mod dashboard;
mod health;
mod last_window;
mod predict;

// ---

pub fn router(ctx: Arc<AppContext>) -> Router {
    // ---
    Router::new()
        .merge(dashboard::router())
        .merge(last_window::router())
        .merge(predict::router())
        .merge(health::router())
        .with_state(ctx)
}
