use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/clubs", get(handlers::clubs::search_clubs))
        .route(
            "/api/clubs/recommended",
            get(handlers::clubs::recommended_clubs),
        )
        .route("/api/clubs/:name/grid", get(handlers::clubs::club_grid))
        .route("/api/clubs/:name/preview", get(handlers::clubs::preview_slot))
        .route(
            "/api/clubs/:name/selection",
            post(handlers::clubs::open_selection),
        )
        .route(
            "/api/selection/duration",
            post(handlers::clubs::choose_duration),
        )
}
