use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/expense_categories", get(handlers::expense_categories))
        .route("/api/hotel_prices", post(handlers::hotel_prices))
        .route("/api/trips", post(handlers::create_trip))
        .route("/api/user_trips_summary", get(handlers::trips_summary))
        .route("/api/trips/:trip_id/all_data", get(handlers::all_data))
        .route("/api/trips/:trip_id/costs", get(handlers::costs))
        .route(
            "/api/trips/:trip_id/:collection",
            get(handlers::list_items).post(handlers::add_item),
        )
        .route(
            "/api/trips/:trip_id/:collection/:item_id",
            put(handlers::update_item).delete(handlers::delete_item),
        )
        .with_state(state)
}
