use crate::state::AppState;
use axum::{
    routing::{get, put},
    Router,
};

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod validate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(handlers::fetch_categories).post(handlers::add_category),
        )
        .route("/categories/search", get(handlers::search_categories))
        .route(
            "/categories/:id",
            put(handlers::update_category).delete(handlers::delete_category),
        )
}
