pub mod handlers;
pub mod requests;

use axum::routing::post;
use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/query", post(handlers::post_query))
}
