pub mod client;
pub mod handlers;
pub mod requests;
pub mod responses;

use axum::routing::post;
use axum::Router;

use crate::AppState;

pub use client::{ChatClient, ChatClientConfig, ChatCompleter};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/chat", post(handlers::post_chat))
}
