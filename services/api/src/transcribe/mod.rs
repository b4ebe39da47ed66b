pub mod client;
pub mod handlers;
pub mod responses;

use axum::routing::post;
use axum::Router;

use crate::AppState;

pub use client::{Transcriber, WhisperClient, WhisperClientConfig};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/whisper", post(handlers::post_whisper))
}
