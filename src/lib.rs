pub mod appresult;
pub mod clock;
pub mod config;
pub mod models;
pub mod store;
pub mod sweeper;
pub mod validation;

mod messages;
mod participants;
mod status;

use axum::{extract::FromRef, routing::post, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use appresult::{AppError, AppResult};
use store::SharedStore;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: SharedStore,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(participants::router())
        .merge(messages::router())
        .route("/status", post(status::heartbeat))

        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
