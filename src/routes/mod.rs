use axum::Router;

use crate::{
    models::{Category, MenuItem},
    state::AppState,
};

pub mod common;
mod resource;

pub use resource::{resource_router, InsertAck};

pub fn api_router() -> Router<AppState> {
    // every collection gets the same five routes
    Router::new()
        .merge(resource_router::<Category>())
        .merge(resource_router::<MenuItem>())
}
