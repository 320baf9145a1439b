pub mod config;
pub mod error;
pub mod home;
pub mod pagination;
pub mod store;
pub mod v1;

use std::sync::Arc;

use axum::Router;

use crate::store::TodoStore;

/// Shared by every request handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: TodoStore,
}

impl AppState {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(home::router())
        .nest(v1::BASE_PATH, v1::router())
        .nest("/api/todo", v1::router())
        .with_state(state)
}
