//! HTTP service: shared state, routes and handlers.
//!
//! ## Structure
//!
//! - [`handler`] - route handlers.
//! - [`auth`] - the admin bearer-token extractor.
//! - [`error`] - mapping library errors onto HTTP responses.
//! - [`types`] - JSON request and response bodies.

pub mod auth;
pub mod error;
pub mod handler;
pub mod types;
#[cfg(test)]
mod tests;

use admission_sin::{RegistrationStore, SinAllocator, SinGenerator};
use axum::{
    Router,
    routing::{get, post},
};
use error::ApiError;
use std::{sync::Arc, time::Instant};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// The store as seen by handlers; the backend is chosen at startup.
pub type SharedStore = Arc<dyn RegistrationStore>;

/// The allocator shared by every request.
pub type Allocator = SinAllocator<SharedStore, Box<dyn SinGenerator + Send + Sync>>;

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub allocator: Arc<Allocator>,
    pub admin_token: Arc<str>,
    pub max_page_size: usize,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        store: SharedStore,
        generator: Box<dyn SinGenerator + Send + Sync>,
        admin_token: &str,
        max_page_size: usize,
    ) -> Self {
        Self {
            allocator: Arc::new(SinAllocator::new(store, generator)),
            admin_token: Arc::from(admin_token),
            max_page_size,
            started_at: Instant::now(),
        }
    }

    /// Runs `op` against the allocator on the blocking pool.
    ///
    /// Store calls may hold the allocator lock or touch the disk, so they never
    /// run on a runtime worker thread.
    pub async fn blocking<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Allocator) -> admission_sin::Result<T> + Send + 'static,
    {
        let allocator = Arc::clone(&self.allocator);
        Ok(tokio::task::spawn_blocking(move || op(&allocator)).await??)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handler::health))
        .route("/healthz", get(handler::healthz))
        .route(
            "/api/registrations",
            post(handler::create_registration).get(handler::list_registrations),
        )
        .route(
            "/api/registrations/export",
            get(handler::export_registrations),
        )
        .route(
            "/api/registrations/{id}",
            get(handler::get_registration).delete(handler::delete_registration),
        )
        .route(
            "/api/registrations/{id}/payment",
            post(handler::confirm_payment),
        )
        .route("/api/registrations/{id}/sin", post(handler::allocate_sin))
        .route("/api/admin/sin/backfill", post(handler::backfill))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
