use reviewroster_core::{OperationScope, ReviewService};
use sqlx::{Any, Pool};
use std::sync::Arc;

/// Application state for Axum dependency injection
///
/// Holds the shared resources every handler needs:
/// - Database connection pool (health checks)
/// - Review service owning the pull request lifecycle
/// - Operation scope carrying the shutdown token and per-request deadline
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db_pool: Pool<Any>,

    pub service: Arc<ReviewService>,

    /// Scope each service call runs under
    pub scope: OperationScope,
}

impl AppState {
    /// Create new application state
    pub fn new(db_pool: Pool<Any>, service: ReviewService, scope: OperationScope) -> Self {
        Self {
            db_pool,
            service: Arc::new(service),
            scope,
        }
    }
}
