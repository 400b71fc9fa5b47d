pub mod error;
mod models;
pub mod pool;
pub mod pull_requests;
pub mod roster;
pub mod store;

// Re-export commonly used types
pub use error::{DbError, DbResult};
pub use pool::{create_pool, run_migrations};
pub use store::SqlStore;
