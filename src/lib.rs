pub use reviewroster_api as api;
pub use reviewroster_core::*;
pub use reviewroster_db as db;
