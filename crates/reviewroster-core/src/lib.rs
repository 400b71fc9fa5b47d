pub mod assignment;
pub mod error;
pub mod lifecycle;
pub mod locks;
pub mod memory;
pub mod model;
pub mod reassignment;
pub mod scope;
pub mod selection;
pub mod store;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use assignment::{Assignment, AssignmentEngine};
pub use error::{ErrorKind, ReviewError, ReviewResult};
pub use lifecycle::{Reassignment, ReviewService};
pub use memory::MemoryStore;
pub use model::{MAX_REVIEWERS, PrStatus, PullRequest, PullRequestSummary, Team, User, UserId};
pub use reassignment::ReassignmentEngine;
pub use scope::OperationScope;
pub use selection::CandidatePicker;
pub use store::{PullRequestStore, ReviewStore, RosterStore, WriteOutcome};
