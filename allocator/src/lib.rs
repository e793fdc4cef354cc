//! Stocktake task allocation library
//!
//! Assigns stocktake counting tasks to team members with a greedy,
//! priority and capacity aware heuristic, and tracks each assignment
//! through `pending -> started -> completed`.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod stocktake;
pub mod traits;

// Re-export commonly used types
pub use config::{AllocationConfig, CompletionPolicy, SpecialOrder, ZoneLockPolicy};
pub use self::core::{allocate, Action, Allocation, AllocationRun, MemberProgress, MemberSummary, StatusPatch, Tracker};
pub use error::{AllocatorError, AllocatorResult};
pub use stocktake::Stocktake;
pub use traits::{AssignmentStore, MockAssignmentStore, MockRecordSource, RecordSource};
