//! Trait definitions with mockall annotations for testing
//!
//! The engine itself is pure. These traits are the seams to whatever holds
//! the team, task and assignment records, so the service can be driven by
//! files, memory or a mock.

use shared::{Assignment, AssignmentId, RunId, Task, TeamMember};

use crate::core::{AllocationRun, StatusPatch};
use crate::error::AllocatorResult;

/// Source of the raw team and task lists for an allocation run
#[mockall::automock]
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Load team members in their input order
    async fn load_team(&self) -> AllocatorResult<Vec<TeamMember>>;

    /// Load tasks in their input order
    async fn load_tasks(&self) -> AllocatorResult<Vec<Task>>;
}

/// Persistence for allocation runs and their assignment records
///
/// A store holds exactly one current run. Replacing it invalidates every
/// assignment id of the previous run.
#[mockall::automock]
#[async_trait::async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Replace the current run wholesale
    async fn replace_run(&self, run: &AllocationRun) -> AllocatorResult<()>;

    /// Current run, if one was ever stored
    async fn load_run(&self) -> AllocatorResult<Option<AllocationRun>>;

    /// Keyed lookup of one assignment of the current run
    async fn get_assignment(&self, run_id: RunId, id: AssignmentId) -> AllocatorResult<Assignment>;

    /// Apply a status patch to one assignment without rewriting the others
    ///
    /// # Returns
    /// The assignment as stored after the update, or `StaleRun` when the
    /// patch targets a run that has since been replaced
    async fn update_status(&self, patch: &StatusPatch) -> AllocatorResult<Assignment>;
}
