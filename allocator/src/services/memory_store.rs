//! In-memory assignment store
//!
//! Holds the current run behind a mutex. Suitable for tests and for a
//! single-process front end that does not need to survive restarts.

use async_trait::async_trait;
use shared::{Assignment, AssignmentId, RunId};
use tokio::sync::Mutex;

use crate::core::{AllocationRun, StatusPatch};
use crate::error::{AllocatorError, AllocatorResult};
use crate::traits::AssignmentStore;

#[derive(Default)]
pub struct InMemoryStore {
    run: Mutex<Option<AllocationRun>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssignmentStore for InMemoryStore {
    async fn replace_run(&self, run: &AllocationRun) -> AllocatorResult<()> {
        *self.run.lock().await = Some(run.clone());
        Ok(())
    }

    async fn load_run(&self) -> AllocatorResult<Option<AllocationRun>> {
        Ok(self.run.lock().await.clone())
    }

    async fn get_assignment(&self, run_id: RunId, id: AssignmentId) -> AllocatorResult<Assignment> {
        let guard = self.run.lock().await;
        let run = guard.as_ref().ok_or(AllocatorError::NoActiveRun)?;
        run.ensure_current(run_id)?;
        Ok(run.assignment(id)?.clone())
    }

    async fn update_status(&self, patch: &StatusPatch) -> AllocatorResult<Assignment> {
        let mut guard = self.run.lock().await;
        let run = guard.as_mut().ok_or(AllocatorError::NoActiveRun)?;
        run.ensure_current(patch.run_id)?;
        let assignment = run.assignment_mut(patch.assignment_id)?;
        patch.apply_to(assignment);
        Ok(assignment.clone())
    }
}
