//! Stocktake service
//!
//! Wires a record source, the allocation engine, the tracker and an
//! assignment store together. Allocation replaces the stored run wholesale;
//! status transitions are applied as read-modify-write cycles under a
//! single writer lock so two members cannot race on the same record.

use chrono::Utc;
use shared::{component_info, component_warn, Assignment, AssignmentKey, Component};
use tokio::sync::Mutex;

use crate::config::{AllocationConfig, CompletionPolicy};
use crate::core::{allocate, tracker, Action, AllocationRun, MemberProgress, Tracker};
use crate::error::{AllocatorError, AllocatorResult};
use crate::traits::{AssignmentStore, RecordSource};

pub struct Stocktake<T>
where
    T: AssignmentStore + Send + Sync + 'static,
{
    store: T,
    config: AllocationConfig,
    write_lock: Mutex<()>,
}

impl<T> Stocktake<T>
where
    T: AssignmentStore + Send + Sync + 'static,
{
    pub fn new(store: T, config: AllocationConfig) -> Self {
        Self {
            store,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    /// Load records, allocate, and replace the stored run
    ///
    /// Nothing is written when the records fail validation.
    pub async fn allocate<S: RecordSource>(&self, source: &S) -> AllocatorResult<AllocationRun> {
        let team = source.load_team().await?;
        let tasks = source.load_tasks().await?;

        let allocation = allocate(&team, &tasks, &self.config)?;
        let run = AllocationRun::new(team, allocation, self.config.clone());

        let _guard = self.write_lock.lock().await;
        self.store.replace_run(&run).await?;

        if !run.unassigned.is_empty() {
            component_warn!(
                Component::Allocator,
                "⚠️ {} of {} tasks could not be assigned",
                run.unassigned.len(),
                run.total_tasks()
            );
        }
        component_info!(Component::Allocator, "✅ Stored run {}", run.run_id);
        Ok(run)
    }

    /// Start an assignment of the current run
    ///
    /// Keys from a replaced run are refused with `StaleRun`.
    pub async fn start(&self, key: AssignmentKey) -> AllocatorResult<Assignment> {
        self.transition(key, Action::Start, self.config.completion_policy).await
    }

    pub async fn complete(&self, key: AssignmentKey) -> AllocatorResult<Assignment> {
        self.transition(key, Action::Complete, self.config.completion_policy).await
    }

    /// Complete under an explicit policy instead of the configured one
    pub async fn complete_with_policy(
        &self,
        key: AssignmentKey,
        policy: CompletionPolicy,
    ) -> AllocatorResult<Assignment> {
        self.transition(key, Action::Complete, policy).await
    }

    async fn transition(
        &self,
        key: AssignmentKey,
        action: Action,
        policy: CompletionPolicy,
    ) -> AllocatorResult<Assignment> {
        let _guard = self.write_lock.lock().await;
        let mut run = self.current_run().await?;
        run.ensure_current(key.run_id)?;

        let patch = Tracker::new(policy).apply(&mut run, key.id, action, Utc::now())?;
        let updated = self.store.update_status(&patch).await?;

        component_info!(
            Component::Tracker,
            "📋 {} {} {} ({})",
            updated.member_name,
            match action {
                Action::Start => "started",
                Action::Complete => "completed",
            },
            updated.task_id,
            updated.zone
        );
        Ok(updated)
    }

    pub async fn current_run(&self) -> AllocatorResult<AllocationRun> {
        self.store.load_run().await?.ok_or(AllocatorError::NoActiveRun)
    }

    pub async fn progress(&self, member: &str) -> AllocatorResult<MemberProgress> {
        Ok(tracker::progress(&self.current_run().await?, member))
    }

    pub async fn team_progress(&self) -> AllocatorResult<Vec<MemberProgress>> {
        Ok(tracker::team_progress(&self.current_run().await?))
    }

    pub async fn current_task(&self, member: &str) -> AllocatorResult<Option<Assignment>> {
        let run = self.current_run().await?;
        Ok(tracker::current_task(&run, member).cloned())
    }
}
