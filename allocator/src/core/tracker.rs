//! Assignment status tracking
//!
//! Each assignment moves `pending -> started -> completed`. A member works
//! through their list strictly in allocation order: an assignment is locked
//! until every earlier assignment of the same member is completed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{component_debug, Assignment, AssignmentId, AssignmentStatus, Component, RunId};
use std::fmt;

use super::run::AllocationRun;
use crate::config::CompletionPolicy;
use crate::error::{AllocatorError, AllocatorResult};

/// Member action driving a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Start,
    Complete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Start => write!(f, "start"),
            Action::Complete => write!(f, "complete"),
        }
    }
}

/// Partial update of one assignment's status fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPatch {
    pub run_id: RunId,
    pub assignment_id: AssignmentId,
    pub status: AssignmentStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub complete_time: Option<DateTime<Utc>>,
}

impl StatusPatch {
    pub fn apply_to(&self, assignment: &mut Assignment) {
        assignment.status = self.status;
        assignment.start_time = self.start_time;
        assignment.complete_time = self.complete_time;
    }
}

/// Completion counts for one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProgress {
    pub member: String,
    pub total: usize,
    pub pending: usize,
    pub started: usize,
    pub completed: usize,
}

impl MemberProgress {
    /// Completed share of assigned tasks; 0 when nothing is assigned
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }

    pub fn is_done(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Applies member actions to a run under a completion policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Tracker {
    policy: CompletionPolicy,
}

impl Tracker {
    pub fn new(policy: CompletionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    /// Check that `action` is legal for assignment `id` right now
    pub fn check(&self, run: &AllocationRun, id: AssignmentId, action: Action) -> AllocatorResult<()> {
        let assignment = run.assignment(id)?;
        let refuse = |reason: String| AllocatorError::InvalidTransition {
            assignment_id: id,
            action: action.to_string(),
            status: assignment.status,
            reason,
        };

        match (action, assignment.status) {
            (_, AssignmentStatus::Completed) => Err(refuse("already completed".to_string())),
            (Action::Start, AssignmentStatus::Started) => Err(refuse("already started".to_string())),
            (Action::Complete, AssignmentStatus::Pending)
                if self.policy == CompletionPolicy::RequireStart =>
            {
                Err(refuse("must be started first".to_string()))
            }
            (Action::Complete, AssignmentStatus::Started) => Ok(()),
            (_, AssignmentStatus::Pending) => match blocking_predecessor(run, assignment) {
                Some(previous) => Err(refuse(format!(
                    "locked until assignment {} ({}) is completed",
                    previous.id, previous.task_id
                ))),
                None => Ok(()),
            },
        }
    }

    /// Apply `action` to assignment `id`, returning the patch to persist
    ///
    /// The run is left untouched when the transition is refused.
    pub fn apply(
        &self,
        run: &mut AllocationRun,
        id: AssignmentId,
        action: Action,
        at: DateTime<Utc>,
    ) -> AllocatorResult<StatusPatch> {
        self.check(run, id, action)?;

        let run_id = run.run_id;
        let assignment = run.assignment_mut(id)?;
        let patch = match action {
            Action::Start => StatusPatch {
                run_id,
                assignment_id: id,
                status: AssignmentStatus::Started,
                start_time: Some(at),
                complete_time: None,
            },
            Action::Complete => StatusPatch {
                run_id,
                assignment_id: id,
                status: AssignmentStatus::Completed,
                start_time: assignment.start_time,
                complete_time: Some(at),
            },
        };
        patch.apply_to(assignment);

        component_debug!(
            Component::Tracker,
            "{} {} assignment {} ({})",
            assignment.member_name,
            action,
            id,
            assignment.task_id
        );
        Ok(patch)
    }

    pub fn start(&self, run: &mut AllocationRun, id: AssignmentId, at: DateTime<Utc>) -> AllocatorResult<StatusPatch> {
        self.apply(run, id, Action::Start, at)
    }

    pub fn complete(&self, run: &mut AllocationRun, id: AssignmentId, at: DateTime<Utc>) -> AllocatorResult<StatusPatch> {
        self.apply(run, id, Action::Complete, at)
    }
}

/// First earlier assignment of the same member that is not completed
fn blocking_predecessor<'a>(run: &'a AllocationRun, assignment: &Assignment) -> Option<&'a Assignment> {
    run.member_assignments(&assignment.member_name)
        .take_while(|a| a.id != assignment.id)
        .find(|a| !a.is_completed())
}

/// Whether every earlier assignment of the same member is completed
pub fn is_unlocked(run: &AllocationRun, assignment: &Assignment) -> bool {
    blocking_predecessor(run, assignment).is_none()
}

/// The member's first assignment that is not completed yet
pub fn current_task<'a>(run: &'a AllocationRun, member: &str) -> Option<&'a Assignment> {
    run.member_assignments(member).find(|a| !a.is_completed())
}

pub fn progress(run: &AllocationRun, member: &str) -> MemberProgress {
    let mut progress = MemberProgress {
        member: member.to_string(),
        total: 0,
        pending: 0,
        started: 0,
        completed: 0,
    };
    for assignment in run.member_assignments(member) {
        progress.total += 1;
        match assignment.status {
            AssignmentStatus::Pending => progress.pending += 1,
            AssignmentStatus::Started => progress.started += 1,
            AssignmentStatus::Completed => progress.completed += 1,
        }
    }
    progress
}

/// Progress of every team member, in team order
pub fn team_progress(run: &AllocationRun) -> Vec<MemberProgress> {
    run.team.iter().map(|m| progress(run, &m.name)).collect()
}
