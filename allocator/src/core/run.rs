//! Caller-owned allocation run
//!
//! An `AllocationRun` is the unit a store replaces wholesale. Its `run_id`
//! is fresh on every allocation, so status updates aimed at an older run
//! can be told apart and refused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Assignment, AssignmentId, AssignmentKey, RunId, Task, TeamMember};

use super::allocator::{Allocation, MemberSummary};
use crate::config::AllocationConfig;
use crate::error::{AllocatorError, AllocatorResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRun {
    pub run_id: RunId,
    pub created_at: DateTime<Utc>,
    pub config: AllocationConfig,
    /// Team as supplied, in input order
    pub team: Vec<TeamMember>,
    /// Allocation order; never re-sorted after creation
    pub assignments: Vec<Assignment>,
    pub unassigned: Vec<Task>,
    pub members: Vec<MemberSummary>,
}

impl AllocationRun {
    pub fn new(team: Vec<TeamMember>, allocation: Allocation, config: AllocationConfig) -> Self {
        Self {
            run_id: RunId::new(),
            created_at: Utc::now(),
            config,
            team,
            assignments: allocation.assignments,
            unassigned: allocation.unassigned,
            members: allocation.members,
        }
    }

    pub fn assignment(&self, id: AssignmentId) -> AllocatorResult<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.id == id)
            .ok_or(AllocatorError::AssignmentNotFound { assignment_id: id })
    }

    pub fn assignment_mut(&mut self, id: AssignmentId) -> AllocatorResult<&mut Assignment> {
        self.assignments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AllocatorError::AssignmentNotFound { assignment_id: id })
    }

    /// Run-qualified reference to assignment `id` of this run
    pub fn key(&self, id: AssignmentId) -> AssignmentKey {
        AssignmentKey::new(self.run_id, id)
    }

    /// A member's assignments in allocation order
    pub fn member_assignments<'a>(&'a self, member: &str) -> impl Iterator<Item = &'a Assignment> + 'a {
        let member = member.to_string();
        self.assignments.iter().filter(move |a| a.member_name == member)
    }

    pub fn total_tasks(&self) -> usize {
        self.assignments.len() + self.unassigned.len()
    }

    pub fn ensure_current(&self, run_id: RunId) -> AllocatorResult<()> {
        if self.run_id != run_id {
            return Err(AllocatorError::StaleRun {
                expected: self.run_id,
                found: run_id,
            });
        }
        Ok(())
    }
}
