//! Greedy task allocation
//!
//! Single pass, deterministic. Special tasks (`fz`/`dy`) go first to the
//! fastest member with room; regular tasks are then spread zone by zone
//! over members locked to those zones, preferring the least loaded one.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use shared::{
    component_debug, component_info, Assignment, AssignmentId, AssignmentStatus, Component,
    SharedError, Task, TeamMember,
};

use crate::config::{AllocationConfig, ZoneLockPolicy};
use crate::error::AllocatorResult;

/// Members below this speed are protected from a hard opener
pub const LOW_SPEED: f64 = 1.0;
/// Difficulty at which a task counts as hard for the opener rule
pub const HARD_DIFFICULTY: i32 = 4;

/// Result of one allocation pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Allocation {
    /// In the order they were made
    pub assignments: Vec<Assignment>,
    /// Tasks no member could take, unchanged
    pub unassigned: Vec<Task>,
    /// Final load of every member, in scan order
    pub members: Vec<MemberSummary>,
}

/// Load carried by a member at the end of a pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub name: String,
    pub speed: f64,
    pub capacity_minutes: f64,
    pub used_time: f64,
    pub assigned_count: usize,
    pub locked_zone: Option<String>,
}

impl MemberSummary {
    pub fn remaining_minutes(&self) -> f64 {
        self.capacity_minutes - self.used_time
    }
}

/// Mutable per-member state for the duration of one pass
struct MemberLoad<'a> {
    member: &'a TeamMember,
    /// Position in the caller's list, used for tie-breaks
    input_index: usize,
    capacity: f64,
    used_time: f64,
    assigned_count: usize,
    locked_zone: Option<&'a str>,
}

impl<'a> MemberLoad<'a> {
    fn new(member: &'a TeamMember, input_index: usize, shift_minutes: f64) -> Self {
        Self {
            member,
            input_index,
            capacity: member.capacity_minutes(shift_minutes),
            used_time: 0.0,
            assigned_count: 0,
            locked_zone: None,
        }
    }

    fn adjusted_time(&self, task: &Task) -> f64 {
        task.time / self.member.speed
    }

    /// Zero-time tasks always fit
    fn fits(&self, task: &Task) -> bool {
        task.time <= 0.0 || self.used_time + self.adjusted_time(task) <= self.capacity
    }

    /// A slow member's very first task may not be a hard one
    fn passes_skill_gate(&self, task: &Task) -> bool {
        !(self.assigned_count == 0
            && self.member.speed < LOW_SPEED
            && task.difficulty >= HARD_DIFFICULTY)
    }

    fn can_take(&self, task: &Task) -> bool {
        self.passes_skill_gate(task) && self.fits(task)
    }

    fn summary(&self) -> MemberSummary {
        MemberSummary {
            name: self.member.name.clone(),
            speed: self.member.speed,
            capacity_minutes: self.capacity,
            used_time: self.used_time,
            assigned_count: self.assigned_count,
            locked_zone: self.locked_zone.map(str::to_string),
        }
    }
}

/// Reject inputs the engine cannot work with before anything is allocated
pub fn validate_inputs(members: &[TeamMember], tasks: &[Task]) -> AllocatorResult<()> {
    let mut names = HashSet::new();
    for member in members {
        member.validate()?;
        if !names.insert(member.name.as_str()) {
            return Err(SharedError::DuplicateKey {
                field: "name".to_string(),
                value: member.name.clone(),
            }
            .into());
        }
    }

    let mut ids = HashSet::new();
    for task in tasks {
        task.validate()?;
        if !ids.insert(task.id.as_str()) {
            return Err(SharedError::DuplicateKey {
                field: "id".to_string(),
                value: task.id.clone(),
            }
            .into());
        }
    }
    Ok(())
}

/// Assign `tasks` to `members` under `config`
///
/// Inputs are only read. Every task ends up in exactly one of
/// `assignments` or `unassigned`.
pub fn allocate(
    members: &[TeamMember],
    tasks: &[Task],
    config: &AllocationConfig,
) -> AllocatorResult<Allocation> {
    config.validate()?;
    validate_inputs(members, tasks)?;

    // Fastest first; sort_by is stable so equal speeds keep input order
    let mut loads: Vec<MemberLoad> = members
        .iter()
        .enumerate()
        .map(|(i, m)| MemberLoad::new(m, i, config.shift_minutes))
        .collect();
    loads.sort_by(|a, b| b.member.speed.total_cmp(&a.member.speed));

    let (mut special, mut regular): (Vec<&Task>, Vec<&Task>) =
        tasks.iter().partition(|t| t.priority.is_special());

    special.sort_by(|a, b| {
        let order = config.special_order;
        order
            .rank(b.priority)
            .cmp(&order.rank(a.priority))
            .then(b.difficulty.cmp(&a.difficulty))
    });
    regular.sort_by(|a, b| {
        b.priority
            .level_rank()
            .cmp(&a.priority.level_rank())
            .then(b.difficulty.cmp(&a.difficulty))
    });

    let mut allocation = Allocation::default();

    for task in special {
        match loads.iter().position(|load| load.can_take(task)) {
            Some(slot) => assign(&mut allocation, &mut loads[slot], task),
            None => leave_unassigned(&mut allocation, task, "no member has room"),
        }
    }

    let zones = distinct_zones(&regular);
    lock_zones_round_robin(&mut loads, &zones);

    let mut remaining: HashMap<&str, usize> = HashMap::new();
    for task in &regular {
        *remaining.entry(task.zone.as_str()).or_default() += 1;
    }

    for &zone in &zones {
        for task in regular.iter().copied().filter(|t| t.zone == zone) {
            let chosen = loads
                .iter()
                .enumerate()
                .filter(|(_, load)| {
                    zone_eligible(load, zone, &remaining, config.zone_lock_policy)
                        && load.can_take(task)
                })
                .min_by(|(_, a), (_, b)| {
                    a.used_time
                        .total_cmp(&b.used_time)
                        .then(a.input_index.cmp(&b.input_index))
                })
                .map(|(slot, _)| slot);

            match chosen {
                Some(slot) => {
                    let load = &mut loads[slot];
                    if load.locked_zone != Some(zone) {
                        component_debug!(
                            Component::Allocator,
                            "🔓 {} moves from exhausted zone {:?} to {}",
                            load.member.name,
                            load.locked_zone,
                            zone
                        );
                        load.locked_zone = Some(zone);
                    }
                    assign(&mut allocation, load, task);
                }
                None => leave_unassigned(&mut allocation, task, "no eligible member in zone has room"),
            }

            if let Some(count) = remaining.get_mut(zone) {
                *count -= 1;
            }
        }
    }

    allocation.members = loads.iter().map(MemberLoad::summary).collect();

    component_info!(
        Component::Allocator,
        "📋 Allocated {} of {} tasks across {} members ({} unassigned)",
        allocation.assignments.len(),
        tasks.len(),
        members.len(),
        allocation.unassigned.len()
    );
    Ok(allocation)
}

/// Zones in the order they first appear among the sorted regular tasks
fn distinct_zones<'a>(regular: &[&'a Task]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    regular
        .iter()
        .map(|t| t.zone.as_str())
        .filter(|zone| seen.insert(*zone))
        .collect()
}

/// Give every unlocked member the next zone, cycling over `zones`
fn lock_zones_round_robin<'a>(loads: &mut [MemberLoad<'a>], zones: &[&'a str]) {
    if zones.is_empty() {
        return;
    }
    let mut cursor = 0;
    for load in loads.iter_mut().filter(|l| l.locked_zone.is_none()) {
        load.locked_zone = Some(zones[cursor % zones.len()]);
        cursor += 1;
    }
}

fn zone_eligible(
    load: &MemberLoad,
    zone: &str,
    remaining: &HashMap<&str, usize>,
    policy: ZoneLockPolicy,
) -> bool {
    match load.locked_zone {
        Some(locked) if locked == zone => true,
        Some(locked) => {
            policy == ZoneLockPolicy::Release && remaining.get(locked).copied().unwrap_or(0) == 0
        }
        None => policy == ZoneLockPolicy::Release,
    }
}

fn assign(allocation: &mut Allocation, load: &mut MemberLoad, task: &Task) {
    let adjusted_time = load.adjusted_time(task);
    load.used_time += adjusted_time;
    load.assigned_count += 1;

    let id = AssignmentId(allocation.assignments.len() as u32 + 1);
    allocation.assignments.push(Assignment {
        id,
        task_id: task.id.clone(),
        member_name: load.member.name.clone(),
        base_time: task.time,
        adjusted_time,
        zone: task.zone.clone(),
        priority: task.priority,
        difficulty: task.difficulty,
        status: AssignmentStatus::Pending,
        start_time: None,
        complete_time: None,
    });
}

fn leave_unassigned(allocation: &mut Allocation, task: &Task, reason: &str) {
    component_debug!(
        Component::Allocator,
        "⚠️ Task {} ({} min, {}, zone {}) left unassigned: {}",
        task.id,
        task.time,
        task.priority,
        task.zone,
        reason
    );
    allocation.unassigned.push(task.clone());
}
