//! Core types used throughout the stocktake system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::SharedError;

/// Default shift length in minutes for a member with baseline speed
pub const SHIFT_MINUTES: f64 = 300.0;

/// Component identifier attached to every log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    /// Record loading at the file boundary
    Loader,
    /// The allocation engine
    Allocator,
    /// Status transitions and progress queries
    Tracker,
    /// Assignment persistence
    Store,
    /// Command line front end
    Cli,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Loader => write!(f, "loader"),
            Component::Allocator => write!(f, "allocator"),
            Component::Tracker => write!(f, "tracker"),
            Component::Store => write!(f, "store"),
            Component::Cli => write!(f, "cli"),
        }
    }
}

/// Unique identifier for one allocation run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, SharedError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SharedError::InvalidUuid { input: s.to_string() })
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of an assignment within its run, starting at 1
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(pub u32);

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssignmentId {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .trim_start_matches('#')
            .parse::<u32>()
            .map(AssignmentId)
            .map_err(|_| SharedError::invalid("assignment_id", s))
    }
}

/// Assignment reference qualified by its run, written `<run-id>:<n>`
///
/// Assignment ids restart at 1 in every run, so only the pair identifies
/// a record once a run has been replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentKey {
    pub run_id: RunId,
    pub id: AssignmentId,
}

impl AssignmentKey {
    pub fn new(run_id: RunId, id: AssignmentId) -> Self {
        Self { run_id, id }
    }
}

impl fmt::Display for AssignmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.run_id, self.id)
    }
}

impl FromStr for AssignmentKey {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (run, id) = s
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| SharedError::invalid("assignment", s))?;
        Ok(Self {
            run_id: RunId::from_string(run)?,
            id: id.parse()?,
        })
    }
}

/// Task priority: one of the reserved special tags or an ordinal level
///
/// Sheets either use the named levels or plain numbers, where a higher
/// number is more urgent. Named levels rank as `high = 3`, `medium = 2`,
/// `low = 1`, so the two styles order consistently when mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PriorityRepr", into = "PriorityRepr")]
pub enum Priority {
    /// Freezer count, scheduled ahead of all regular work
    Freezer,
    /// Dairy count, scheduled ahead of all regular work
    Dairy,
    High,
    Medium,
    Low,
    /// Numeric level
    Level(i32),
}

impl Priority {
    /// Whether the task belongs to the special first pass
    pub fn is_special(&self) -> bool {
        matches!(self, Priority::Freezer | Priority::Dairy)
    }

    /// Rank among regular levels, higher is scheduled earlier
    pub fn level_rank(&self) -> i64 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
            Priority::Level(n) => i64::from(*n),
            Priority::Freezer | Priority::Dairy => i64::MIN,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Freezer => f.pad("fz"),
            Priority::Dairy => f.pad("dy"),
            Priority::High => f.pad("high"),
            Priority::Medium => f.pad("medium"),
            Priority::Low => f.pad("low"),
            Priority::Level(n) => f.pad(&n.to_string()),
        }
    }
}

impl FromStr for Priority {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_lowercase();
        match raw.as_str() {
            "fz" | "freezer" => Ok(Priority::Freezer),
            "dy" | "dairy" => Ok(Priority::Dairy),
            "high" | "h" => Ok(Priority::High),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            _ => parse_level(&raw)
                .map(Priority::Level)
                .ok_or_else(|| SharedError::UnknownPriority { input: s.to_string() }),
        }
    }
}

/// Integer level, also accepting whole numbers exported as `"2.0"`
fn parse_level(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok().or_else(|| {
        let value = raw.parse::<f64>().ok()?;
        let in_range = value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX);
        (value.fract() == 0.0 && in_range).then_some(value as i32)
    })
}

/// Stored form: named levels as their tag, numeric levels as numbers
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PriorityRepr {
    Level(i32),
    Tag(String),
}

impl From<Priority> for PriorityRepr {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Level(n) => PriorityRepr::Level(n),
            named => PriorityRepr::Tag(named.to_string()),
        }
    }
}

impl TryFrom<PriorityRepr> for Priority {
    type Error = SharedError;

    fn try_from(repr: PriorityRepr) -> Result<Self, Self::Error> {
        match repr {
            PriorityRepr::Level(n) => Ok(Priority::Level(n)),
            PriorityRepr::Tag(tag) => tag.parse(),
        }
    }
}

/// A team member available for the shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    /// Work rate multiplier, 1.0 is baseline
    pub speed: f64,
}

impl TeamMember {
    pub fn new(name: impl Into<String>, speed: f64) -> Self {
        Self {
            name: name.into(),
            speed,
        }
    }

    /// Minutes this member can absorb in a shift of `shift_minutes`
    pub fn capacity_minutes(&self, shift_minutes: f64) -> f64 {
        self.speed * shift_minutes
    }

    pub fn validate(&self) -> Result<(), SharedError> {
        if self.name.trim().is_empty() {
            return Err(SharedError::MissingField { field: "name".to_string() });
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(SharedError::invalid("speed", self.speed));
        }
        Ok(())
    }
}

/// A counting task for one layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Estimated minutes at baseline speed
    pub time: f64,
    pub priority: Priority,
    pub difficulty: i32,
    pub zone: String,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        time: f64,
        priority: Priority,
        difficulty: i32,
        zone: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            time,
            priority,
            difficulty,
            zone: zone.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SharedError> {
        if self.id.trim().is_empty() {
            return Err(SharedError::MissingField { field: "id".to_string() });
        }
        if !self.time.is_finite() || self.time < 0.0 {
            return Err(SharedError::invalid("time", self.time));
        }
        if self.zone.trim().is_empty() {
            return Err(SharedError::MissingField { field: "zone".to_string() });
        }
        Ok(())
    }
}

/// Lifecycle state of an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Started,
    Completed,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStatus::Pending => write!(f, "pending"),
            AssignmentStatus::Started => write!(f, "started"),
            AssignmentStatus::Completed => write!(f, "completed"),
        }
    }
}

/// One task placed on one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub task_id: String,
    pub member_name: String,
    pub base_time: f64,
    /// `base_time / speed` of the assigned member
    pub adjusted_time: f64,
    pub zone: String,
    pub priority: Priority,
    pub difficulty: i32,
    pub status: AssignmentStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub complete_time: Option<DateTime<Utc>>,
}

impl Assignment {
    pub fn is_completed(&self) -> bool {
        self.status == AssignmentStatus::Completed
    }
}
