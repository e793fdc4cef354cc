//! Test fixtures and data for allocator tests
//!
//! Small hand-written sheets plus a deterministic generator for larger
//! datasets, so property checks see the same inputs on every run.

use shared::{Priority, Task, TeamMember};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const TEAM_CSV: &'static str = "\
Name,Speed
Ana,1.2
Ben,1.0
Cleo,0.8
";

    pub const TASKS_CSV: &'static str = "\
ID,Time,Priority,Difficulty,Zone
F-1,60,fz,3,Frozen
D-1,40,dy,2,Chilled
H-1,90,high,5,Dry
H-2,50,high,2,Health
M-1,70,medium,4,Dry
L-1,30,low,1,Health
L-2,500,low,1,Dry
";

    /// Same task sheet with the zone column dropped
    pub const TASKS_MISSING_ZONE_CSV: &'static str = "\
ID,Time,Priority,Difficulty
F-1,60,fz,3
";

    pub fn team() -> Vec<TeamMember> {
        vec![
            TeamMember::new("Ana", 1.2),
            TeamMember::new("Ben", 1.0),
            TeamMember::new("Cleo", 0.8),
        ]
    }

    pub fn tasks() -> Vec<Task> {
        vec![
            Task::new("F-1", 60.0, Priority::Freezer, 3, "Frozen"),
            Task::new("D-1", 40.0, Priority::Dairy, 2, "Chilled"),
            Task::new("H-1", 90.0, Priority::High, 5, "Dry"),
            Task::new("H-2", 50.0, Priority::High, 2, "Health"),
            Task::new("M-1", 70.0, Priority::Medium, 4, "Dry"),
            Task::new("L-1", 30.0, Priority::Low, 1, "Health"),
            Task::new("L-2", 500.0, Priority::Low, 1, "Dry"),
        ]
    }

    /// Deterministic pseudo-random dataset
    ///
    /// A fixed linear congruential generator keeps the data reproducible
    /// without pulling in a random number crate.
    pub fn generated(seed: u64, members: usize, tasks: usize) -> (Vec<TeamMember>, Vec<Task>) {
        let mut rng = Lcg(seed);
        let priorities = [
            Priority::Freezer,
            Priority::Dairy,
            Priority::High,
            Priority::Medium,
            Priority::Low,
        ];
        let zones = ["Dry", "Frozen", "Chilled", "Health", "Liquor"];

        let team = (0..members)
            .map(|i| {
                // Speeds between 0.5 and 1.5 in steps of 0.1
                let speed = 0.5 + rng.below(11) as f64 / 10.0;
                TeamMember::new(format!("member-{i}"), speed)
            })
            .collect();

        let tasks = (0..tasks)
            .map(|i| {
                let time = (5 + rng.below(120)) as f64;
                let priority = priorities[rng.below(priorities.len() as u64) as usize];
                let difficulty = 1 + rng.below(5) as i32;
                let zone = zones[rng.below(zones.len() as u64) as usize];
                Task::new(format!("T-{i:03}"), time, priority, difficulty, zone)
            })
            .collect();

        (team, tasks)
    }
}

struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}
