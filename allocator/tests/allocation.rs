//! Property checks for the allocation engine
//!
//! Runs the engine over fixture and generated datasets and verifies the
//! guarantees every allocation must hold regardless of input shape.

use allocator::{allocate, AllocationConfig, SpecialOrder, ZoneLockPolicy};
use shared::Priority;

mod common;
use common::{TestFixtures, TestHelpers};

const EPSILON: f64 = 1e-9;

fn configs() -> Vec<AllocationConfig> {
    vec![
        AllocationConfig::default(),
        AllocationConfig::default().with_special_order(SpecialOrder::DairyFirst),
        AllocationConfig::default().with_zone_lock_policy(ZoneLockPolicy::Strict),
        AllocationConfig::default().with_shift_minutes(120.0),
    ]
}

#[test]
fn test_fixture_allocation() {
    let team = TestFixtures::team();
    let tasks = TestFixtures::tasks();

    let allocation = allocate(&team, &tasks, &AllocationConfig::default()).unwrap();

    // Freezer work is scheduled first and goes to the fastest member
    assert_eq!(allocation.assignments[0].task_id, "F-1");
    assert_eq!(allocation.assignments[0].member_name, "Ana");
    assert_eq!(allocation.assignments[1].task_id, "D-1");

    // Longer than any shift, even at Ana's speed
    assert_eq!(allocation.unassigned.len(), 1);
    assert_eq!(allocation.unassigned[0].id, "L-2");

    TestHelpers::assert_partition(&tasks, &allocation);
}

#[test]
fn test_every_task_is_accounted_for() {
    for seed in 1..=20 {
        let (team, tasks) = TestFixtures::generated(seed, 4, 60);
        for config in configs() {
            let allocation = allocate(&team, &tasks, &config).unwrap();
            TestHelpers::assert_partition(&tasks, &allocation);
        }
    }
}

#[test]
fn test_adjusted_time_is_base_over_speed() {
    for seed in 1..=10 {
        let (team, tasks) = TestFixtures::generated(seed, 5, 40);
        let allocation = allocate(&team, &tasks, &AllocationConfig::default()).unwrap();

        for a in &allocation.assignments {
            let member = TestHelpers::member(&team, &a.member_name);
            assert!((a.adjusted_time - a.base_time / member.speed).abs() < EPSILON);
        }
    }
}

#[test]
fn test_members_stay_within_capacity() {
    for seed in 1..=20 {
        let (team, tasks) = TestFixtures::generated(seed, 3, 80);
        for config in configs() {
            let allocation = allocate(&team, &tasks, &config).unwrap();

            let used = TestHelpers::used_time_by_member(&allocation);
            for (name, minutes) in used {
                let member = TestHelpers::member(&team, &name);
                let capacity = member.capacity_minutes(config.shift_minutes);
                assert!(
                    minutes <= capacity + EPSILON,
                    "{name} carries {minutes} of {capacity} minutes (seed {seed})"
                );
            }

            for summary in &allocation.members {
                assert!(summary.remaining_minutes() >= -EPSILON);
            }
        }
    }
}

#[test]
fn test_slow_members_never_open_with_hard_tasks() {
    for seed in 1..=20 {
        let (team, tasks) = TestFixtures::generated(seed, 6, 50);
        for config in configs() {
            let allocation = allocate(&team, &tasks, &config).unwrap();

            for member in team.iter().filter(|m| m.speed < 1.0) {
                let first = allocation
                    .assignments
                    .iter()
                    .find(|a| a.member_name == member.name);
                if let Some(first) = first {
                    assert!(
                        first.difficulty < 4,
                        "{} opened with difficulty {} (seed {seed})",
                        member.name,
                        first.difficulty
                    );
                }
            }
        }
    }
}

#[test]
fn test_special_tasks_are_placed_before_regular_ones() {
    for seed in 1..=10 {
        let (team, tasks) = TestFixtures::generated(seed, 4, 40);
        let allocation = allocate(&team, &tasks, &AllocationConfig::default()).unwrap();

        let first_regular = allocation
            .assignments
            .iter()
            .position(|a| !a.priority.is_special())
            .unwrap_or(allocation.assignments.len());
        assert!(allocation.assignments[first_regular..]
            .iter()
            .all(|a| !a.priority.is_special()));

        // Freezer before dairy under the default order
        let specials: Vec<Priority> = allocation.assignments[..first_regular]
            .iter()
            .map(|a| a.priority)
            .collect();
        let first_dairy = specials
            .iter()
            .position(|p| *p == Priority::Dairy)
            .unwrap_or(specials.len());
        assert!(specials[first_dairy..].iter().all(|p| *p == Priority::Dairy));
    }
}

#[test]
fn test_assignment_ids_are_sequential() {
    let (team, tasks) = TestFixtures::generated(7, 4, 50);
    let allocation = allocate(&team, &tasks, &AllocationConfig::default()).unwrap();

    for (i, a) in allocation.assignments.iter().enumerate() {
        assert_eq!(a.id.0 as usize, i + 1);
    }
}

#[test]
fn test_allocation_is_deterministic() {
    for seed in 1..=10 {
        let (team, tasks) = TestFixtures::generated(seed, 5, 60);
        for config in configs() {
            let first = allocate(&team, &tasks, &config).unwrap();
            let second = allocate(&team, &tasks, &config).unwrap();
            assert_eq!(first, second);
        }
    }
}

#[test]
fn test_inputs_are_not_modified() {
    let team = TestFixtures::team();
    let tasks = TestFixtures::tasks();
    let (team_before, tasks_before) = (team.clone(), tasks.clone());

    allocate(&team, &tasks, &AllocationConfig::default()).unwrap();

    assert_eq!(team, team_before);
    assert_eq!(tasks, tasks_before);
}
