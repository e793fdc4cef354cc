//! Test helpers for allocator tests
//!
//! Writes fixture sheets to a temporary directory and wires a service
//! over a JSON store in the same directory.

use std::collections::HashMap;
use std::path::PathBuf;

use allocator::services::{CsvRecordSource, JsonFileStore};
use allocator::{Allocation, AllocationConfig, Stocktake};
use shared::{Task, TeamMember};
use tempfile::TempDir;

use super::fixtures::TestFixtures;

pub struct TestHelpers;

impl TestHelpers {
    /// Write team and task sheets into `dir`, returning a source over them
    pub fn write_sheets(dir: &TempDir, team_csv: &str, tasks_csv: &str) -> CsvRecordSource {
        let team_path = dir.path().join("team.csv");
        let tasks_path = dir.path().join("tasks.csv");
        std::fs::write(&team_path, team_csv).unwrap();
        std::fs::write(&tasks_path, tasks_csv).unwrap();
        CsvRecordSource::new(team_path, tasks_path)
    }

    pub fn fixture_source(dir: &TempDir) -> CsvRecordSource {
        Self::write_sheets(dir, TestFixtures::TEAM_CSV, TestFixtures::TASKS_CSV)
    }

    pub fn data_dir(dir: &TempDir) -> PathBuf {
        dir.path().join("data")
    }

    /// Service backed by a JSON store under `dir`
    pub fn file_service(dir: &TempDir) -> Stocktake<JsonFileStore> {
        Stocktake::new(
            JsonFileStore::with_base_dir(Self::data_dir(dir)),
            AllocationConfig::default(),
        )
    }

    /// Sum of adjusted time per member, in assignment order
    pub fn used_time_by_member(allocation: &Allocation) -> HashMap<String, f64> {
        let mut used = HashMap::new();
        for a in &allocation.assignments {
            *used.entry(a.member_name.clone()).or_insert(0.0) += a.adjusted_time;
        }
        used
    }

    /// Assert every task lands in exactly one of assigned or unassigned
    pub fn assert_partition(tasks: &[Task], allocation: &Allocation) {
        assert_eq!(
            allocation.assignments.len() + allocation.unassigned.len(),
            tasks.len(),
            "every task must be assigned or reported unassigned"
        );
        let mut seen: Vec<&str> = allocation
            .assignments
            .iter()
            .map(|a| a.task_id.as_str())
            .chain(allocation.unassigned.iter().map(|t| t.id.as_str()))
            .collect();
        seen.sort_unstable();
        let mut expected: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    pub fn member<'a>(team: &'a [TeamMember], name: &str) -> &'a TeamMember {
        team.iter().find(|m| m.name == name).unwrap()
    }
}
