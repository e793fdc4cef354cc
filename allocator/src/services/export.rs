//! Allocation table export
//!
//! Writes the allocation as a CSV sheet for the store team, plus a second
//! sheet listing whatever could not be placed.

use std::path::{Path, PathBuf};

use shared::{component_debug, Component};
use tokio::fs;

use super::csv_source::escape_field;
use crate::core::AllocationRun;
use crate::error::{AllocatorError, AllocatorResult};

pub const ALLOCATION_HEADER: &str =
    "assignment,task_id,member,base_time,adjusted_time,zone,priority,difficulty,status";
pub const UNASSIGNED_HEADER: &str = "id,time,priority,difficulty,zone";

/// Where an export landed
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPaths {
    pub allocation: PathBuf,
    pub unassigned: PathBuf,
}

pub fn render_allocation_csv(run: &AllocationRun) -> String {
    let mut out = String::from(ALLOCATION_HEADER);
    out.push('\n');
    for a in &run.assignments {
        let row = [
            a.id.to_string(),
            escape_field(&a.task_id),
            escape_field(&a.member_name),
            a.base_time.to_string(),
            format!("{:.2}", a.adjusted_time),
            escape_field(&a.zone),
            a.priority.to_string(),
            a.difficulty.to_string(),
            a.status.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

pub fn render_unassigned_csv(run: &AllocationRun) -> String {
    let mut out = String::from(UNASSIGNED_HEADER);
    out.push('\n');
    for t in &run.unassigned {
        let row = [
            escape_field(&t.id),
            t.time.to_string(),
            t.priority.to_string(),
            t.difficulty.to_string(),
            escape_field(&t.zone),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Sibling path for the unassigned sheet: `allocation.csv` -> `allocation_unassigned.csv`
pub fn unassigned_path_for(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "allocation".to_string());
    path.with_file_name(format!("{stem}_unassigned.csv"))
}

/// Write both sheets for `run`, creating parent directories as needed
pub async fn export_allocation_csv(run: &AllocationRun, path: &Path) -> AllocatorResult<ExportPaths> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AllocatorError::fs("create directory", parent, e))?;
    }

    let unassigned = unassigned_path_for(path);
    fs::write(path, render_allocation_csv(run))
        .await
        .map_err(|e| AllocatorError::fs("write", path, e))?;
    fs::write(&unassigned, render_unassigned_csv(run))
        .await
        .map_err(|e| AllocatorError::fs("write", &unassigned, e))?;

    component_debug!(
        Component::Store,
        "📝 Exported {} assignments to {}",
        run.assignments.len(),
        path.display()
    );
    Ok(ExportPaths {
        allocation: path.to_path_buf(),
        unassigned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AllocationConfig;
    use crate::core::allocate;
    use shared::{Priority, Task, TeamMember};
    use tempfile::TempDir;

    fn run() -> AllocationRun {
        let team = vec![TeamMember::new("A", 1.0)];
        let tasks = vec![
            Task::new("L-1", 60.0, Priority::Freezer, 2, "Frozen, back"),
            Task::new("L-2", 400.0, Priority::Low, 1, "Dry"),
        ];
        let config = AllocationConfig::default();
        let allocation = allocate(&team, &tasks, &config).unwrap();
        AllocationRun::new(team, allocation, config)
    }

    #[test]
    fn test_render_allocation() {
        let csv = render_allocation_csv(&run());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], ALLOCATION_HEADER);
        assert_eq!(lines[1], "1,L-1,A,60,60.00,\"Frozen, back\",fz,2,pending");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_render_unassigned() {
        let csv = render_unassigned_csv(&run());
        assert_eq!(csv, format!("{UNASSIGNED_HEADER}\nL-2,400,low,1,Dry\n"));
    }

    #[test]
    fn test_unassigned_path() {
        assert_eq!(
            unassigned_path_for(Path::new("out/allocation.csv")),
            PathBuf::from("out/allocation_unassigned.csv")
        );
    }

    #[tokio::test]
    async fn test_export_writes_both_sheets() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("allocation.csv");

        let paths = export_allocation_csv(&run(), &path).await.unwrap();

        assert!(paths.allocation.exists());
        assert!(paths.unassigned.exists());
        let content = fs::read_to_string(&paths.unassigned).await.unwrap();
        assert!(content.contains("L-2"));
    }
}
