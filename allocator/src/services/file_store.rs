//! JSON file assignment store
//!
//! Keeps the current run as a single `run.json` document under a data
//! directory, so separate invocations of the binary share state. Writes go
//! to a temporary file first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shared::{component_debug, Assignment, AssignmentId, Component, RunId};
use tokio::fs;
use tokio::sync::Mutex;

use crate::core::{AllocationRun, StatusPatch};
use crate::error::{AllocatorError, AllocatorResult};
use crate::traits::AssignmentStore;

pub struct JsonFileStore {
    base_dir: PathBuf,
    /// Serialises read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub const RUN_FILE: &'static str = "run.json";

    /// Create store in ./stocktake-data
    pub fn new() -> Self {
        Self::with_base_dir(PathBuf::from("./stocktake-data"))
    }

    /// Create with custom base directory
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn run_file_path(&self) -> PathBuf {
        self.base_dir.join(Self::RUN_FILE)
    }

    async fn read_run(&self) -> AllocatorResult<Option<AllocationRun>> {
        let path = self.run_file_path();
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AllocatorError::fs("read", &path, e)),
        }
    }

    async fn write_run(&self, run: &AllocationRun) -> AllocatorResult<()> {
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| AllocatorError::fs("create directory", &self.base_dir, e))?;

        let path = self.run_file_path();
        let tmp_path = self.base_dir.join(format!("{}.tmp", Self::RUN_FILE));
        let content = serde_json::to_string_pretty(run)?;

        fs::write(&tmp_path, content)
            .await
            .map_err(|e| AllocatorError::fs("write", &tmp_path, e))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| AllocatorError::fs("rename", &path, e))?;
        Ok(())
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssignmentStore for JsonFileStore {
    async fn replace_run(&self, run: &AllocationRun) -> AllocatorResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_run(run).await?;
        component_debug!(
            Component::Store,
            "💾 Stored run {} with {} assignments in {}",
            run.run_id,
            run.assignments.len(),
            self.run_file_path().display()
        );
        Ok(())
    }

    async fn load_run(&self) -> AllocatorResult<Option<AllocationRun>> {
        self.read_run().await
    }

    async fn get_assignment(&self, run_id: RunId, id: AssignmentId) -> AllocatorResult<Assignment> {
        let run = self.read_run().await?.ok_or(AllocatorError::NoActiveRun)?;
        run.ensure_current(run_id)?;
        Ok(run.assignment(id)?.clone())
    }

    async fn update_status(&self, patch: &StatusPatch) -> AllocatorResult<Assignment> {
        let _guard = self.write_lock.lock().await;
        let mut run = self.read_run().await?.ok_or(AllocatorError::NoActiveRun)?;
        run.ensure_current(patch.run_id)?;

        let assignment = run.assignment_mut(patch.assignment_id)?;
        patch.apply_to(assignment);
        let updated = assignment.clone();

        self.write_run(&run).await?;
        component_debug!(
            Component::Store,
            "💾 Assignment {} is now {}",
            updated.id,
            updated.status
        );
        Ok(updated)
    }
}
