use crate::error::AppError;
use crate::model::{Task, Zone};
use crate::store::TaskStore;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "store.json";
const STORE_ENV_VAR: &str = "RENO_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredProject {
    schema_version: u32,
    #[serde(default)]
    next_task_number: u64,
    #[serde(default)]
    zones: Vec<Zone>,
    #[serde(default)]
    tasks: Vec<Task>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    super::app_file(STORE_ENV_VAR, STORE_FILE_NAME)
}

/// Reads the project file; a missing file is an empty project.
pub fn load_store(path: &Path) -> Result<TaskStore, AppError> {
    if !path.exists() {
        debug!(
            "event=store_load module=json_store status=empty path={}",
            path.display()
        );
        return Ok(TaskStore::new());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredProject =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    let store = TaskStore::from_parts(stored.zones, stored.tasks, stored.next_task_number)?;
    debug!(
        "event=store_load module=json_store status=ok zones={} tasks={}",
        store.zones().len(),
        store.tasks().len()
    );
    Ok(store)
}

pub fn save_store(path: &Path, store: &TaskStore) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredProject {
        schema_version: SCHEMA_VERSION,
        next_task_number: store.next_task_number(),
        zones: store.zones().to_vec(),
        tasks: store.tasks().to_vec(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    debug!(
        "event=store_save module=json_store status=ok path={}",
        path.display()
    );
    Ok(())
}
