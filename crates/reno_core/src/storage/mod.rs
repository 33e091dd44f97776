use crate::error::AppError;
use std::path::PathBuf;

pub mod json_store;

const APP_DIR: &str = "reno";

/// Location of one of the app's files: `env_var` when set, otherwise the
/// per-user app directory (`~/.config/reno`, `%APPDATA%\reno` on Windows).
pub(crate) fn app_file(env_var: &str, file_name: &str) -> Result<PathBuf, AppError> {
    match std::env::var(env_var) {
        Ok(path) if !path.trim().is_empty() => return Ok(PathBuf::from(path)),
        _ => {}
    }

    let base = if cfg!(windows) {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .ok_or_else(|| AppError::invalid_data("APPDATA is not set"))?
    } else {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .ok_or_else(|| AppError::invalid_data("HOME is not set"))?
    };
    Ok(base.join(APP_DIR).join(file_name))
}
