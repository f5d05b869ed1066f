//! Unified path management for kurso data files.
//!
//! All persistent state lives under one per-user directory so that backup,
//! inspection, and reset are a matter of one path.

use std::path::PathBuf;

use kurso_core::error::{KursoError, Result};

/// Directory name under the platform config dir.
const APP_DIR: &str = "kurso";

/// Platform path resolution for kurso.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/kurso/             # Linux; platform-appropriate elsewhere
/// ├── settings.json            # Provider, API key, model
/// ├── progress.json            # Completed modules + current module
/// └── history/
///     ├── 1.1.json             # Per-module conversation history
///     └── ...
/// ```
pub struct KursoPaths;

impl KursoPaths {
    /// Returns the kurso data directory (`~/.config/kurso` on Linux).
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the platform config directory
    /// cannot be determined.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| KursoError::config("Cannot find the user configuration directory"))
    }
}
