//! Course progress tracking.

use serde::{Deserialize, Serialize};

use crate::course;

/// Which modules the user has finished and where they currently are.
///
/// `completed_modules` keeps insertion order: the order of completion is the
/// order of the entries. A module id, once recorded, is never removed except
/// by a full reset. The serialized field names are part of the persisted
/// `progress` layout and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed_modules: Vec<String>,
    pub current_module: String,
}

impl Progress {
    /// Returns true when the module has been completed.
    pub fn is_completed(&self, module_id: &str) -> bool {
        self.completed_modules.iter().any(|id| id == module_id)
    }

    /// Records a module as completed. Appending is idempotent: a second
    /// call with the same id leaves the list unchanged.
    pub fn mark_complete(&mut self, module_id: &str) {
        if !self.is_completed(module_id) {
            self.completed_modules.push(module_id.to_string());
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            completed_modules: Vec::new(),
            current_module: course::FIRST_MODULE_ID.to_string(),
        }
    }
}
