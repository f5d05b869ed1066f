//! Persistence store contract.
//!
//! Decouples the session controller from the specific storage mechanism so
//! an alternative backing store (in-memory for tests, file-backed for the
//! CLI) can be substituted without touching the controller.

use crate::error::Result;
use crate::message::Message;
use crate::progress::Progress;
use crate::settings::Settings;

/// An abstract store for settings, progress, and per-module chat history.
///
/// Reads never fail: missing or corrupt data degrades to the documented
/// defaults. Writes are full replacements of the addressed entity. There is
/// no transactional guarantee across entities; a crash between two saves can
/// leave them inconsistent, which callers accept.
///
/// The read-modify-write operations and `is_configured` are default methods
/// composed from the primitives, so every backend shares their semantics.
pub trait CourseStore: Send + Sync {
    /// Returns stored settings, or `Settings::default()` when absent.
    fn get_settings(&self) -> Settings;

    /// Overwrites the stored settings (full replace).
    fn save_settings(&self, settings: &Settings) -> Result<()>;

    /// Returns stored progress, or `Progress::default()` when absent.
    fn get_progress(&self) -> Progress;

    /// Overwrites the stored progress (full replace).
    fn save_progress(&self, progress: &Progress) -> Result<()>;

    /// Returns the stored history for a module, or an empty sequence.
    fn get_history(&self, module_id: &str) -> Vec<Message>;

    /// Overwrites the stored history for a module (full replace).
    fn save_history(&self, module_id: &str, messages: &[Message]) -> Result<()>;

    /// Erases settings, progress, and all per-module histories.
    fn clear_all(&self) -> Result<()>;

    /// Erases progress and all per-module histories; settings are kept.
    fn clear_history(&self) -> Result<()>;

    /// Moves the current-module pointer, keeping the rest of the progress.
    fn set_current_module(&self, module_id: &str) -> Result<()> {
        let mut progress = self.get_progress();
        progress.current_module = module_id.to_string();
        self.save_progress(&progress)
    }

    /// Records a module as completed (idempotent) and persists the result.
    fn mark_module_complete(&self, module_id: &str) -> Result<Progress> {
        let mut progress = self.get_progress();
        progress.mark_complete(module_id);
        self.save_progress(&progress)?;
        Ok(progress)
    }

    /// Appends one message to a module's history and persists it.
    fn append_message(&self, module_id: &str, message: Message) -> Result<Vec<Message>> {
        let mut history = self.get_history(module_id);
        history.push(message);
        self.save_history(module_id, &history)?;
        Ok(history)
    }

    /// Returns true when the stored API key passes the configured-length
    /// rule.
    fn is_configured(&self) -> bool {
        self.get_settings().is_configured()
    }
}
