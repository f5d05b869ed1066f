//! File-backed course store.
//!
//! One JSON file per conceptual key: `settings.json`, `progress.json`, and
//! `history/<moduleId>.json` under a base directory. Every read degrades to
//! the entity's default when the file is missing or unreadable; only writes
//! can fail.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use kurso_core::error::Result;
use kurso_core::message::Message;
use kurso_core::progress::Progress;
use kurso_core::settings::Settings;
use kurso_core::store::CourseStore;

use crate::atomic_json::AtomicJsonFile;
use crate::paths::KursoPaths;

const SETTINGS_FILE: &str = "settings.json";
const PROGRESS_FILE: &str = "progress.json";
const HISTORY_DIR: &str = "history";

/// `CourseStore` implementation over per-entity JSON files.
pub struct JsonFileStore {
    base_dir: PathBuf,
    settings: AtomicJsonFile<Settings>,
    progress: AtomicJsonFile<Progress>,
}

impl JsonFileStore {
    /// Creates a store rooted at `base_dir`, creating the directory tree if
    /// needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(base_dir.join(HISTORY_DIR))?;

        Ok(Self {
            settings: AtomicJsonFile::new(base_dir.join(SETTINGS_FILE)),
            progress: AtomicJsonFile::new(base_dir.join(PROGRESS_FILE)),
            base_dir,
        })
    }

    /// Creates a store at the default per-user location
    /// (`~/.config/kurso` on Linux).
    pub fn default_location() -> Result<Self> {
        Self::new(KursoPaths::config_dir()?)
    }

    /// The directory this store lives in.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn history_file(&self, module_id: &str) -> AtomicJsonFile<Vec<Message>> {
        AtomicJsonFile::new(
            self.base_dir
                .join(HISTORY_DIR)
                .join(format!("{module_id}.json")),
        )
    }

    /// Removes every per-module history file.
    fn remove_histories(&self) -> Result<()> {
        let history_dir = self.base_dir.join(HISTORY_DIR);
        if !history_dir.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(&history_dir)? {
            let path = entry?.path();
            if path.is_file() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

impl CourseStore for JsonFileStore {
    fn get_settings(&self) -> Settings {
        match self.settings.load() {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!(error = %e, "settings unreadable, using defaults");
                Settings::default()
            }
        }
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.settings.save(settings)
    }

    fn get_progress(&self) -> Progress {
        match self.progress.load() {
            Ok(Some(progress)) => progress,
            Ok(None) => Progress::default(),
            Err(e) => {
                warn!(error = %e, "progress unreadable, using defaults");
                Progress::default()
            }
        }
    }

    fn save_progress(&self, progress: &Progress) -> Result<()> {
        self.progress.save(progress)
    }

    fn get_history(&self, module_id: &str) -> Vec<Message> {
        match self.history_file(module_id).load() {
            Ok(Some(messages)) => messages,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(module_id, error = %e, "history unreadable, using empty");
                Vec::new()
            }
        }
    }

    fn save_history(&self, module_id: &str, messages: &[Message]) -> Result<()> {
        self.history_file(module_id).save(&messages.to_vec())
    }

    fn clear_all(&self) -> Result<()> {
        self.settings.remove()?;
        self.clear_history()
    }

    fn clear_history(&self) -> Result<()> {
        self.progress.remove()?;
        self.remove_histories()
    }

    // Read-modify-write under the file lock, so two concurrent updaters on
    // the same store directory cannot drop each other's writes.
    fn set_current_module(&self, module_id: &str) -> Result<()> {
        self.progress.update(Progress::default(), |progress| {
            progress.current_module = module_id.to_string();
        })
    }

    fn mark_module_complete(&self, module_id: &str) -> Result<Progress> {
        let mut updated = Progress::default();
        self.progress.update(Progress::default(), |progress| {
            progress.mark_complete(module_id);
            updated = progress.clone();
        })?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurso_core::settings::Provider;
    use std::fs;
    use tempfile::TempDir;

    fn store() -> (TempDir, JsonFileStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path()).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn settings_default_then_round_trip() {
        let (_dir, store) = store();
        assert_eq!(store.get_settings(), Settings::default());

        let settings = Settings::new(Provider::OpenAi, "x".repeat(20));
        store.save_settings(&settings).unwrap();
        assert_eq!(store.get_settings(), settings);
        assert!(store.is_configured());
    }

    #[test]
    fn short_api_key_is_not_configured() {
        let (_dir, store) = store();
        store
            .save_settings(&Settings::new(Provider::OpenAi, "short"))
            .unwrap();
        assert!(!store.is_configured());
    }

    #[test]
    fn history_round_trips_including_empty() {
        let (_dir, store) = store();
        assert!(store.get_history("1.1").is_empty());

        let history = vec![Message::user("привет"), Message::assistant("здравствуй")];
        store.save_history("1.1", &history).unwrap();
        assert_eq!(store.get_history("1.1"), history);

        store.save_history("1.1", &[]).unwrap();
        assert!(store.get_history("1.1").is_empty());

        // Histories are independent per module.
        assert!(store.get_history("1.2").is_empty());
    }

    #[test]
    fn corrupt_files_degrade_to_defaults() {
        let (dir, store) = store();
        fs::write(dir.path().join("settings.json"), "{ nope").unwrap();
        fs::write(dir.path().join("progress.json"), "[1,2,").unwrap();
        fs::write(dir.path().join("history/1.1.json"), "!!").unwrap();

        assert_eq!(store.get_settings(), Settings::default());
        assert_eq!(store.get_progress(), Progress::default());
        assert!(store.get_history("1.1").is_empty());
    }

    #[test]
    fn mark_module_complete_is_idempotent_and_persisted() {
        let (_dir, store) = store();
        store.mark_module_complete("1.1").unwrap();
        store.mark_module_complete("1.2").unwrap();
        let progress = store.mark_module_complete("1.1").unwrap();

        assert_eq!(progress.completed_modules, vec!["1.1", "1.2"]);
        assert_eq!(store.get_progress().completed_modules, vec!["1.1", "1.2"]);
    }

    #[test]
    fn set_current_module_keeps_completions() {
        let (_dir, store) = store();
        store.mark_module_complete("1.1").unwrap();
        store.set_current_module("1.2").unwrap();

        let progress = store.get_progress();
        assert_eq!(progress.current_module, "1.2");
        assert_eq!(progress.completed_modules, vec!["1.1"]);
    }

    #[test]
    fn clear_history_keeps_settings() {
        let (_dir, store) = store();
        let settings = Settings::new(Provider::Google, "k".repeat(16));
        store.save_settings(&settings).unwrap();
        store.mark_module_complete("1.1").unwrap();
        store.save_history("1.1", &[Message::user("a")]).unwrap();
        store.save_history("1.2", &[Message::user("b")]).unwrap();

        store.clear_history().unwrap();

        assert_eq!(store.get_settings(), settings);
        assert_eq!(store.get_progress(), Progress::default());
        assert!(store.get_history("1.1").is_empty());
        assert!(store.get_history("1.2").is_empty());
    }

    #[test]
    fn clear_all_erases_everything() {
        let (_dir, store) = store();
        store
            .save_settings(&Settings::new(Provider::Google, "k".repeat(16)))
            .unwrap();
        store.save_history("1.1", &[Message::user("a")]).unwrap();

        store.clear_all().unwrap();

        assert_eq!(store.get_settings(), Settings::default());
        assert!(store.get_history("1.1").is_empty());
        assert!(!store.is_configured());
    }

    #[test]
    fn persisted_layout_uses_stable_key_names() {
        let (dir, store) = store();
        store
            .save_settings(&Settings::new(Provider::Anthropic, "k".repeat(16)))
            .unwrap();
        store.mark_module_complete("1.1").unwrap();

        let settings_json = fs::read_to_string(dir.path().join("settings.json")).unwrap();
        assert!(settings_json.contains("\"apiKey\""));
        let progress_json = fs::read_to_string(dir.path().join("progress.json")).unwrap();
        assert!(progress_json.contains("\"completedModules\""));
        assert!(progress_json.contains("\"currentModule\""));
    }
}
