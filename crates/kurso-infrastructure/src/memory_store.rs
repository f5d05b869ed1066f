//! In-memory course store.
//!
//! Drop-in `CourseStore` for tests and embedding; nothing survives the
//! process.

use std::collections::HashMap;
use std::sync::Mutex;

use kurso_core::error::Result;
use kurso_core::message::Message;
use kurso_core::progress::Progress;
use kurso_core::settings::Settings;
use kurso_core::store::CourseStore;

/// `CourseStore` implementation backed by process memory.
#[derive(Default)]
pub struct MemoryStore {
    settings: Mutex<Option<Settings>>,
    progress: Mutex<Option<Progress>>,
    histories: Mutex<HashMap<String, Vec<Message>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CourseStore for MemoryStore {
    fn get_settings(&self) -> Settings {
        self.settings
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
            .unwrap_or_default()
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        *self.settings.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(settings.clone());
        Ok(())
    }

    fn get_progress(&self) -> Progress {
        self.progress
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
            .unwrap_or_default()
    }

    fn save_progress(&self, progress: &Progress) -> Result<()> {
        *self.progress.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(progress.clone());
        Ok(())
    }

    fn get_history(&self, module_id: &str) -> Vec<Message> {
        self.histories
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(module_id)
            .cloned()
            .unwrap_or_default()
    }

    fn save_history(&self, module_id: &str, messages: &[Message]) -> Result<()> {
        self.histories
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(module_id.to_string(), messages.to_vec());
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        *self.settings.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        self.clear_history()
    }

    fn clear_history(&self) -> Result<()> {
        *self.progress.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        self.histories.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurso_core::settings::Provider;

    #[test]
    fn history_round_trips_per_module() {
        let store = MemoryStore::new();
        let history = vec![Message::user("a"), Message::assistant("b")];
        store.save_history("1.1", &history).unwrap();

        assert_eq!(store.get_history("1.1"), history);
        assert!(store.get_history("1.2").is_empty());
    }

    #[test]
    fn append_message_builds_history_in_order() {
        let store = MemoryStore::new();
        store.append_message("1.1", Message::user("первый")).unwrap();
        let history = store
            .append_message("1.1", Message::assistant("второй"))
            .unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "первый");
        assert_eq!(history[1].content, "второй");
    }

    #[test]
    fn clear_history_keeps_settings() {
        let store = MemoryStore::new();
        let settings = Settings::new(Provider::OpenAi, "x".repeat(20));
        store.save_settings(&settings).unwrap();
        store.mark_module_complete("1.1").unwrap();
        store.save_history("1.1", &[Message::user("a")]).unwrap();

        store.clear_history().unwrap();

        assert_eq!(store.get_settings(), settings);
        assert_eq!(store.get_progress(), Progress::default());
        assert!(store.get_history("1.1").is_empty());
    }

    #[test]
    fn clear_all_erases_settings_too() {
        let store = MemoryStore::new();
        store
            .save_settings(&Settings::new(Provider::OpenAi, "x".repeat(20)))
            .unwrap();

        store.clear_all().unwrap();

        assert!(!store.is_configured());
        assert_eq!(store.get_settings(), Settings::default());
    }
}
