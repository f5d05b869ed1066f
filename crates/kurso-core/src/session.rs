//! Session controller.
//!
//! Orchestrates module selection, gating, conversation accumulation, and
//! persistence round-trips. The controller owns the in-memory history of the
//! current module and guarantees at most one outstanding provider call at a
//! time; the network exchange is the only suspension point.

use std::sync::Arc;

use tracing::debug;

use crate::course::{self, Course};
use crate::error::{KursoError, Result};
use crate::message::Message;
use crate::provider::{ChatGateway, ProviderError};
use crate::store::CourseStore;

/// The synthetic user message that opens a fresh module.
pub const KICKOFF_MESSAGE: &str = "Начинаем!";

/// Case-insensitive phrase that switches the session to the next module
/// instead of being sent to the provider. Must stay lowercase.
pub const NEXT_MODULE_PHRASE: &str = "следующий модуль";

/// Observable state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The current module has no conversation yet.
    NotStarted,
    /// The module has history and awaits the next user turn.
    Active,
    /// A provider call is in flight.
    AwaitingReply,
}

/// Outcome of a controller operation.
///
/// Callers render state after receiving one of these; the controller emits
/// no events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A fresh module was started; `reply` is the assistant's opening turn.
    Started { reply: String },
    /// The module already had history; nothing was sent.
    Resumed,
    /// The assistant answered the user's message.
    Reply { reply: String },
    /// A navigation phrase completed the current module and switched to its
    /// successor. No provider call was made.
    SwitchedModule { module_id: String },
    /// Empty input or a request already in flight; nothing happened.
    Ignored,
}

/// The per-session state machine tying store, course, and provider together.
pub struct SessionController {
    store: Arc<dyn CourseStore>,
    gateway: Arc<dyn ChatGateway>,
    current_module: String,
    messages: Vec<Message>,
    loading: bool,
}

impl SessionController {
    /// Restores a session from the store: current module pointer plus that
    /// module's history. A stored pointer at a module the course no longer
    /// has degrades to the first module.
    pub fn new(store: Arc<dyn CourseStore>, gateway: Arc<dyn ChatGateway>) -> Self {
        let progress = store.get_progress();
        let current_module = if Course::get(&progress.current_module).is_some() {
            progress.current_module
        } else {
            debug!(
                module_id = %progress.current_module,
                "stored current module unknown, falling back to first"
            );
            course::FIRST_MODULE_ID.to_string()
        };
        let messages = store.get_history(&current_module);

        Self {
            store,
            gateway,
            current_module,
            messages,
            loading: false,
        }
    }

    /// The id of the module this session is currently in.
    pub fn current_module(&self) -> &str {
        &self.current_module
    }

    /// The in-memory conversation of the current module.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while a provider call is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The observable session state.
    pub fn state(&self) -> SessionState {
        if self.loading {
            SessionState::AwaitingReply
        } else if self.messages.is_empty() {
            SessionState::NotStarted
        } else {
            SessionState::Active
        }
    }

    /// Starts the current module, or resumes it if it already has history.
    ///
    /// A resume is a pure state transition: no network call. A fresh start
    /// sends the kickoff message through the provider and persists the
    /// kickoff together with the assistant's reply. On failure nothing is
    /// persisted; the session stays interactive and the start can be
    /// retried.
    pub async fn start_module(&mut self) -> Result<SessionEvent> {
        if !self.messages.is_empty() {
            return Ok(SessionEvent::Resumed);
        }
        if self.loading {
            return Ok(SessionEvent::Ignored);
        }

        let settings = self.configured_settings()?;
        let system_prompt = Course::system_prompt(&self.current_module)?;
        let kickoff = Message::user(KICKOFF_MESSAGE);

        self.loading = true;
        let result = self
            .gateway
            .send_chat(&system_prompt, std::slice::from_ref(&kickoff), &settings)
            .await;
        self.loading = false;

        let reply = result?;
        self.messages.push(kickoff);
        self.messages.push(Message::assistant(&reply));
        self.store.save_history(&self.current_module, &self.messages)?;

        Ok(SessionEvent::Started { reply })
    }

    /// Sends a user message through the provider, or handles it locally.
    ///
    /// Whitespace-only input and input arriving while a request is in
    /// flight are ignored. A navigation phrase with an existing successor
    /// completes the current module and switches without any network call.
    /// Otherwise the user turn is persisted before the exchange, so a
    /// failing reply never loses it.
    pub async fn send_message(&mut self, text: &str) -> Result<SessionEvent> {
        let text = text.trim();
        if text.is_empty() || self.loading {
            return Ok(SessionEvent::Ignored);
        }

        if text.to_lowercase().contains(NEXT_MODULE_PHRASE) {
            if let Some(next) = Course::next_of(&self.current_module) {
                self.store.mark_module_complete(&self.current_module)?;
                self.switch_module(next)?;
                return Ok(SessionEvent::SwitchedModule {
                    module_id: next.to_string(),
                });
            }
        }

        let settings = self.configured_settings()?;
        let system_prompt = Course::system_prompt(&self.current_module)?;

        // Persist the user turn immediately: a failing reply, or a reload
        // right after this point, must not lose it.
        self.messages.push(Message::user(text));
        self.store.save_history(&self.current_module, &self.messages)?;

        self.loading = true;
        let result = self
            .gateway
            .send_chat(&system_prompt, &self.messages, &settings)
            .await;
        self.loading = false;

        let reply = result?;
        self.messages.push(Message::assistant(&reply));
        self.store.save_history(&self.current_module, &self.messages)?;

        Ok(SessionEvent::Reply { reply })
    }

    /// Unconditionally moves the session to `module_id`: persists the new
    /// current-module pointer and replaces the in-memory history with that
    /// module's persisted one (empty if none).
    pub fn switch_module(&mut self, module_id: &str) -> Result<()> {
        let module =
            Course::get(module_id).ok_or_else(|| KursoError::not_found("module", module_id))?;

        self.current_module = module.id.to_string();
        self.store.set_current_module(module.id)?;
        self.messages = self.store.get_history(module.id);
        Ok(())
    }

    /// Gating predicate: a module is accessible iff it is already
    /// completed, or it is the current module, or it is the immediate
    /// successor of a completed current module. No skipping ahead.
    pub fn can_access_module(&self, module_id: &str) -> bool {
        let progress = self.store.get_progress();
        if progress.is_completed(module_id) || module_id == self.current_module {
            return true;
        }
        Course::next_of(&self.current_module)
            .is_some_and(|next| next == module_id && progress.is_completed(&self.current_module))
    }

    /// Clears all progress and per-module history and returns the session
    /// to the first module with an empty conversation. Settings are
    /// preserved.
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear_history()?;
        self.current_module = course::FIRST_MODULE_ID.to_string();
        self.messages.clear();
        self.store.set_current_module(course::FIRST_MODULE_ID)?;
        Ok(())
    }

    /// Reads settings and rejects the operation before any network call
    /// when no usable API key is stored.
    fn configured_settings(&self) -> Result<crate::settings::Settings> {
        let settings = self.store.get_settings();
        if !settings.is_configured() {
            return Err(ProviderError::MissingApiKey {
                provider: settings.provider,
            }
            .into());
        }
        Ok(settings)
    }
}
