//! Interactive course REPL.
//!
//! A rustyline loop over the session controller: render history, read a
//! line, hand it to the core, render the outcome. Slash commands cover the
//! actions the web UI exposed as buttons.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use kurso_core::course::Course;
use kurso_core::message::{Message, MessageRole};
use kurso_core::session::{NEXT_MODULE_PHRASE, SessionController, SessionEvent};
use kurso_core::store::CourseStore;
use kurso_interaction::ApiGateway;

const COMMANDS: &[&str] = &["/start", "/next", "/module", "/modules", "/reset", "/quit"];

/// CLI helper for rustyline that provides completion, highlighting, and
/// hints for the slash commands.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|cmd| cmd.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Runs the course chat until `/quit` or EOF.
pub async fn run(store: Arc<dyn CourseStore>) -> Result<()> {
    let gateway = Arc::new(ApiGateway::new());
    let mut session = SessionController::new(store.clone(), gateway);

    println!("{}", "=== Social Design Foundations ===".bright_magenta().bold());
    if store.is_configured() {
        println!(
            "{}",
            "Type /start to begin the module, /modules for the course map, /quit to exit."
                .bright_black()
        );
    } else {
        println!(
            "{}",
            "No API key configured yet. Run `kurso configure --provider ... --api-key ...` first."
                .yellow()
        );
    }
    println!();

    print_module_header(&session);
    for message in session.messages().to_vec() {
        print_message(&message);
    }

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    loop {
        let prompt = format!("[{}] >> ", session.current_module());
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match trimmed {
                    "/quit" | "/exit" => break,
                    "/modules" => print_modules(&session),
                    "/reset" => match session.reset() {
                        Ok(()) => {
                            println!("{}", "Course reset. Back at module 1.1.".green());
                            print_module_header(&session);
                        }
                        Err(e) => print_error(&e.to_string()),
                    },
                    "/start" => {
                        let outcome = session.start_module().await;
                        handle_outcome(&mut session, outcome);
                    }
                    "/next" => {
                        let outcome = session.send_message(NEXT_MODULE_PHRASE).await;
                        handle_outcome(&mut session, outcome);
                    }
                    command if command.starts_with("/module") => {
                        let module_id = command.trim_start_matches("/module").trim();
                        switch_to(&mut session, module_id);
                    }
                    text => {
                        println!("{}", format!("> {text}").green());
                        let outcome = session.send_message(text).await;
                        handle_outcome(&mut session, outcome);
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

fn handle_outcome(
    session: &mut SessionController,
    outcome: kurso_core::error::Result<SessionEvent>,
) {
    match outcome {
        Ok(SessionEvent::Started { reply }) | Ok(SessionEvent::Reply { reply }) => {
            print_assistant(&reply);
        }
        Ok(SessionEvent::Resumed) => {
            println!("{}", "Continuing where you left off.".bright_black());
        }
        Ok(SessionEvent::SwitchedModule { module_id }) => {
            println!("{}", format!("Module completed! Moving on to {module_id}.").green());
            print_module_header(session);
            for message in session.messages().to_vec() {
                print_message(&message);
            }
        }
        Ok(SessionEvent::Ignored) => {}
        Err(e) => print_error(&e.to_string()),
    }
}

fn switch_to(session: &mut SessionController, module_id: &str) {
    if module_id.is_empty() {
        println!("{}", "Usage: /module <id>, e.g. /module 1.2".bright_black());
        return;
    }
    if !session.can_access_module(module_id) {
        println!(
            "{}",
            format!("Module {module_id} is locked. Finish the current one first.").yellow()
        );
        return;
    }
    match session.switch_module(module_id) {
        Ok(()) => {
            print_module_header(session);
            for message in session.messages().to_vec() {
                print_message(&message);
            }
        }
        Err(e) => print_error(&e.to_string()),
    }
}

fn print_modules(session: &SessionController) {
    for module in Course::modules() {
        let state = if module.id == session.current_module() {
            "current".cyan()
        } else if session.can_access_module(module.id) {
            "open".green()
        } else {
            "locked".bright_black()
        };
        println!("  {} {} [{state}]", module.id, module.title);
    }
}

fn print_module_header(session: &SessionController) {
    if let Some(module) = Course::get(session.current_module()) {
        println!(
            "{}",
            format!("--- Module {}: {} ---", module.id, module.title).bright_magenta()
        );
    }
}

fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => println!("{}", format!("> {}", message.content).green()),
        MessageRole::Assistant => print_assistant(&message.content),
    }
}

fn print_assistant(text: &str) {
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
    println!();
}

fn print_error(message: &str) {
    println!("{}", format!("Error: {message}").red());
}
