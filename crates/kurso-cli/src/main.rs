//! Kurso CLI entry point.
//!
//! The binary is a thin caller of the core API: it renders state and routes
//! user actions into the session controller, never into providers or
//! persistence directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;

use kurso_core::course::Course;
use kurso_core::settings::{Provider, Settings};
use kurso_core::store::CourseStore;
use kurso_infrastructure::JsonFileStore;

mod repl;

#[derive(Parser)]
#[command(name = "kurso")]
#[command(about = "Kurso - chat-driven course on social design", long_about = None)]
struct Cli {
    /// Override the data directory (defaults to the platform config dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive course chat (default)
    Chat,
    /// Save provider, API key, and model settings
    Configure {
        /// Provider tag: anthropic, openai, or google
        #[arg(long)]
        provider: String,
        /// API key for the chosen provider
        #[arg(long)]
        api_key: String,
        /// Model id; defaults to the provider's default model
        #[arg(long)]
        model: Option<String>,
    },
    /// Show configuration and course progress
    Status,
    /// List the selectable models for every provider
    Models,
    /// Clear course progress and chat history; settings are kept
    Reset {
        /// Also erase provider settings
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = open_store(cli.data_dir.as_deref())?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => repl::run(Arc::new(store)).await,
        Commands::Configure {
            provider,
            api_key,
            model,
        } => configure(&store, &provider, api_key, model),
        Commands::Status => {
            status(&store);
            Ok(())
        }
        Commands::Models => {
            models();
            Ok(())
        }
        Commands::Reset { all } => reset(&store, all),
    }
}

fn open_store(data_dir: Option<&Path>) -> Result<JsonFileStore> {
    let store = match data_dir {
        Some(dir) => JsonFileStore::new(dir)?,
        None => JsonFileStore::default_location()?,
    };
    Ok(store)
}

fn configure(
    store: &JsonFileStore,
    provider: &str,
    api_key: String,
    model: Option<String>,
) -> Result<()> {
    let provider: Provider = provider
        .parse()
        .map_err(|_| anyhow!("unknown provider '{provider}'; expected anthropic, openai, or google"))?;

    let mut settings = Settings::new(provider, api_key);
    if let Some(model) = model {
        settings.model = model;
    }
    store.save_settings(&settings)?;

    if settings.is_configured() {
        println!(
            "{}",
            format!("Saved: {} / {}", provider.display_name(), settings.model).green()
        );
    } else {
        println!(
            "{}",
            "Saved, but the API key looks too short to be usable.".yellow()
        );
    }
    Ok(())
}

fn status(store: &JsonFileStore) {
    let settings = store.get_settings();
    let progress = store.get_progress();

    println!(
        "Provider: {} ({})",
        settings.provider.display_name(),
        settings.model
    );
    println!(
        "Configured: {}",
        if store.is_configured() { "yes".green() } else { "no".red() }
    );
    println!();

    for module in Course::modules() {
        let marker = if progress.is_completed(module.id) {
            "✓".green()
        } else if module.id == progress.current_module {
            "▶".cyan()
        } else {
            "·".bright_black()
        };
        let turns = store.get_history(module.id).len();
        println!("{marker} {} {} ({turns} messages)", module.id, module.title);
    }
}

fn models() {
    use strum::IntoEnumIterator;

    for provider in Provider::iter() {
        println!("{} ({}):", provider.display_name(), provider);
        for model in kurso_interaction::available_models(provider) {
            let default_marker = if model.id == provider.default_model() {
                " [default]".bright_black()
            } else {
                "".normal()
            };
            println!("  {:<28} {}{default_marker}", model.id, model.name);
        }
        println!();
    }
}

fn reset(store: &JsonFileStore, all: bool) -> Result<()> {
    if all {
        store.clear_all()?;
        println!("{}", "Settings, progress, and history erased.".green());
    } else {
        store.clear_history()?;
        println!("{}", "Progress and history erased; settings kept.".green());
    }
    Ok(())
}
