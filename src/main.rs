use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

mod app;
mod clipboard;
mod handler;
mod logging;
mod tui;
mod ui;

use app::{App, Page};
use clipboard::SystemClipboard;
use echo_core::view::{PanelBody, PanelView};
use echo_core::{html, Config, MemoryClipboard, PanelController, PanelHost, PanelMessage, PromptStore, SqliteArea};

const WELCOME: &str = "\
Welcome to Echo.

Move with j/k, press v to start a selection and move again to extend it.
Press s to send the selection (or the current line) to the panel.
Press p, or click the button in the corner, to open your saved prompts.

Inside the panel:
  n       new prompt
  c       copy the highlighted prompt
  d       delete the highlighted prompt
  Esc     close (unsaved form input is discarded)

Open a file with: echo open <FILE>";

#[derive(Parser)]
#[command(name = "echo")]
#[command(about = "Capture selected text into a local prompt library")]
struct Cli {
    /// Storage file (defaults to the configured path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Origin recorded on saved prompts
    #[arg(long, global = true)]
    source: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a page with the floating panel (default)
    Open {
        /// Text file to show as the page
        file: Option<PathBuf>,
    },
    /// Print the saved prompts, newest first
    List,
    /// Save a prompt without opening the panel
    Save {
        #[arg(short, long)]
        description: String,
        #[arg(short, long)]
        text: String,
    },
    /// Deliver one trigger message, e.g. '{"type":"TOGGLE_PANEL"}'
    Send {
        message: String,
        /// Also print the panel markup after the message
        #[arg(long)]
        html: bool,
    },
    /// Print the effective configuration
    Config {
        /// Write it to the config file, including --db and --source
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|_| Config::new());
    if let Some(db) = cli.db {
        config.storage_path = Some(db);
    }
    if let Some(source) = cli.source {
        config.source = Some(source);
    }

    let log_dir = Config::data_dir()?;
    logging::init(&log_dir, config.log_level.as_deref())?;

    match cli.command.unwrap_or(Commands::Open { file: None }) {
        Commands::Open { file } => run_tui(&config, file.as_deref()).await,
        Commands::List => list_prompts(&config).await,
        Commands::Save { description, text } => save_prompt(&config, &description, &text).await,
        Commands::Send { message, html } => send_message(&config, &message, html).await,
        Commands::Config { save } => show_config(&config, save),
    }
}

fn open_store(config: &Config) -> Result<PromptStore> {
    let path = config.storage_path()?;
    let area = SqliteArea::open(&path, config.quota_bytes)
        .with_context(|| format!("Failed to open storage at {}", path.display()))?;
    info!(path = %path.display(), "storage opened");
    Ok(PromptStore::new(Arc::new(area), config.storage_key.clone()))
}

fn source_label(config: &Config, file: Option<&Path>) -> String {
    file.and_then(|f| f.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .or_else(|| config.source.clone())
        .unwrap_or_else(|| "local".to_string())
}

async fn run_tui(config: &Config, file: Option<&Path>) -> Result<()> {
    let page = match file {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Page::new(path.display().to_string(), &content)
        }
        None => Page::new("welcome", WELCOME),
    };

    let origin = source_label(config, file);
    let panel = PanelController::init(open_store(config)?, Box::new(SystemClipboard), origin).await;
    let mut app = App::new(page, panel);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = async {
        while !app.should_quit && app.host.is_active() {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    app.host.dispose();
    tui::restore()?;
    result
}

async fn list_prompts(config: &Config) -> Result<()> {
    let mut store = open_store(config)?;
    let library = store.load().await;

    if library.is_empty() {
        println!("No prompts saved yet");
        return Ok(());
    }

    let list = echo_core::view::ListView::build(&library, chrono::Utc::now());
    println!("{}", list.title);
    for card in &list.cards {
        println!();
        println!("{}. {}", card.index + 1, card.description);
        println!("   {}", card.preview.replace('\n', "\n   "));
        println!("   {} chars · {}", card.char_count, card.time_ago);
    }
    Ok(())
}

async fn save_prompt(config: &Config, description: &str, text: &str) -> Result<()> {
    let origin = source_label(config, None);
    let mut panel = PanelController::init(open_store(config)?, Box::new(MemoryClipboard::new()), origin).await;
    panel.open_with_text(text);
    panel.submit_form(description, text).await?;

    let record = &panel.library()[0];
    println!("Saved \"{}\" ({} chars, id {})", record.description, record.char_count(), record.id);
    Ok(())
}

async fn send_message(config: &Config, raw: &str, print_html: bool) -> Result<()> {
    let message: PanelMessage = serde_json::from_str(raw).context("Invalid trigger message")?;

    let origin = source_label(config, None);
    let mut host = PanelHost::new();
    host.activate(PanelController::init(open_store(config)?, Box::new(MemoryClipboard::new()), origin).await);

    let ack = host.handle(message).await;
    println!("{}", serde_json::to_string(&ack)?);

    if let Some(panel) = host.panel() {
        let view = PanelView::build(panel, panel.now());
        let state = match (&view.body, view.visible) {
            (_, false) => "closed",
            (PanelBody::List(_), true) => "list",
            (PanelBody::Form(_), true) => "form",
        };
        eprintln!("panel: {}", state);
        if print_html {
            println!("{}", html::render(&view));
        }
    }
    host.dispose();
    Ok(())
}

fn show_config(config: &Config, save: bool) -> Result<()> {
    let path = Config::config_path()?;
    if save {
        config.save()?;
        info!(path = %path.display(), "config saved");
        eprintln!("Saved {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(config)?);
    eprintln!("storage: {}", config.storage_path()?.display());
    Ok(())
}
