use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use equityeye_core::ai::gemini::API_KEY_ENV;
use equityeye_core::{audit, encode, Config, GeminiClient};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "equityeye")]
#[command(about = "Audit term sheets and investment agreements with AI counsel")]
struct Cli {
    /// Document to audit on startup (PDF, PNG, JPG, or WEBP)
    file: Option<PathBuf>,

    /// Model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Print the audit report to stdout and exit (requires FILE)
    #[arg(long)]
    report_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging();

    let config = Config::load().unwrap_or_else(|_| Config::new());

    // Check env var first, then config
    let api_key = std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.is_empty())
        .or_else(|| config.api_key.clone());
    let client = api_key.as_deref().map(GeminiClient::new);

    let model = cli.model.unwrap_or_else(|| config.resolved_model());
    let persona = config.resolved_persona();

    if cli.report_only {
        let path = cli
            .file
            .as_deref()
            .context("--report-only requires a document path")?;
        let client = client.with_context(|| format!("{API_KEY_ENV} is not set"))?;

        let file = encode::encode_file(path).await?;
        let report = audit::analyze_document(&client, &model, &file, &persona).await?;
        println!("{report}");
        return Ok(());
    }

    let mut app = App::new(client, model, persona);
    if let Some(path) = cli.file {
        app.path_input = path.display().to_string();
        app.submit_document();
    }

    run(app).await
}

async fn run(mut app: App) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event).await?;
        }
    }

    tui::restore()?;
    Ok(())
}

/// Log to a file under the config directory; the terminal is in use by the
/// alternate screen.
fn init_logging() {
    let Some(config_dir) = dirs::config_dir() else {
        return;
    };
    let log_dir = config_dir.join("equityeye");
    if std::fs::create_dir_all(&log_dir).is_err() {
        return;
    }

    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("equityeye.log"))
    else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}
