use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use ragchat_core::{logging, Config};
use tracing::{info, warn};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "ragchat")]
#[command(about = "Terminal chat client for a retrieval-augmented question answering service")]
struct Cli {
    /// Chat page URL; append ?newchat=1 to start a fresh conversation
    #[arg(short, long, env = "RAGCHAT_URL")]
    url: Option<String>,

    /// Log level when RAGCHAT_LOG is not set
    #[arg(long)]
    log_level: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => {
            let (config, warning) = config_or_default(Config::load());
            if let Some(warning) = warning {
                eprintln!("{warning}");
            }
            config
        }
    };
    if let Some(url) = cli.url {
        config.base_url = url;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    if cli.save_config {
        match &cli.config {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }
        println!("configuration saved");
        return Ok(());
    }

    // Logging is best effort; the UI works without it
    match logging::init(&config.log_level) {
        Ok(path) => info!(log = %path.display(), url = %config.base_url, "starting ragchat"),
        Err(e) => eprintln!("logging disabled: {e}"),
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &config).await;
    tui::restore()?;

    if let Err(e) = &result {
        warn!(error = %e, "exited with error");
    }
    result
}

/// A broken user config falls back to defaults, with a warning to show
fn config_or_default(loaded: Result<Config>) -> (Config, Option<String>) {
    match loaded {
        Ok(config) => (config, None),
        Err(e) => (
            Config::new(),
            Some(format!("ignoring unreadable config, using defaults: {e}")),
        ),
    }
}

async fn run(terminal: &mut Tui, config: &Config) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(config.tick_ms.max(1)));
    let mut app = App::new(config, events.sender())?;

    // Initial page load; a new chat flag in the URL is consumed here
    let navigation = app.chat.initial_navigation();
    app.navigate(navigation);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event).await?,
            None => break,
        }
    }

    Ok(())
}
