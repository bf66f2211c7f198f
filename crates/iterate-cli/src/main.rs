//! iterate CLI: entry point for the Iterate journal

use clap::{Parser, Subcommand};
use iterate_bridge::{Config, JournalBackend, ProcessBridge, ScriptedBackend, SettingsStore};
use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Private, encrypted journaling in the terminal
#[derive(Parser)]
#[command(name = "iterate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/iterate/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend program and its arguments, overriding the config file.
    /// Takes every following argument, so put it last.
    #[arg(
        long,
        global = true,
        value_name = "COMMAND",
        num_args = 1..,
        allow_hyphen_values = true
    )]
    backend: Option<Vec<String>>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Print the last-used journal
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init,

    /// Open the TUI against an in-memory journal (password: "correct horse")
    Demo,
}

/// Environment variable holding the log filter.
const LOG_ENV: &str = "ITERATE_LOG";

const DEMO_JOURNAL: &str = "demo/journal.db";
const DEMO_PASSWORD: &str = "correct horse";

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        None | Some(Commands::Tui) => cmd_tui(cli.config.as_deref(), cli.backend),
        Some(Commands::History { json }) => cmd_history(cli.config.as_deref(), json),
        Some(Commands::Init) => cmd_init(cli.config.as_deref()),
        Some(Commands::Demo) => cmd_demo(cli.config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn config_path(explicit: Option<&Path>) -> Result<PathBuf, Box<dyn Error>> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::default_path().ok_or_else(|| "no config directory on this system".into()),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Config, Box<dyn Error>> {
    let path = config_path(explicit)?;
    Ok(Config::load_or_default(&path)?)
}

/// Open the settings store, starting empty if it cannot be read.
fn load_settings(config: &Config) -> Option<SettingsStore> {
    let path = config.resolved_settings_path()?;
    match SettingsStore::load(&path) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            Some(SettingsStore::empty(path))
        }
    }
}

/// Send logs to a file; the TUI owns the terminal.
fn init_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    let Some(path) = config.resolved_log_path() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(filter)
        .try_init()?;
    Ok(())
}

fn cmd_tui(
    config_override: Option<&Path>,
    backend: Option<Vec<String>>,
) -> Result<(), Box<dyn Error>> {
    let mut config = load_config(config_override)?;
    if let Some(argv) = backend {
        config.backend_command = argv;
    }
    init_logging(&config)?;

    let settings = load_settings(&config);
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_with_bridge(&config, settings))
}

async fn run_with_bridge(
    config: &Config,
    settings: Option<SettingsStore>,
) -> Result<(), Box<dyn Error>> {
    info!(command = ?config.backend_command, "starting backend");
    let bridge = ProcessBridge::spawn(&config.backend_command, config.request_timeout())?;
    let backend: Arc<dyn JournalBackend> = Arc::new(bridge);
    iterate_tui::run_tui(backend, settings).await
}

fn cmd_demo(config_override: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let config = load_config(config_override)?;
    init_logging(&config)?;

    let backend: Arc<dyn JournalBackend> = Arc::new(
        ScriptedBackend::demo(DEMO_JOURNAL, DEMO_PASSWORD).with_delay(Duration::from_millis(600)),
    );
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(iterate_tui::run_tui(backend, None))
}

fn cmd_history(config_override: Option<&Path>, json: bool) -> Result<(), Box<dyn Error>> {
    let config = load_config(config_override)?;
    let history = load_settings(&config)
        .map(|store| store.history())
        .unwrap_or_default();

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.is_empty() {
        println!("No recent journals");
        return Ok(());
    }

    println!("Last used journal\n");
    if let Some(name) = &history.name {
        println!("  Name: {name}");
    }
    if let Some(path) = &history.path {
        println!("  Path: {path}");
    }
    if let Some(opened) = history.last_opened {
        println!("  Last opened: {}", opened.to_rfc3339());
    }
    Ok(())
}

fn cmd_init(config_override: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let path = config_path(config_override)?;
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    Config::default().save(&path)?;
    println!("Created {}", path.display());
    println!("Edit backend_command to point at your journal backend");
    Ok(())
}
