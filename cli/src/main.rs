//! ATC tariffs: command line front end
//!
//! Catalog of long-distance call tariffs backed by SQLite.
//!
//! ```sh
//! # Interactive mode over ./atc.db
//! atc
//!
//! # One-shot commands
//! atc add --city Springfield --type privileged --price 10 --discount 20
//! atc list
//! atc export tariffs.csv
//!
//! # Volatile catalog, nothing is written to disk
//! atc --memory shell
//! ```

mod commands;
mod table;
mod words;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use atc_tariffs::config::AppConfig;
use atc_tariffs::{init_tracing, open_repository, StorageBackend, TariffManager};

use commands::{Command, Session};

/// Long-distance call tariff catalog.
#[derive(Parser, Debug)]
#[command(
    name = "atc",
    version,
    about = "Каталог тарифов междугородной связи",
    long_about = "Каталог тарифов междугородной связи с хранением в SQLite.\n\n\
                  Без команды запускается интерактивный режим.\n\
                  Конфигурация по умолчанию: ~/.config/atc-tariffs/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "ATC_CONFIG")]
    config: Option<PathBuf>,

    /// Override the SQLite database file.
    #[arg(long, conflicts_with = "memory")]
    db: Option<PathBuf>,

    /// Keep the catalog in memory only.
    #[arg(long)]
    memory: bool,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    /// Fold command line overrides into the loaded configuration.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(ref path) = self.db {
            config.storage.backend = StorageBackend::Sqlite;
            config.storage.path = path.clone();
        }
        if self.memory {
            config.storage.backend = StorageBackend::Memory;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Load configuration ──────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(atc_tariffs::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    cli.apply_overrides(&mut config);
    init_tracing(&config.logging);

    match load_error {
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
        None => info!("Configuration loaded from {}", config_path.display()),
    }

    // ── Config validation mode ──────────────────────────────────
    if cli.check {
        println!("Config file : {}", config_path.display());
        match config.storage.backend {
            StorageBackend::Sqlite => println!("Database    : {}", config.storage.database().url),
            StorageBackend::Memory => println!("Database    : in memory"),
        }
        println!("Log level   : {}", config.logging.level);
        println!("Log format  : {}", config.logging.format);
        return ExitCode::SUCCESS;
    }

    // ── Open storage ────────────────────────────────────────────
    let repo = match open_repository(&config.storage).await {
        Ok(repo) => repo,
        Err(e) => {
            error!("Storage initialization failed: {}", e);
            eprintln!("Ошибка работы с БД: {e}");
            return ExitCode::FAILURE;
        }
    };
    let manager = match TariffManager::new(repo).await {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // ── Run ─────────────────────────────────────────────────────
    let command = cli.command.unwrap_or(Command::Shell);
    let mut session = Session::new(manager, io::stdin().lock(), io::stdout());
    match session.run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Ошибка: {e}");
            ExitCode::FAILURE
        }
    }
}
