//! `faqdesk` - CLI for the localized FAQ service
//!
//! This binary runs the HTTP server and provides maintenance commands for the
//! database and its backup.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use faqdesk::api::{self, AppContext};
use faqdesk::cli::{Cli, Command, ConfigCommand, ServeCommand};
use faqdesk::{init_logging, Backup, Config, Storage, Trigger};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let config_path = cli.config;
    match cli.command {
        Command::Serve(serve_cmd) => {
            let mut config = load_config(config_path.as_ref())?;
            serve_cmd.apply(&mut config);
            config.validate().context("invalid server settings")?;
            handle_serve(config, &serve_cmd).await
        }
        Command::Backup => handle_backup(&load_config(config_path.as_ref())?).await,
        Command::Status(status_cmd) => {
            handle_status(&load_config(config_path.as_ref())?, status_cmd.json)
        }
        Command::Config(config_cmd) => handle_config(config_path, config_cmd),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    Config::load_from(path.cloned()).context("failed to load configuration")
}

async fn handle_serve(config: Config, cmd: &ServeCommand) -> Result<()> {
    if cmd.host.is_some() || cmd.port.is_some() {
        info!("Command-line overrides applied: {}", config.bind_addr());
    }

    let ctx = AppContext::from_config(&config).context("failed to initialize service")?;
    info!(
        "Loaded locales {:?} (default {})",
        ctx.catalog().locales(),
        ctx.catalog().default_locale()
    );

    ctx.backup()
        .after(Trigger::Startup)
        .await
        .context("startup backup failed")?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    api::serve(config.bind_addr(), ctx, shutdown)
        .await
        .context("server failed")?;
    Ok(())
}

async fn handle_backup(config: &Config) -> Result<()> {
    let backup = Backup::from_config(config);
    let bytes = backup
        .after(Trigger::Manual)
        .await
        .context("backup failed")?
        .unwrap_or_default();

    println!(
        "Backed up {} to {} ({} bytes)",
        backup.source().display(),
        backup.destination().display(),
        bytes
    );
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> Result<()> {
    let database_path = config.database_path();
    let backup_path = config.backup_path();

    let stats = if database_path.exists() {
        Some(
            Storage::open(&database_path)
                .and_then(|store| store.stats())
                .context("failed to read database statistics")?,
        )
    } else {
        None
    };
    let backup_size = std::fs::metadata(&backup_path).ok().map(|m| m.len());

    if json {
        let status = serde_json::json!({
            "database_path": database_path,
            "database_exists": stats.is_some(),
            "faqs": stats.as_ref().map(|s| s.faqs),
            "answers": stats.as_ref().map(|s| s.answers),
            "db_size_bytes": stats.as_ref().map(|s| s.db_size_bytes),
            "backup_path": backup_path,
            "backup_size_bytes": backup_size,
            "locales": config.i18n.locales,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("faqdesk status");
        println!("--------------");
        println!("Database:      {}", database_path.display());
        match &stats {
            Some(stats) => {
                println!("FAQs:          {}", stats.faqs);
                println!("Answers:       {}", stats.answers);
                println!("Size:          {} bytes", stats.db_size_bytes);
            }
            None => println!("               (not created yet)"),
        }
        println!("Backup:        {}", backup_path.display());
        match backup_size {
            Some(size) => println!("Backup size:   {size} bytes"),
            None => println!("               (no backup yet)"),
        }
        println!("Locales:       {}", config.i18n.locales.join(", "));
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(config_path.as_ref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Listen address:     {}", config.bind_addr());
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Backup path:        {}", config.backup_path().display());
                println!();
                println!("[Backup]");
                println!("  Enabled:            {}", config.backup.enabled);
                println!("  On startup:         {}", config.backup.on_startup);
                println!("  After delete:       {}", config.backup.after_delete);
                println!();
                println!("[I18n]");
                println!("  Locales dir:        {}", config.i18n.locales_dir.display());
                println!("  Locales:            {}", config.i18n.locales.join(", "));
                println!("  Default locale:     {}", config.i18n.default_locale);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => anyhow::bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
