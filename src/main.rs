//! Quorum — autonomous DAO operations daemon.
//!
//! Usage:
//!   quorum init      Write a default config file
//!   quorum daemon    Run the autonomous operations loop
//!   quorum cycle     Run a single cycle and exit
//!   quorum status    Show registry statistics
//!   quorum agents    List registered personas

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use quorum::config::{self, QuorumConfig};
use quorum::daemon::Daemon;
use quorum::memory::ContextMemory;
use quorum::registry::AgentRegistry;
use quorum::store::{RecordStore, RestStore, SqliteStore};
use quorum::types::AgentStatus;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "quorum")]
#[command(version = "0.1.0")]
#[command(about = "Autonomous DAO operations daemon")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the quorum home directory (defaults to ~/.quorum).
    #[arg(long)]
    home: Option<String>,

    /// Log level (debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init,

    /// Run the autonomous operations loop.
    Daemon,

    /// Run a single listen/think/act cycle and exit.
    Cycle,

    /// Show registry statistics.
    Status,

    /// List registered personas.
    Agents,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let home_dir = match &cli.home {
        Some(home) => PathBuf::from(shellexpand::tilde(home).into_owned()),
        None => config::default_home_dir(),
    };

    match cli.command {
        Commands::Init => cmd_init(&home_dir),
        Commands::Daemon => cmd_daemon(&home_dir).await,
        Commands::Cycle => cmd_cycle(&home_dir).await,
        Commands::Status => cmd_status(&home_dir).await,
        Commands::Agents => cmd_agents(&home_dir).await,
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_init(home_dir: &Path) -> Result<()> {
    let config_path = home_dir.join("quorum.toml");
    if config_path.exists() {
        println!(
            "{} Config already exists at {}",
            "!".yellow().bold(),
            config_path.display()
        );
        return Ok(());
    }

    QuorumConfig::default().save(&config_path)?;
    println!(
        "{} Default config written to {}",
        ">>>".green().bold(),
        config_path.display()
    );
    println!("Edit it to add API credentials, then run `quorum daemon`.");
    Ok(())
}

async fn cmd_daemon(home_dir: &Path) -> Result<()> {
    let (cfg, registry, memory) = bootstrap(home_dir).await?;

    println!(
        "{} Starting daemon '{}' (model: {}, interval: {}s)",
        ">>>".green().bold(),
        cfg.name,
        cfg.inference_model,
        cfg.cycle_interval_secs,
    );

    let cancel = CancellationToken::new();
    let daemon_cancel = cancel.clone();
    let mut daemon = Daemon::new(cfg, registry, memory);
    let handle = tokio::spawn(async move {
        if let Err(e) = daemon.run(daemon_cancel).await {
            error!("Daemon loop error: {}", e);
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    println!("\n{} Shutting down gracefully...", "<<<".red().bold());
    cancel.cancel();

    let shutdown_timeout = tokio::time::Duration::from_secs(10);
    let _ = tokio::time::timeout(shutdown_timeout, async {
        if let Err(e) = handle.await {
            warn!("Daemon task join error: {}", e);
        }
    })
    .await;

    info!("Daemon shutdown complete");
    Ok(())
}

async fn cmd_cycle(home_dir: &Path) -> Result<()> {
    let (cfg, registry, memory) = bootstrap(home_dir).await?;

    let mut daemon = Daemon::new(cfg, registry, memory);
    let summary = daemon.run_cycle().await?;

    println!();
    println!("{}", "=== Cycle Complete ===".bold());
    println!("  Personas decided:  {}", summary.personas);
    println!("  Actions executed:  {}", summary.actions);
    println!(
        "  Coordination:      {}",
        if summary.coordinated { "yes" } else { "no" }
    );
    println!();
    Ok(())
}

async fn cmd_status(home_dir: &Path) -> Result<()> {
    let cfg = load_config(home_dir)?;
    let store = build_store(&cfg)?;

    let personas = store
        .load_all_personas()
        .await
        .context("Failed to load personas from the record store")?;
    let active = personas
        .iter()
        .filter(|p| p.status == AgentStatus::Active)
        .count();
    let recent = store
        .query_recent_task_assignments(10)
        .await
        .unwrap_or_default();

    println!();
    println!("{}", "=== Quorum Status ===".bold());
    println!();
    println!("  {}:     {}", "Name".bold(), cfg.name);
    println!("  {}:    {}", "Store".bold(), cfg.store_backend);
    println!("  {}:    {}", "Model".bold(), cfg.inference_model);
    println!();
    println!("  {}:", "Registry".bold());
    println!("    Personas: {} ({} active)", personas.len(), active);
    println!();
    if recent.is_empty() {
        println!("  {}:  none", "Recent activity".bold());
    } else {
        println!("  {}:", "Recent activity".bold());
        for assignment in recent {
            println!(
                "    {}  {} -> {}",
                assignment.assigned_at.format("%Y-%m-%d %H:%M"),
                assignment.task_type,
                assignment.agent_id
            );
        }
    }
    println!();
    Ok(())
}

async fn cmd_agents(home_dir: &Path) -> Result<()> {
    let cfg = load_config(home_dir)?;
    let store = build_store(&cfg)?;

    let mut personas = store
        .load_all_personas()
        .await
        .context("Failed to load personas from the record store")?;
    personas.sort_by(|a, b| a.name.cmp(&b.name));

    if personas.is_empty() {
        println!("No personas registered. The daemon bootstraps a default set on first run.");
        return Ok(());
    }

    println!();
    for persona in personas {
        println!(
            "  {} ({}) [{}]",
            persona.name.bold(),
            persona.role,
            colorize_status(persona.status)
        );
        println!("    Authority: {}/10", persona.authority_level);
        println!("    Expertise: {}", persona.expertise_areas.join(", "));
        println!("    Id:        {}", persona.agent_id.dimmed());
        println!();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(home_dir: &Path) -> Result<QuorumConfig> {
    let config_path = home_dir.join("quorum.toml");
    if !config_path.exists() {
        bail!(
            "no config found at {}. Run `quorum init` first.",
            config_path.display()
        );
    }
    QuorumConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))
}

/// Build the record store named by the config.
fn build_store(cfg: &QuorumConfig) -> Result<Arc<dyn RecordStore>> {
    match cfg.store_backend.as_str() {
        "rest" => {
            if cfg.store_url.is_empty() {
                bail!("store_backend is 'rest' but store_url is empty");
            }
            Ok(Arc::new(RestStore::new(&cfg.store_url, &cfg.store_api_key)))
        }
        "sqlite" => {
            let db_path = cfg.resolved_db_path();
            let store = SqliteStore::open(Path::new(&db_path))
                .with_context(|| format!("Failed to open record store at {}", db_path))?;
            Ok(Arc::new(store))
        }
        other => bail!("unknown store backend: {}", other),
    }
}

/// Load config, build the store and registry, and load the working set.
async fn bootstrap(home_dir: &Path) -> Result<(QuorumConfig, Arc<AgentRegistry>, ContextMemory)> {
    if !home_dir.exists() {
        std::fs::create_dir_all(home_dir).with_context(|| {
            format!("Failed to create home directory: {}", home_dir.display())
        })?;
    }

    let cfg = load_config(home_dir)?;
    let store = build_store(&cfg)?;

    let registry = Arc::new(AgentRegistry::new(store.clone()));
    if !registry.initialize().await {
        bail!("agent registry initialization failed");
    }

    Ok((cfg, registry, ContextMemory::new(store)))
}

fn colorize_status(status: AgentStatus) -> String {
    match status {
        AgentStatus::Active => status.to_string().green().to_string(),
        AgentStatus::Inactive => status.to_string().dimmed().to_string(),
        AgentStatus::Suspended => status.to_string().red().to_string(),
        AgentStatus::Maintenance => status.to_string().yellow().to_string(),
    }
}
