use std::{path::PathBuf, sync::Arc};

use {
    agentdesk_config::DeskConfig,
    agentdesk_discovery::{WorkspaceScanner, apply_name_overrides},
    agentdesk_skills::SkillScanner,
    agentdesk_store::{AgentStore, Reconciler, SkillStore, SqliteAgentStore, SqliteSkillStore},
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "agentdesk", about = "Agentdesk — agent workspace dashboard engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Custom data directory (overrides the platform default).
    #[arg(long, global = true, env = "AGENTDESK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Database URL (overrides config value).
    #[arg(long, global = true, env = "AGENTDESK_DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the workspace root and reconcile agents into the database.
    Sync,
    /// Agent record management.
    Agents {
        #[command(subcommand)]
        action: AgentAction,
    },
    /// Skill catalog management.
    Skills {
        #[command(subcommand)]
        action: SkillAction,
    },
}

#[derive(Subcommand)]
enum AgentAction {
    /// List reconciled agents.
    List,
}

#[derive(Subcommand)]
enum SkillAction {
    /// Rescan catalog roots and replace the stored catalog.
    Refresh,
    /// List the stored skill catalog.
    List,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn open_pool(cli: &Cli, config: &DeskConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| config.database.resolved_url());
    // The default URL points into the data dir; make sure it exists before
    // sqlite tries to create the file.
    std::fs::create_dir_all(agentdesk_config::data_dir())?;
    let pool = sqlx::SqlitePool::connect(&url).await?;
    agentdesk_store::init(&pool).await?;
    Ok(pool)
}

/// Catalog roots: configured roots win; otherwise the shared skills dir plus
/// every agent workspace's local skills folder.
fn catalog_roots(config: &DeskConfig) -> Vec<PathBuf> {
    if config.skills.roots.is_empty() {
        SkillScanner::default_roots(&config.workspace.resolved_root())
    } else {
        config.skills.roots.clone()
    }
}

async fn handle_sync(pool: sqlx::SqlitePool, config: &DeskConfig) -> anyhow::Result<()> {
    let root = config.workspace.resolved_root();
    let mut agents = WorkspaceScanner::new(root.clone()).discover();
    apply_name_overrides(&mut agents, &config.agents.overrides);

    let reconciler = Reconciler::new(
        Arc::new(SqliteAgentStore::new(pool.clone())),
        Arc::new(SqliteSkillStore::new(pool)),
    );
    let summary = reconciler.reconcile(&agents).await;

    info!(root = %root.display(), detected = agents.len(), "sync complete");
    println!(
        "detected {} agents: {} created, {} updated, {} skills synced",
        agents.len(),
        summary.created,
        summary.updated,
        summary.skills_synced
    );
    Ok(())
}

async fn handle_agents_list(pool: sqlx::SqlitePool) -> anyhow::Result<()> {
    let store = SqliteAgentStore::new(pool);
    let agents = store.list().await?;
    if agents.is_empty() {
        println!("no agents reconciled yet — run `agentdesk sync`");
        return Ok(());
    }
    for agent in agents {
        println!(
            "{:<20} {:<20} {:<24} {}",
            agent.external_id, agent.name, agent.title, agent.status
        );
    }
    Ok(())
}

async fn handle_skills_refresh(pool: sqlx::SqlitePool, config: &DeskConfig) -> anyhow::Result<()> {
    let skills = SkillScanner::new(catalog_roots(config)).scan_all();
    let store = SqliteSkillStore::new(pool);
    let count = store.replace_all(&skills).await?;
    println!("catalog refreshed: {count} skills");
    Ok(())
}

async fn handle_skills_list(pool: sqlx::SqlitePool) -> anyhow::Result<()> {
    let store = SqliteSkillStore::new(pool);
    let skills = store.list().await?;
    if skills.is_empty() {
        println!("skill catalog is empty — run `agentdesk skills refresh`");
        return Ok(());
    }
    for skill in skills {
        println!("{:<24} {:<10} {}", skill.slug, skill.version, skill.description);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    if let Some(ref dir) = cli.data_dir {
        agentdesk_config::set_data_dir(dir.clone());
    }
    let config = agentdesk_config::discover_and_load();
    let pool = open_pool(&cli, &config).await?;

    match cli.command {
        Commands::Sync => handle_sync(pool, &config).await,
        Commands::Agents {
            action: AgentAction::List,
        } => handle_agents_list(pool).await,
        Commands::Skills { action } => match action {
            SkillAction::Refresh => handle_skills_refresh(pool, &config).await,
            SkillAction::List => handle_skills_list(pool).await,
        },
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_sync() {
        let cli = Cli::try_parse_from(["agentdesk", "sync"]).unwrap();
        assert!(matches!(cli.command, Commands::Sync));
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn cli_parses_skills_refresh_with_globals() {
        let cli = Cli::try_parse_from([
            "agentdesk",
            "skills",
            "refresh",
            "--log-level",
            "debug",
            "--data-dir",
            "/tmp/desk",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Skills {
                action: SkillAction::Refresh
            }
        ));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/desk")));
    }

    #[test]
    fn configured_catalog_roots_win_over_defaults() {
        let mut config = DeskConfig::default();
        config.skills.roots = vec![PathBuf::from("/opt/skills")];
        assert_eq!(catalog_roots(&config), vec![PathBuf::from("/opt/skills")]);
    }
}
