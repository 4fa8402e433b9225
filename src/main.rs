//! Atelier server entry point

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use atelier_lib::agent::StubAgent;
use atelier_lib::config::AppConfig;
use atelier_lib::pipeline::InstructionPipeline;
use atelier_lib::registry::ProjectRegistry;
use atelier_lib::server::{self, ServerAppState};
use atelier_lib::workspace::WorkspaceStore;

#[derive(Parser, Debug)]
#[command(
    name = "atelier",
    version,
    about = "HTTP server that scaffolds git-backed project workspaces and applies agent instructions as commits"
)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Root directory under which project workspaces are created
    #[arg(long, env = "ATELIER_PROJECTS_ROOT")]
    projects_root: Option<PathBuf>,

    /// Location of the project registry database
    #[arg(long, env = "ATELIER_DB_PATH")]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = AppConfig::new(
        args.projects_root
            .unwrap_or_else(AppConfig::default_projects_root),
        args.db_path.unwrap_or_else(AppConfig::default_db_path),
    );
    config
        .ensure_dirs()
        .context("Failed to create data directories")?;

    log::info!("Projects root: {}", config.projects_root.display());
    log::info!("Registry: {}", config.db_path.display());

    let registry = Arc::new(
        ProjectRegistry::open(&config.db_path).context("Failed to open project registry")?,
    );
    let workspace = WorkspaceStore::new(config.projects_root.clone());
    let pipeline = Arc::new(InstructionPipeline::new(
        workspace,
        registry,
        Box::new(StubAgent),
    ));
    let state = ServerAppState::new(pipeline);

    server::run_server(args.port, &args.bind, state)
        .await
        .map_err(anyhow::Error::msg)
}
