//! The `ladder` binary: serve the GraphQL gateway, print the schema, or
//! preload sample datasets from the shell.

use std::sync::Arc;

use {
    clap::{Parser, Subcommand},
    ladder_engine::mem::MemEngine,
    ladder_gateway::ServerConfig,
    ladder_graphql::build_schema,
    ladder_ops::TriangleService,
    ladder_store::MemoryStore,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "ladder", about = "Ladder — GraphQL façade for triangle analytics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file path.
    #[arg(long, global = true, env = "LADDER_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Database URL (overrides config value).
    #[arg(long, global = true, env = "LADDER_DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server (default when no subcommand is provided).
    Serve,
    /// Print the GraphQL schema in SDL form.
    Schema,
    /// Load a bundled sample dataset into the store.
    Load {
        /// Dataset name, e.g. `raa`.
        name: String,
    },
}

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn resolve_config(cli: &Cli) -> ladder_gateway::Result<ServerConfig> {
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(bind) = &cli.bind {
        config.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(url) = &cli.database_url {
        config.database_url = url.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match cli.command.as_ref().unwrap_or(&Commands::Serve) {
        Commands::Serve => {
            let config = resolve_config(&cli)?;
            let service = ladder_gateway::build_service(&config).await?;
            ladder_gateway::serve(&config, service).await?;
        },
        Commands::Schema => {
            // SDL generation needs no database; build over throwaway state
            let service = Arc::new(TriangleService::new(
                Arc::new(MemEngine::new()),
                Arc::new(MemoryStore::new()),
            ));
            println!("{}", build_schema(service).sdl());
        },
        Commands::Load { name } => {
            let config = resolve_config(&cli)?;
            let service = ladder_gateway::build_service(&config).await?;
            let artifact = service.load_dataset(name).await?;
            info!(name = %artifact.name, "dataset stored");
            println!("{}", artifact.name);
        },
    }
    Ok(())
}
