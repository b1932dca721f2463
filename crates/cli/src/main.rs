use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "agora", about = "Community identity sync service", version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "agora.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Initialize the Agora data directory and configuration
    Init {
        /// Data directory path
        #[arg(long, default_value = "/var/lib/agora")]
        data_dir: String,
    },
    /// Run a full sync from the configured identity provider
    Sync,
    /// Show sync status and statistics
    Status,
    /// Start the admin gateway
    Serve {
        /// Port to listen on (overrides the configured port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Mint an admin API token
    Token {
        /// External id of the profile the token acts as
        #[arg(long)]
        external_id: String,
        /// Days until the token expires (omit for a non-expiring token)
        #[arg(long)]
        expires_days: Option<i64>,
    },
    /// Change a profile's role out of band
    Promote {
        /// External id of the profile to change
        #[arg(long)]
        external_id: String,
        /// New role: user, moderator, or admin
        #[arg(long)]
        role: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => {
            commands::init::run(&data_dir).await?;
        }
        Commands::Sync => {
            commands::sync::run(&cli.config).await?;
        }
        Commands::Status => {
            commands::status::run(&cli.config).await?;
        }
        Commands::Serve { port } => {
            commands::serve::run(&cli.config, port).await?;
        }
        Commands::Token {
            external_id,
            expires_days,
        } => {
            commands::token::run(&cli.config, &external_id, expires_days).await?;
        }
        Commands::Promote { external_id, role } => {
            commands::promote::run(&cli.config, &external_id, &role).await?;
        }
    }

    Ok(())
}
