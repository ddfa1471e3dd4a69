mod commands;
mod context;
mod utils;

use clap::{Parser, Subcommand};
use colored::Colorize;
use context::Console;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dockhand")]
#[command(about = "Run a docker-machine fleet from one console", long_about = None)]
struct Cli {
    /// Show debug logs (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List machines with uptime, load and disk usage
    Machines {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Skip the per-machine ssh round trips
        #[arg(long)]
        no_stats: bool,
    },
    /// Create a new machine
    Create {
        /// Machine name (3-20 lowercase letters, digits and hyphens)
        name: String,
        /// Cloud provider (digitalocean, scaleway)
        #[arg(short, long, required_unless_present = "existing")]
        provider: Option<String>,
        /// Provider region code
        #[arg(long)]
        region: Option<String>,
        /// Provider size code
        #[arg(long)]
        size: Option<String>,
        /// Provider image code
        #[arg(long)]
        image: Option<String>,
        /// Register an existing machine instead of creating one
        #[arg(long, conflicts_with_all = ["provider", "region", "size", "image"])]
        existing: bool,
    },
    /// Bootstrap a machine: ssh keys, swap, updates, packages, registry login, volumes
    Init {
        /// Machine name
        machine: String,
        /// Run a single step (ssh-keys, swap, auto-updates, packages, registry-auth, volumes)
        #[arg(long)]
        step: Option<String>,
    },
    /// Build and push private images (all when omitted)
    Images {
        /// Image name without the registry prefix
        image: Option<String>,
    },
    /// Pull and recreate containers on a machine
    Launch {
        /// Machine name
        machine: String,
        /// Service to recreate (whole stack when omitted)
        service: Option<String>,
    },
    /// Synchronize volumes: master → <machine> or <machine> → local
    Volumes {
        /// Source: master or a machine
        src: String,
        /// Destination: a machine or local
        dst: String,
        /// Volume name (all when omitted)
        volume: Option<String>,
    },
    /// Load database dumps from master onto a machine
    Databases {
        /// Destination machine
        machine: String,
        /// Database name (all when omitted)
        database: Option<String>,
    },
    /// Destroy a machine
    Destroy {
        /// Machine name
        machine: String,
        /// Confirm destruction
        #[arg(short, long)]
        yes: bool,
    },
    /// List providers with configured credentials
    Drivers,
    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command).await {
        eprintln!("{} {}", "Error:".red().bold(), utils::error_message(&e));
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    // version needs no settings
    if matches!(command, Commands::Version) {
        println!("dockhand {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let console = Console::load()?;

    match command {
        Commands::Machines { json, no_stats } => {
            commands::machines::handle(&console, json, !no_stats).await?;
        }
        Commands::Create {
            name,
            provider,
            region,
            size,
            image,
            existing,
        } => {
            if existing {
                commands::create::handle_existing(&console, &name).await?;
            } else {
                commands::create::handle(&console, &name, provider.as_deref(), region, size, image)
                    .await?;
            }
        }
        Commands::Init { machine, step } => {
            commands::init::handle(&console, &machine, step.as_deref()).await?;
        }
        Commands::Images { image } => {
            commands::images::handle(&console, image.as_deref()).await?;
        }
        Commands::Launch { machine, service } => {
            commands::launch::handle(&console, &machine, service.as_deref()).await?;
        }
        Commands::Volumes { src, dst, volume } => {
            commands::volumes::handle(&console, &src, &dst, volume.as_deref()).await?;
        }
        Commands::Databases { machine, database } => {
            commands::databases::handle(&console, &machine, database.as_deref()).await?;
        }
        Commands::Destroy { machine, yes } => {
            commands::destroy::handle(&console, &machine, yes).await?;
        }
        Commands::Drivers => {
            commands::drivers::handle(&console);
        }
        Commands::Version => {
            unreachable!("Version is handled before settings are loaded");
        }
    }

    Ok(())
}
