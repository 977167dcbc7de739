mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    device::DeviceSubcommand, payment::PaymentSubcommand, ticket::TicketSubcommand,
    timing::TimingSubcommand, user::UserSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "unlockhub",
    about = "Device unlocking storefront — catalog, credits, payments, and staged unlock runs",
    version,
    propagate_version = true
)]
struct Cli {
    /// Store root (default: auto-detect from .unlockhub/ or .git/)
    #[arg(long, global = true, env = "UNLOCKHUB_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a store in the current directory
    Init {
        /// Store name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Manage the device catalog
    Device {
        #[command(subcommand)]
        subcommand: DeviceSubcommand,
    },

    /// Register a customer device against a catalog entry (deducts credits)
    Register {
        /// IMEI (15 digits) or serial number (8-20 alphanumeric)
        identifier: String,
        /// Owning user id
        #[arg(long)]
        user: String,
        /// Catalog slug
        #[arg(long)]
        device: String,
    },

    /// Manage user accounts and credits
    User {
        #[command(subcommand)]
        subcommand: UserSubcommand,
    },

    /// Manage manual payment requests
    Payment {
        #[command(subcommand)]
        subcommand: PaymentSubcommand,
    },

    /// Manage support tickets
    Ticket {
        #[command(subcommand)]
        subcommand: TicketSubcommand,
    },

    /// Inspect and edit the timing configuration
    Timing {
        #[command(subcommand)]
        subcommand: TimingSubcommand,
    },

    /// Drive a full run locally and print each step as it fires
    Simulate {
        /// Process type: unlock | blacklist
        #[arg(long, default_value = "unlock")]
        process: String,

        /// Divide every delay by this factor (1 = real time)
        #[arg(long, default_value = "1000")]
        speedup: u64,
    },

    /// Run the storefront API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Divide run delays by this factor (1 = real time)
        #[arg(long, default_value = "1")]
        speedup: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref()),
        Commands::Device { subcommand } => cmd::device::run(&root, subcommand, cli.json),
        Commands::Register {
            identifier,
            user,
            device,
        } => cmd::device::register(&root, &identifier, &user, &device, cli.json),
        Commands::User { subcommand } => cmd::user::run(&root, subcommand, cli.json),
        Commands::Payment { subcommand } => cmd::payment::run(&root, subcommand, cli.json),
        Commands::Ticket { subcommand } => cmd::ticket::run(&root, subcommand, cli.json),
        Commands::Timing { subcommand } => cmd::timing::run(&root, subcommand, cli.json),
        Commands::Simulate { process, speedup } => {
            cmd::simulate::run(&root, &process, speedup, cli.json)
        }
        Commands::Serve { port, speedup } => cmd::serve::run(&root, port, speedup),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
