//! Lockstep unified CLI.
//!
//! Remote co-simulation for lockstep-coupled models.
//!
//! # Quick Start
//!
//! ```bash
//! # Start the server
//! lockstep start --address 50051
//!
//! # Drive a simulation run against it (new terminal)
//! lockstep simulate --stop-time 3.0
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Lockstep - remote co-simulation for lockstep-coupled models.
#[derive(Parser)]
#[command(name = "lockstep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Start the Lockstep server.
    Start {
        /// Address to bind to (port only: 3000, or full: 127.0.0.1:3000).
        /// Overrides `server.bind_address` from config.
        #[arg(short, long)]
        address: Option<String>,

        /// Explicit config file; skips project and user config discovery.
        #[arg(short, long)]
        config: Option<String>,

        /// Project directory to search for lockstep.toml.
        #[arg(long)]
        project_dir: Option<String>,
    },

    /// Run a simulation against a server and print sampled state.
    Simulate {
        /// Server address to connect to.
        #[arg(short = 's', long, default_value = "127.0.0.1:50051")]
        server: String,

        /// Simulated seconds to run for.
        #[arg(long, default_value = "1.0", allow_negative_numbers = true)]
        stop_time: f64,

        /// Communication step size in seconds.
        #[arg(long, default_value = "0.1")]
        step_size: f64,

        /// Print one sample every N steps.
        #[arg(long, default_value = "1")]
        sample_every: usize,
    },

    /// Show server connection information.
    Info {
        /// Server address.
        #[arg(short = 's', long, default_value = "127.0.0.1:50051")]
        server: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Start {
            address,
            config,
            project_dir,
        } => commands::start::run(address.as_deref(), config.as_deref(), project_dir.as_deref()),
        Commands::Simulate {
            server,
            stop_time,
            step_size,
            sample_every,
        } => commands::simulate::run(&server, stop_time, step_size, sample_every),
        Commands::Info { server } => commands::info::run(&server),
    }
}
