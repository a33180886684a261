//! Start command - runs the Lockstep server.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use lockstep_config::LockstepConfig;
use lockstep_kernel::{Simulator, StepPolicy};
use lockstep_model::{BouncingBall, Model};
use lockstep_server::{Server, ServerConfig};
use tracing::info;

fn bouncing_ball() -> Box<dyn Model> {
    Box::new(BouncingBall::default())
}

pub fn run(address: Option<&str>, config: Option<&str>, project_dir: Option<&str>) -> Result<()> {
    // Load configuration
    let cfg = match (config, project_dir) {
        (Some(path), _) => LockstepConfig::from_toml_path(path)
            .with_context(|| format!("Failed to load config file '{path}'"))?,
        (None, Some(dir)) => {
            LockstepConfig::load_from_dir(dir).context("Failed to load configuration")?
        }
        (None, None) => LockstepConfig::load().context("Failed to load configuration")?,
    };
    cfg.validate().context("Invalid configuration")?;

    super::init_logging(&cfg.log.filter);

    // The address flag wins over the configured bind address
    let bind_addr: SocketAddr = match address {
        Some(raw) => parse_address(raw)?,
        None => cfg.bind_addr()?,
    };

    let step_policy = cfg
        .simulation
        .fixed_step_size
        .map_or(StepPolicy::CallerSupplied, StepPolicy::Fixed);

    info!("Starting Lockstep server...");
    println!();
    println!("Lockstep - remote co-simulation server");
    println!();
    println!("  Bind address: {bind_addr}");
    match step_policy {
        StepPolicy::CallerSupplied => println!("  Step policy:  caller-supplied"),
        StepPolicy::Fixed(dt) => println!("  Step policy:  fixed ({dt} s)"),
    }

    let server_config = ServerConfig::new(bind_addr)
        .with_max_connections(cfg.server.max_connections as usize)
        .with_read_buffer_size(cfg.server.read_buffer_size)
        .with_write_buffer_size(cfg.server.write_buffer_size)
        .with_idle_timeout(cfg.server.idle_timeout_secs.map(Duration::from_secs));

    let simulator = Simulator::new(bouncing_ball).with_step_policy(step_policy);
    let server = Server::new(server_config, simulator).context("Failed to create server")?;

    register_signal_handlers(&server)?;

    println!();
    println!("Server is ready. Press Ctrl+C to stop.");
    println!();

    server.run().context("Server error during operation")?;

    println!();
    println!("Server stopped gracefully.");

    Ok(())
}

/// Stops the server on SIGINT or SIGTERM.
#[cfg(unix)]
fn register_signal_handlers(server: &Server) -> Result<()> {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&term))
        .context("Failed to register SIGINT handler")?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&term))
        .context("Failed to register SIGTERM handler")?;

    let shutdown = server.shutdown_handle();
    std::thread::spawn(move || {
        while !term.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(50));
        }
        info!("shutdown signal received");
        shutdown.shutdown();
    });

    Ok(())
}

#[cfg(not(unix))]
fn register_signal_handlers(_server: &Server) -> Result<()> {
    Ok(())
}

/// Parses an address string into a `SocketAddr`.
///
/// Accepts:
/// - Port only: "3000" -> "127.0.0.1:3000"
/// - Full address: "127.0.0.1:3000"
/// - IPv6: `[::1]:3000`
fn parse_address(address: &str) -> Result<SocketAddr> {
    // Try parsing as a full address first
    if let Ok(addr) = address.parse::<SocketAddr>() {
        return Ok(addr);
    }

    // Try parsing as just a port
    if let Ok(port) = address.parse::<u16>() {
        return Ok(SocketAddr::from(([127, 0, 0, 1], port)));
    }

    bail!(
        "Invalid address '{address}'. Use a port (e.g., '3000') or full address (e.g., '127.0.0.1:3000')"
    );
}
