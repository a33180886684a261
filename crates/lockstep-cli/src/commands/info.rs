//! Info command - show server connection information.

use anyhow::{Context, Result};
use lockstep_client::{Client, ClientConfig};

pub fn run(server: &str) -> Result<()> {
    super::init_logging("info");

    let _client = Client::connect(server, ClientConfig::default())
        .with_context(|| format!("Failed to connect to {server}"))?;

    println!("Connection Information");
    println!("----------------------");
    println!("Server: {server}");
    println!("Status: Connected");

    Ok(())
}
