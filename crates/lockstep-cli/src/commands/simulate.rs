//! Simulate command - drives a full run against a server.

use anyhow::{Context, Result, bail};
use lockstep_client::{Client, ClientConfig};
use lockstep_types::ValueReference;

/// References sampled each output row: time, height, velocity.
const SAMPLED: [u32; 3] = [0, 1, 2];

pub fn run(server: &str, stop_time: f64, step_size: f64, sample_every: usize) -> Result<()> {
    super::init_logging("info");

    if !step_size.is_finite() || step_size <= 0.0 {
        bail!("step size must be positive and finite, got {step_size}");
    }
    if !stop_time.is_finite() || stop_time < 0.0 {
        bail!("stop time must be non-negative and finite, got {stop_time}");
    }

    let mut client = Client::connect(server, ClientConfig::default())
        .with_context(|| format!("Failed to connect to {server}"))?;

    let handle = client.instantiate().context("Failed to instantiate")?;
    client
        .enter_initialization_mode(handle, None, 0.0, Some(stop_time))
        .context("Failed to enter initialization mode")?;
    client
        .exit_initialization_mode(handle)
        .context("Failed to exit initialization mode")?;

    println!("Simulating to t={stop_time} s in steps of {step_size} s");
    println!();
    println!("{:>10}  {:>12}  {:>12}", "time", "height", "velocity");

    let references: Vec<ValueReference> =
        SAMPLED.iter().copied().map(ValueReference::new).collect();

    let mut time = 0.0;
    let mut steps = 0_usize;
    while time < stop_time {
        client
            .do_step(handle, time, step_size)
            .with_context(|| format!("doStep failed at t={time}"))?;
        time += step_size;
        steps += 1;

        if steps % sample_every.max(1) == 0 {
            let values = client.get_float64(handle, &references)?;
            println!(
                "{:>10.3}  {:>12.6}  {:>12.6}",
                values[0], values[1], values[2]
            );
        }
    }

    let finals = client.get_float64(handle, &references)?;
    client.terminate(handle).context("Failed to terminate")?;
    client
        .free_instance(handle)
        .context("Failed to free instance")?;

    println!();
    println!("Completed {steps} steps");
    println!("  Final time:     {:.3} s", finals[0]);
    println!("  Final height:   {:.6} m", finals[1]);
    println!("  Final velocity: {:.6} m/s", finals[2]);

    Ok(())
}
