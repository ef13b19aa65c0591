//! OpticNet simulator
//!
//! Usage: `opticnet-sim [config.json]`
//!
//! Runs the configured traffic (defaults when no file is given) and prints a
//! JSON summary on stdout.

use opticnet_sim::{Simulation, SimulationConfig};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opticnet_sim=info,opticnet_controller=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };

    tracing::info!(
        num_nodes = config.num_nodes,
        max_rounds = config.max_rounds,
        "starting simulation"
    );

    let result = Simulation::new(config)?.run()?;
    if result.undelivered > 0 {
        tracing::warn!(undelivered = result.undelivered, "round limit reached");
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
