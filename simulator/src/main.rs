use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use workflow::config::SimulationConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Inject drifting, dispersed pulses and realign them")]
struct Args {
    /// Load a simulation config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 32)]
    nsubint: usize,
    #[arg(long, default_value_t = 32)]
    nchan: usize,
    #[arg(long, default_value_t = 64)]
    nbin: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write the JSON report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = args.config {
        SimulationConfig::load(path)?
    } else {
        SimulationConfig::from_args(args.nsubint, args.nchan, args.nbin, args.seed)
    };

    let report = Runner::new(config).execute()?;
    let json = serde_json::to_string_pretty(&report).context("serializing report")?;

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, json)
                .with_context(|| format!("writing report {}", path.display()))?;
            log::info!("report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
