use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;

use ksp_transfer_planner::config::PlannerConfig;
use ksp_transfer_planner::file::read_bodies;
use ksp_transfer_planner::orrery::{BodyID, Orrery};
use ksp_transfer_planner::transfer::{evaluate, TransferRequest};

const DEFAULT_BODIES: &str = "ksp-bodies.txt";

/// Plans a single interplanetary transfer.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Body catalogue, overriding the one named in the config
    #[arg(long)]
    bodies: Option<PathBuf>,
    /// Departure time, in seconds of universal time
    #[arg(long, default_value_t = 0.0)]
    depart: f64,
    /// Travel time, in seconds
    #[arg(long)]
    travel: f64,
    origin: String,
    destination: String,
}

fn find(orrery: &Orrery, name: &str) -> anyhow::Result<BodyID> {
    orrery
        .find_by_name(name)
        .ok_or_else(|| anyhow!("no body named {:?} in the catalogue", name))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = PlannerConfig::load_or_default(args.config.as_deref())?;
    let calendar = config.calendar()?;
    let bodies_path = args
        .bodies
        .or_else(|| config.bodies.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BODIES));
    let orrery = read_bodies(&bodies_path)
        .with_context(|| format!("loading bodies from {}", bodies_path.display()))?;

    let origin = orrery.orbiting_body(find(&orrery, &args.origin)?)?;
    let destination = orrery.orbiting_body(find(&orrery, &args.destination)?)?;

    let request = TransferRequest {
        origin,
        destination,
        departure_time: args.depart,
        travel_time: args.travel,
    };
    let details = evaluate(&request, &config.transfer_options())?;

    print!("{}", details.report(&calendar));
    Ok(())
}
