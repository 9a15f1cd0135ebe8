use std::path::PathBuf;

use clap::Parser;

use ksp_transfer_planner::astro::PointMass;
use ksp_transfer_planner::config::PlannerConfig;
use ksp_transfer_planner::file::read_bodies;

/// Lists the bodies in a catalogue, with their orbital characteristics.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    bodies: Option<PathBuf>,
    /// Only show this body
    name: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = PlannerConfig::load_or_default(args.config.as_deref())?;
    let bodies_path = args
        .bodies
        .or(config.bodies)
        .unwrap_or_else(|| PathBuf::from("ksp-bodies.txt"));
    let orrery = read_bodies(bodies_path)?;

    for body in orrery.bodies() {
        if let Some(name) = &args.name {
            if !body.info.name.eq_ignore_ascii_case(name) {
                continue;
            }
        }

        let orbit = match body.orbit() {
            None => {
                println!("{} (fixed, radius {} m)", body.info.name, body.info.radius);
                println!();
                continue;
            }
            Some(orbit) => orbit
                .orbit()
                .with_secondary(PointMass::with_mu(body.info.mu)),
        };

        // Order is the same as on the KSP wiki for ease of sanity-checking
        println!("Orbital characteristics for {}", body.info.name);
        println!("- Semi-major axis: {}", orbit.semimajor_axis());
        println!("- Apoapsis: {:?}", orbit.apoapsis());
        println!("- Periapsis: {}", orbit.periapsis());
        println!("- Orbital eccentricity: {}", orbit.eccentricity());
        println!(
            "- Orbital inclination: {}",
            orbit.inclination().to_degrees()
        );
        println!(
            "- Argument of periapsis: {}",
            orbit.arg_periapse().to_degrees()
        );
        println!("- LAN: {}", orbit.long_asc_node().to_degrees());
        println!("- Sidereal orbital period: {:?}", orbit.period());
        println!(
            "- Minimum orbital velocity: {:?}",
            orbit.apoapsis_velocity()
        );
        println!("- Maximum orbital velocity: {}", orbit.periapsis_velocity());
        println!("- SOI Radius: {:?}", orrery.get_soi_radius(body.id));
        println!();
    }

    Ok(())
}
