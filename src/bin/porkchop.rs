use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use plotters::prelude::*;

use ksp_transfer_planner::calendar::{Calendar, DateFormat, DateTime};
use ksp_transfer_planner::config::PlannerConfig;
use ksp_transfer_planner::file::read_bodies;
use ksp_transfer_planner::math::intervals::Interval;
use ksp_transfer_planner::transfer::porkchop::{sweep, Porkchop, SweepWindow};

/// Sweeps departure and travel times between two bodies, prints the
/// cheapest transfer and renders the total delta-v as a heatmap.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    bodies: Option<PathBuf>,
    /// Earliest departure, in seconds of universal time
    #[arg(long, default_value_t = 0.0)]
    earliest: f64,
    /// Latest departure; defaults to one synodic period after the earliest
    #[arg(long)]
    latest: Option<f64>,
    /// Shortest travel time to try, in seconds
    #[arg(long)]
    min_travel: Option<f64>,
    /// Longest travel time to try, in seconds
    #[arg(long)]
    max_travel: Option<f64>,
    /// Samples along each axis; defaults to the configured resolution
    #[arg(long)]
    resolution: Option<usize>,
    #[arg(long, default_value = "plots/porkchop.png")]
    output: PathBuf,
    #[arg(long, default_value_t = 1000)]
    width: u32,
    #[arg(long, default_value_t = 800)]
    height: u32,
    /// Cells costing more than this multiple of the cheapest share one colour
    #[arg(long, default_value_t = 4.0)]
    high_clip_factor: f64,
    origin: String,
    destination: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = PlannerConfig::load_or_default(args.config.as_deref())?;
    let calendar = config.calendar()?;
    let bodies_path = args
        .bodies
        .clone()
        .or_else(|| config.bodies.clone())
        .unwrap_or_else(|| PathBuf::from("ksp-bodies.txt"));
    let orrery = read_bodies(&bodies_path)
        .with_context(|| format!("loading bodies from {}", bodies_path.display()))?;

    let find = |name: &str| {
        orrery
            .find_by_name(name)
            .ok_or_else(|| anyhow!("no body named {:?} in the catalogue", name))
    };
    let origin = orrery.orbiting_body(find(&args.origin)?)?;
    let destination = orrery.orbiting_body(find(&args.destination)?)?;

    let resolution = args
        .resolution
        .unwrap_or(config.solver.sweep_resolution)
        .max(2);
    let suggested = SweepWindow::suggested(&origin, &destination, args.earliest, resolution)
        .ok_or_else(|| anyhow!("both bodies need closed orbits to suggest a window"))?;
    let window = SweepWindow {
        departure: Interval::new(
            args.earliest,
            args.latest.unwrap_or(suggested.departure.hi()),
        ),
        travel: Interval::new(
            args.min_travel.unwrap_or(suggested.travel.lo()),
            args.max_travel.unwrap_or(suggested.travel.hi()),
        ),
        resolution,
    };
    log::info!(
        "Sweeping departures {} and travel times {} at {}x{}",
        window.departure,
        window.travel,
        resolution,
        resolution
    );

    let porkchop = sweep(&origin, &destination, &window, &config.transfer_options());
    let best = porkchop
        .best
        .as_ref()
        .ok_or_else(|| anyhow!("no transfer found anywhere in the window"))?;
    if porkchop.num_failed() > 0 {
        log::warn!("{} cells had no transfer", porkchop.num_failed());
    }

    print!("{}", best.report(&calendar));

    draw_porkchop(&args, &calendar, &porkchop)?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn draw_porkchop<B>(
    args: &Args,
    calendar: &Calendar,
    porkchop: &Porkchop<B>,
) -> anyhow::Result<()> {
    let (min_dv, max_dv) = porkchop
        .dv_range()
        .ok_or_else(|| anyhow!("nothing to plot"))?;
    let mut high_clip = (min_dv * args.high_clip_factor).min(max_dv);
    if !(high_clip > min_dv) {
        high_clip = max_dv.max(min_dv * 1.001);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    // Both axes in days from the start of their range
    let day = calendar.day_length();
    let depart_start = porkchop.departures.first().copied().unwrap_or_default();
    let travel_start = porkchop.travel_times.first().copied().unwrap_or_default();
    let dep_coords: Vec<f64> = porkchop
        .departures
        .iter()
        .map(|t| (t - depart_start) / day)
        .collect();
    let travel_coords: Vec<f64> = porkchop
        .travel_times
        .iter()
        .map(|t| (t - travel_start) / day)
        .collect();
    let x_max = dep_coords.last().copied().unwrap_or_default().max(1.0);
    let y_max = travel_coords.last().copied().unwrap_or_default().max(1.0);

    let root = BitMapBackend::new(&args.output, (args.width, args.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(
            format!("{} -> {} total Δv", args.origin, args.destination),
            ("sans-serif", 24),
        )
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Departure")
        .y_desc("Travel time (days)")
        .x_labels(6)
        .y_labels(6)
        .x_label_formatter(&|d| {
            DateTime::from_ut(depart_start + d * day, *calendar)
                .display(DateFormat::Date)
                .to_string()
        })
        .y_label_formatter(&|d| format!("{:.0}", travel_start / day + d))
        .draw()?;

    for (dep_idx, row) in porkchop.cells.iter().enumerate() {
        let (x0, x1) = cell_bounds(&dep_coords, dep_idx);
        for (travel_idx, cell) in row.iter().enumerate() {
            let dv = match cell {
                Some(dv) => *dv,
                None => continue,
            };
            let (y0, y1) = cell_bounds(&travel_coords, travel_idx);
            let t = (dv.clamp(min_dv, high_clip) - min_dv) / (high_clip - min_dv);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x0, y0), (x1, y1)],
                jet_color(t).filled(),
            )))?;
        }
    }

    // Mark the cheapest cell
    let best_cell = porkchop.cells.iter().enumerate().find_map(|(i, row)| {
        row.iter()
            .position(|cell| *cell == Some(min_dv))
            .map(|j| (dep_coords[i], travel_coords[j]))
    });
    if let Some((x, y)) = best_cell {
        let marker_color = BLACK;
        let (dx, dy) = (0.02 * x_max, 0.02 * y_max);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x - dx, y), (x + dx, y)],
            ShapeStyle::from(&marker_color).stroke_width(3),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, y - dy), (x, y + dy)],
            ShapeStyle::from(&marker_color).stroke_width(3),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{:.0} m/s", min_dv),
            (x + dx, y + dy),
            ("sans-serif", 16).into_font().color(&marker_color),
        )))?;
    }

    root.present()?;
    Ok(())
}

fn jet_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    fn comp(v: f64) -> f64 {
        (1.0 - (v - 1.0).abs()).clamp(0.0, 1.0)
    }
    let r = comp(1.5 - 4.0 * (t - 0.75).abs());
    let g = comp(1.5 - 4.0 * (t - 0.5).abs());
    let b = comp(1.5 - 4.0 * (t - 0.25).abs());
    RGBColor((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

// Edges of cell `idx`, halfway to its neighbours
fn cell_bounds(coords: &[f64], idx: usize) -> (f64, f64) {
    let center = coords[idx];
    let prev = idx.checked_sub(1).and_then(|i| coords.get(i)).copied();
    let next = coords.get(idx + 1).copied();

    let left = match (prev, next) {
        (Some(prev), _) => 0.5 * (prev + center),
        (None, Some(next)) => center - 0.5 * (next - center),
        (None, None) => center - 0.5,
    };
    let right = match (prev, next) {
        (_, Some(next)) => 0.5 * (center + next),
        (Some(prev), None) => center + 0.5 * (center - prev),
        (None, None) => center + 0.5,
    };
    (left, right)
}
