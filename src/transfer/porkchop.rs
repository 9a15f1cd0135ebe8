use std::f64::consts::PI;

use super::{evaluate, TransferDetails, TransferOptions, TransferRequest};
use crate::math::intervals::Interval;
use crate::orrery::OrbitState;

/// The grid of (departure time, travel time) pairs to try.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepWindow {
    pub departure: Interval,
    pub travel: Interval,
    /// Samples along each axis
    pub resolution: usize,
}

impl SweepWindow {
    /// One synodic period of departures starting at `earliest`, with travel
    /// times between half and one and a half times the Hohmann transfer
    /// time. `None` for bodies without a closed orbit.
    pub fn suggested(
        origin: &impl OrbitState,
        destination: &impl OrbitState,
        earliest: f64,
        resolution: usize,
    ) -> Option<Self> {
        let origin_period = origin.period()?;
        let destination_period = destination.period()?;

        let frequency_gap = (1.0 / origin_period - 1.0 / destination_period).abs();
        let synodic_period = if frequency_gap > 0.0 {
            1.0 / frequency_gap
        } else {
            origin_period
        };

        let hohmann = hohmann_time(
            origin.primary_mu(),
            origin.semimajor_axis(),
            destination.semimajor_axis(),
        );

        Some(Self {
            departure: Interval::new(earliest, earliest + synodic_period),
            travel: Interval::new(0.5 * hohmann, 1.5 * hohmann),
            resolution,
        })
    }
}

/// Half the period of the ellipse touching both orbits.
pub fn hohmann_time(mu: f64, r1: f64, r2: f64) -> f64 {
    let a = (r1 + r2) / 2.0;
    PI * (a.powi(3) / mu).sqrt()
}

#[derive(Debug, Clone)]
pub struct Porkchop<B> {
    pub departures: Vec<f64>,
    pub travel_times: Vec<f64>,
    /// Total delta-v, indexed `[departure][travel]`; `None` where no
    /// transfer could be found.
    pub cells: Vec<Vec<Option<f64>>>,
    pub best: Option<TransferDetails<B>>,
}

impl<B> Porkchop<B> {
    /// Smallest and largest total delta-v over the cells that solved.
    pub fn dv_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .fold(None, |range, &dv| match range {
                None => Some((dv, dv)),
                Some((lo, hi)) => Some((f64::min(lo, dv), f64::max(hi, dv))),
            })
    }

    pub fn num_failed(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_none()).count()
    }
}

/// Evaluates every pair in `window`, keeping the cheapest transfer.
///
/// Cells are independent, so nothing stops a caller from splitting the
/// window and sweeping the pieces on separate threads.
pub fn sweep<B: OrbitState + Clone>(
    origin: &B,
    destination: &B,
    window: &SweepWindow,
    options: &TransferOptions,
) -> Porkchop<B> {
    let departures: Vec<f64> = window.departure.samples(window.resolution).collect();
    let travel_times: Vec<f64> = window.travel.samples(window.resolution).collect();

    let mut best: Option<TransferDetails<B>> = None;
    let mut cells = Vec::with_capacity(departures.len());
    for &departure_time in &departures {
        let mut row = Vec::with_capacity(travel_times.len());
        for &travel_time in &travel_times {
            let request = TransferRequest {
                origin: origin.clone(),
                destination: destination.clone(),
                departure_time,
                travel_time,
            };

            let cell = match evaluate(&request, options) {
                Ok(details) => {
                    let dv = details.dv_total();
                    if best.as_ref().map_or(true, |b| dv < b.dv_total()) {
                        best = Some(details);
                    }
                    Some(dv)
                }
                Err(err) => {
                    log::trace!(
                        "Skipping departure {} / travel {}: {}",
                        departure_time,
                        travel_time,
                        err
                    );
                    None
                }
            };
            row.push(cell);
        }
        cells.push(row);
    }

    if let Some(best) = &best {
        log::debug!(
            "Cheapest transfer: depart {}, travel {}, {:.0} m/s",
            best.departure_time(),
            best.travel_time(),
            best.dv_total()
        );
    }

    Porkchop {
        departures,
        travel_times,
        cells,
        best,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_hohmann_time() {
        // LEO to GEO is a bit over five hours
        let t = hohmann_time(3.986e14, 7.0e6, 42_164e3);
        assert_relative_eq!(t, 19_178.16, epsilon = 0.5);
    }

    #[test]
    fn test_dv_range() {
        let porkchop: Porkchop<()> = Porkchop {
            departures: vec![0.0, 1.0],
            travel_times: vec![5.0, 6.0],
            cells: vec![vec![Some(3.0), None], vec![Some(1.5), Some(7.0)]],
            best: None,
        };
        assert_eq!(porkchop.dv_range(), Some((1.5, 7.0)));
        assert_eq!(porkchop.num_failed(), 1);

        let empty: Porkchop<()> = Porkchop {
            departures: vec![0.0],
            travel_times: vec![5.0],
            cells: vec![vec![None]],
            best: None,
        };
        assert_eq!(empty.dv_range(), None);
    }
}
