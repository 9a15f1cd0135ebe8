//! Single-revolution Lambert solver, using the universal-variable
//! formulation.
//!
//! The free parameter is z = α s², where s is the universal anomaly swept
//! along the arc. It is negative for hyperbolic arcs and positive for
//! elliptic ones, and the time of flight grows monotonically with it, so we
//! bracket it and hand it to Newton-with-bisection.

use std::f64::consts::PI;

use nalgebra::Vector3;
use serde::Deserialize;
use thiserror::Error;

use crate::math::intervals::Interval;
use crate::math::root_finding::newton_plus_bisection;
use crate::math::stumpff::{c2, c3};

const NUM_ITERATIONS_LAMBERT: usize = 2000;
const NUM_ITERATIONS_BRACKET: usize = 100;

/// Below this, |r1 x r2| / (|r1| |r2|) counts as collinear.
const COLLINEAR_TOLERANCE: f64 = 1e-6;

/// z = 4 pi^2 is where the single-revolution time of flight blows up.
const Z_MAX: f64 = 4.0 * PI * PI * (1.0 - 1e-9);

/// Which way around the reference normal the arc should travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    #[default]
    Prograde,
    Retrograde,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertSolution {
    /// Velocity at the first position.
    pub v1: Vector3<f64>,
    /// Velocity at the second position.
    pub v2: Vector3<f64>,
    /// Negative for hyperbolic arcs.
    pub semimajor_axis: f64,
    /// Angle swept along the arc, in [0, 2pi).
    pub transfer_angle: f64,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LambertError {
    #[error("time of flight must be positive and finite, got {0}")]
    InvalidTimeOfFlight(f64),
    #[error("positions must be non-zero and finite")]
    DegeneratePosition,
    #[error("positions are collinear, the transfer plane is undefined")]
    CollinearPositions,
    #[error("no single-revolution arc has this time of flight")]
    NoSolution,
    #[error("iteration failed to converge")]
    DidNotConverge,
}

/// Finds the arc leaving `r1` and reaching `r2` after `time_of_flight`
/// seconds, around a primary with gravitational parameter `mu`.
///
/// `reference_normal` picks the orientation: a prograde arc sweeps
/// counter-clockwise about it.
pub fn solve(
    r1: &Vector3<f64>,
    r2: &Vector3<f64>,
    time_of_flight: f64,
    mu: f64,
    reference_normal: &Vector3<f64>,
    direction: TransferDirection,
) -> Result<LambertSolution, LambertError> {
    if !(time_of_flight > 0.0 && time_of_flight.is_finite()) {
        return Err(LambertError::InvalidTimeOfFlight(time_of_flight));
    }

    let r1_norm = r1.norm();
    let r2_norm = r2.norm();
    if !(r1_norm > 0.0 && r2_norm > 0.0 && r1_norm.is_finite() && r2_norm.is_finite()) {
        return Err(LambertError::DegeneratePosition);
    }

    let cross = r1.cross(r2);
    if cross.norm() / (r1_norm * r2_norm) < COLLINEAR_TOLERANCE {
        return Err(LambertError::CollinearPositions);
    }

    let cos_dtheta = (r1.dot(r2) / (r1_norm * r2_norm)).clamp(-1.0, 1.0);
    let short_way_ccw = cross.dot(reference_normal) >= 0.0;
    let prograde = direction == TransferDirection::Prograde;
    let transfer_angle = if short_way_ccw == prograde {
        cos_dtheta.acos()
    } else {
        2.0 * PI - cos_dtheta.acos()
    };

    let a_coeff = transfer_angle.sin() * (r1_norm * r2_norm / (1.0 - cos_dtheta)).sqrt();
    let sqrt_mu = mu.sqrt();

    // y(z) and the time-of-flight mismatch F(z), scaled by sqrt(mu)
    let y_of = |z: f64| r1_norm + r2_norm + a_coeff * (z * c3(z) - 1.0) / c2(z).sqrt();
    let f_of = |z: f64| {
        let y = y_of(z);
        if y < 0.0 {
            // Not physical; treat it as "far too short"
            return -sqrt_mu * time_of_flight;
        }
        let c = c2(z);
        let s = c3(z);
        (y / c).powf(1.5) * s + a_coeff * y.sqrt() - sqrt_mu * time_of_flight
    };
    let f_and_f_prime = |z: f64| {
        let y = y_of(z);
        let f = f_of(z);
        if y <= 0.0 {
            // Push Newton to the right, towards physical values
            return (f, 1.0);
        }

        let f_prime = if z.abs() < 1e-6 {
            let y0 = y_of(0.0);
            2.0_f64.sqrt() / 40.0 * y0.powf(1.5)
                + a_coeff / 8.0 * (y0.sqrt() + a_coeff * (1.0 / (2.0 * y0)).sqrt())
        } else {
            let c = c2(z);
            let s = c3(z);
            (y / c).powf(1.5) * (1.0 / (2.0 * z) * (c - 1.5 * s / c) + 0.75 * s * s / c)
                + a_coeff / 8.0 * (3.0 * s / c * y.sqrt() + a_coeff * (c / y).sqrt())
        };
        (f, f_prime)
    };

    // Upper end of the bracket: approaching a full revolution, the time of
    // flight is unbounded for the long way round but not the short way.
    let f_hi = f_of(Z_MAX);
    if !f_hi.is_finite() {
        return Err(LambertError::DidNotConverge);
    }
    if f_hi < 0.0 {
        return Err(LambertError::NoSolution);
    }

    // Lower end: walk out into hyperbolic territory until we're too fast
    let mut z_lo = -1.0;
    let mut found_lo = false;
    for _ in 0..NUM_ITERATIONS_BRACKET {
        let f_lo = f_of(z_lo);
        if !f_lo.is_finite() {
            break;
        }
        if f_lo < 0.0 {
            found_lo = true;
            break;
        }
        z_lo *= 2.0;
    }
    if !found_lo {
        log::debug!(
            "Lambert bracket search failed: tof = {}, dtheta = {}",
            time_of_flight,
            transfer_angle
        );
        return Err(LambertError::DidNotConverge);
    }

    let z = newton_plus_bisection(
        f_and_f_prime,
        Interval::new(z_lo, Z_MAX),
        NUM_ITERATIONS_LAMBERT,
    )
    .ok_or(LambertError::DidNotConverge)?;

    // Lagrange coefficients
    let y = y_of(z);
    let f = 1.0 - y / r1_norm;
    let g = a_coeff * (y / mu).sqrt();
    let g_dot = 1.0 - y / r2_norm;

    let v1 = (r2 - f * r1) / g;
    let v2 = (g_dot * r2 - r1) / g;
    if !(v1.iter().all(|x| x.is_finite()) && v2.iter().all(|x| x.is_finite())) {
        return Err(LambertError::DidNotConverge);
    }

    // Vis-viva at the departure point
    let energy = v1.norm_squared() / 2.0 - mu / r1_norm;
    let semimajor_axis = -mu / (2.0 * energy);

    Ok(LambertSolution {
        v1,
        v2,
        semimajor_axis,
        transfer_angle,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::astro::{CartesianState, PointMass};

    // Curtis, Orbital Mechanics for Engineering Students, Example 5.2
    // Units are km and km/s.
    #[test]
    fn test_textbook_example() {
        let r1 = Vector3::new(5000.0, 10000.0, 2100.0);
        let r2 = Vector3::new(-14600.0, 2500.0, 7000.0);
        let mu = 398600.0;

        let solution = solve(&r1, &r2, 3600.0, mu, &Vector3::z(), TransferDirection::Prograde)
            .unwrap();

        assert_relative_eq!(
            solution.v1,
            Vector3::new(-5.9925, 1.9254, 3.2456),
            epsilon = 1e-3
        );
        assert_relative_eq!(
            solution.v2,
            Vector3::new(-3.3125, -4.1966, -0.38529),
            epsilon = 1e-3
        );
        assert!(solution.semimajor_axis > 0.0);
        assert!(solution.transfer_angle < PI);
    }

    #[test]
    fn test_arc_reaches_target() {
        let mu = crate::consts::KERBOL_MU;
        let r1 = Vector3::new(crate::consts::KERBIN_ORBIT_RADIUS, 0.0, 0.0);
        let r2 = 1.5 * crate::consts::KERBIN_ORBIT_RADIUS * Vector3::new(-0.3, 0.9, 0.1);

        let cases = [
            (TransferDirection::Prograde, 4.0e6),
            (TransferDirection::Prograde, 1.5e6),
            (TransferDirection::Retrograde, 6.0e6),
        ];
        for (direction, tof) in cases {
            let solution = solve(&r1, &r2, tof, mu, &Vector3::z(), direction).unwrap();

            let mut state = CartesianState::new(PointMass::with_mu(mu), r1, solution.v1);
            state.advance_t(tof).unwrap();
            assert_relative_eq!(state.position(), r2, epsilon = 1e-6 * r2.norm());
            assert_relative_eq!(state.velocity(), solution.v2, epsilon = 1e-6 * solution.v2.norm());

            // The arc has to go the way we asked it to
            let swept = r1.cross(&solution.v1).z;
            match direction {
                TransferDirection::Prograde => assert!(swept > 0.0),
                TransferDirection::Retrograde => assert!(swept < 0.0),
            }
        }
    }

    #[test]
    fn test_long_way_round() {
        let mu = 1.0;
        let r1 = Vector3::new(1.0, 0.0, 0.0);
        let r2 = Vector3::new(0.0, -1.2, 0.0);

        // Clockwise is the short way, so prograde has to take the long way
        let solution = solve(&r1, &r2, 5.0, mu, &Vector3::z(), TransferDirection::Prograde).unwrap();
        assert_relative_eq!(solution.transfer_angle, 1.5 * PI, max_relative = 1e-12);

        let mut state = CartesianState::new(PointMass::with_mu(mu), r1, solution.v1);
        state.advance_t(5.0).unwrap();
        assert_relative_eq!(state.position(), r2, epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_inputs() {
        let r1 = Vector3::new(7000.0, 0.0, 0.0);
        let mu = 398600.0;
        let normal = Vector3::z();
        let prograde = TransferDirection::Prograde;

        assert_eq!(
            solve(&r1, &Vector3::new(0.0, 8000.0, 0.0), 0.0, mu, &normal, prograde),
            Err(LambertError::InvalidTimeOfFlight(0.0))
        );
        assert!(matches!(
            solve(&r1, &Vector3::new(0.0, 8000.0, 0.0), -5.0, mu, &normal, prograde),
            Err(LambertError::InvalidTimeOfFlight(_))
        ));
        assert_eq!(
            solve(&r1, &Vector3::new(-9000.0, 0.0, 0.0), 3600.0, mu, &normal, prograde),
            Err(LambertError::CollinearPositions)
        );
        assert_eq!(
            solve(&r1, &(2.0 * r1), 3600.0, mu, &normal, prograde),
            Err(LambertError::CollinearPositions)
        );
        assert_eq!(
            solve(&Vector3::zeros(), &r1, 3600.0, mu, &normal, prograde),
            Err(LambertError::DegeneratePosition)
        );
    }

    #[test]
    fn test_hyperbolic_arc() {
        // Very short time of flight forces an open arc
        let mu = 398600.0;
        let r1 = Vector3::new(7000.0, 0.0, 0.0);
        let r2 = Vector3::new(0.0, 9000.0, 0.0);
        let solution = solve(&r1, &r2, 300.0, mu, &Vector3::z(), TransferDirection::Prograde)
            .unwrap();
        assert!(solution.semimajor_axis < 0.0);

        let mut state = CartesianState::new(PointMass::with_mu(mu), r1, solution.v1);
        state.advance_t(300.0).unwrap();
        assert_relative_eq!(state.position(), r2, epsilon = 1e-6 * r2.norm());
    }
}
