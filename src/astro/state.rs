use nalgebra::Vector3;

use super::{HasMass, Orbit};
use crate::math::root_finding::{find_root_bracket, newton_plus_bisection};
use crate::math::stumpff::stumpff_G;

const NUM_ITERATIONS_ADVANCE_T: usize = 2000;

#[derive(Debug, Clone)]
pub struct CartesianState<P> {
    primary: P,
    position: Vector3<f64>,
    velocity: Vector3<f64>,
}

impl<P> CartesianState<P> {
    pub fn new(primary: P, position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        CartesianState {
            primary,
            position,
            velocity,
        }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub fn with_primary<P2>(self, primary: P2) -> CartesianState<P2> {
        CartesianState {
            primary,
            position: self.position,
            velocity: self.velocity,
        }
    }
}

impl<P: HasMass> CartesianState<P> {
    pub fn into_orbit(self) -> Orbit<P, ()> {
        Orbit::from_cartesian(self.primary, (), &self.position, &self.velocity)
    }

    pub fn energy(&self) -> f64 {
        // KE = 1/2 v^2, PE = - mu/r
        self.velocity.norm_squared() / 2.0 - self.primary.mu() / self.position.norm()
    }

    /// Returns (t, dt/ds) after advancing by `delta_s`, without moving.
    #[allow(non_snake_case)]
    fn delta_t_and_derivative(&self, delta_s: f64) -> (f64, f64) {
        let beta = -2.0 * self.energy();
        let mu = self.primary.mu();
        let G: [f64; 4] = stumpff_G(beta, delta_s);

        let r_0 = self.position.norm();
        let r_dot_0 = self.position.dot(&self.velocity) / r_0;

        let t = r_0 * G[1] + r_0 * r_dot_0 * G[2] + mu * G[3];
        // dt/ds is the radius at the new point
        let t_prime = r_0 * G[0] + r_0 * r_dot_0 * G[1] + mu * G[2];
        (t, t_prime)
    }

    /// Moves the state along its orbit by a change in universal anomaly, and
    /// returns the time that took.
    #[allow(non_snake_case)]
    pub fn advance_s(&mut self, delta_s: f64) -> f64 {
        let beta = -2.0 * self.energy();
        let mu = self.primary.mu();
        let G: [f64; 4] = stumpff_G(beta, delta_s);

        let r_0 = self.position.norm();
        let r_dot_0 = self.position.dot(&self.velocity) / r_0;

        let f = 1.0 - mu / r_0 * G[2];
        let g = r_0 * G[1] + r_0 * r_dot_0 * G[2];

        let new_position = f * self.position + g * self.velocity;
        let new_r = new_position.norm();

        let f_dot = -mu / r_0 / new_r * G[1];
        let g_dot = r_0 / new_r * (G[0] + r_dot_0 * G[1]);

        let new_velocity = f_dot * self.position + g_dot * self.velocity;
        let delta_t = r_0 * G[1] + r_0 * r_dot_0 * G[2] + mu * G[3];

        self.position = new_position;
        self.velocity = new_velocity;

        delta_t
    }

    /// Moves the state along its orbit by `delta_t` seconds. Returns `None`
    /// (leaving the state untouched) if the universal anomaly couldn't be found.
    #[allow(clippy::float_cmp)]
    pub fn advance_t(&mut self, delta_t: f64) -> Option<()> {
        if delta_t == 0.0 {
            return Some(());
        }

        let f_and_f_prime = |s: f64| {
            let (t, t_prime) = self.delta_t_and_derivative(s);
            (t - delta_t, t_prime)
        };

        let center = delta_t / self.position.norm();
        let bracket = find_root_bracket(
            |s| f_and_f_prime(s).0,
            center,
            center.abs(),
            NUM_ITERATIONS_ADVANCE_T,
        )?;
        let delta_s = newton_plus_bisection(f_and_f_prime, bracket, NUM_ITERATIONS_ADVANCE_T)?;

        self.advance_s(delta_s);
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;
    use crate::astro::PointMass;
    use crate::consts::{
        get_circular_velocity, get_period, KERBIN_ORBIT_PERIOD, KERBIN_ORBIT_RADIUS, KERBOL_MU,
    };

    #[test]
    fn test_kerbin() {
        // Build Kerbin and see if the orbit simulation is right.
        // Kerbin's orbit is perfectly circular.
        let initial_position = Vector3::x() * KERBIN_ORBIT_RADIUS;
        let initial_velocity = Vector3::y() * get_circular_velocity(KERBIN_ORBIT_RADIUS, KERBOL_MU);

        let mut state = CartesianState::new(
            PointMass::with_mu(KERBOL_MU),
            initial_position,
            initial_velocity,
        );

        // Advance for one full orbit.
        // This is a circular orbit, so s is proportional to theta. Specifically,
        // s = theta / sqrt(beta).
        let beta = -2.0 * state.energy();
        let s = 2.0 * PI / beta.sqrt();
        let elapsed_time = state.advance_s(s);

        // We expect these to be extremely close, since we got s from the orbit itself
        assert_relative_eq!(
            state.position(),
            initial_position,
            epsilon = 1e-14 * KERBIN_ORBIT_RADIUS
        );
        assert_relative_eq!(
            state.velocity(),
            initial_velocity,
            epsilon = 1e-14 * initial_velocity.norm()
        );

        // Time is a little fuzzier, because the velocity constant (and thus this orbit)
        // isn't perfect.
        let computed_period = get_period(KERBIN_ORBIT_RADIUS, KERBOL_MU);
        assert_relative_eq!(elapsed_time, computed_period, max_relative = 1e-12);
        assert_relative_eq!(elapsed_time, KERBIN_ORBIT_PERIOD, max_relative = 1e-6);
    }

    #[test]
    fn test_perfect_circle() {
        // Build a perfectly circular orbit, and test what it looks like as we move
        // incrementally around.
        let radius = 10.0 * KERBIN_ORBIT_RADIUS; // some number
        let velocity = (KERBOL_MU / radius).sqrt(); // v^2 = mu (2/r - 1/a) = mu / r

        let initial_position = Vector3::x() * radius;
        let initial_velocity = Vector3::z() * velocity;
        let mut state = CartesianState::new(
            PointMass::with_mu(KERBOL_MU),
            initial_position,
            initial_velocity,
        );
        let mut elapsed_time = 0.0;

        // Compute s for a whole orbit. Since r doesn't change, s varies linearly with
        // t.
        let beta = -2.0 * state.energy();
        let s = 2.0 * PI / beta.sqrt();

        let num_points = 1000;
        for i in 0..num_points {
            let num_points = num_points as f64;

            elapsed_time += state.advance_s(s / num_points);

            let theta = 2.0 * PI * (i + 1) as f64 / num_points;
            let expected = radius * Vector3::new(theta.cos(), 0.0, theta.sin());
            assert_relative_eq!(state.position(), expected, epsilon = 1e-12 * radius);
        }

        let computed_period = 2.0 * PI * radius / velocity;
        assert_relative_eq!(elapsed_time, computed_period, max_relative = 1e-12);
    }

    #[test]
    fn test_advance_t() {
        // A quarter of the way around a circle
        let radius = KERBIN_ORBIT_RADIUS;
        let velocity = get_circular_velocity(radius, KERBOL_MU);
        let mut state = CartesianState::new(
            PointMass::with_mu(KERBOL_MU),
            Vector3::x() * radius,
            Vector3::y() * velocity,
        );

        let period = get_period(radius, KERBOL_MU);
        state.advance_t(period / 4.0).unwrap();
        assert_relative_eq!(
            state.position(),
            Vector3::y() * radius,
            epsilon = 1e-9 * radius
        );

        // And back again
        state.advance_t(-period / 4.0).unwrap();
        assert_relative_eq!(
            state.position(),
            Vector3::x() * radius,
            epsilon = 1e-9 * radius
        );

        // Zero time is a no-op
        let before = state.position();
        state.advance_t(0.0).unwrap();
        assert_eq!(state.position(), before);
    }
}
