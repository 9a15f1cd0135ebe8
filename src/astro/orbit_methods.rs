use nalgebra::Vector3;

use super::{CartesianState, HasMass, Orbit};
use crate::math::root_finding::{find_root_bracket, newton_plus_bisection};
use crate::math::stumpff::stumpff_G;

const NUM_ITERATIONS_DELTA_T: usize = 2000;

impl<P, S> Orbit<P, S> {
    pub fn get_position_at_theta(&self, theta: f64) -> Option<Vector3<f64>> {
        if self.semilatus_rectum() == 0.0 {
            // Radial orbits
            return None;
        }

        let denominator = 1.0 + self.eccentricity() * theta.cos();
        if denominator <= 0.0 {
            // Happens when we're hyperbolic/parabolic, and we're larger than max anomaly
            return None;
        }

        let radius = self.semilatus_rectum() / denominator;
        let position = radius * Vector3::new(theta.cos(), theta.sin(), 0.0);

        Some(self.rotation() * position)
    }
}

impl<P: HasMass, S> Orbit<P, S> {
    #[allow(non_snake_case)]
    fn get_state_native_frame(&self, s: f64) -> (Vector3<f64>, Vector3<f64>) {
        let mu = self.primary().mu();
        let beta = self.beta();
        let h = self.angular_momentum();
        let G: [f64; 4] = stumpff_G(beta, s);

        // Get the position at s
        let x = self.periapsis() - mu * G[2];
        let y = h * G[1];
        let r = (x * x + y * y).sqrt();
        let vx = -mu / r * G[1];
        let vy = h / r * G[0];

        (Vector3::new(x, y, 0.0), Vector3::new(vx, vy, 0.0))
    }

    pub fn get_state_at_universal_anomaly(&self, s: f64) -> CartesianState<&P> {
        let (position, velocity) = self.get_state_native_frame(s);

        CartesianState::new(
            self.primary(),
            self.rotation() * position,
            self.rotation() * velocity,
        )
    }

    pub fn get_state_at_tsp(&self, time_since_periapsis: f64) -> Option<CartesianState<&P>> {
        // First we find the s corresponding to the time
        let s = self.tsp_to_s(time_since_periapsis)?;
        Some(self.get_state_at_universal_anomaly(s))
    }

    /// Returns t(s) and t'(s), evaluted at the given point, where
    /// t(s) = r_0 * G_1(β, s) + r_0 * r_dot_0 * G_2(β, s) + mu * G_3(β, s)
    #[allow(non_snake_case)]
    fn ts_and_derivative(&self, s: f64) -> (f64, f64) {
        // Grab some constants
        let beta = self.beta();
        let mu = self.primary().mu();
        let r_p = self.periapsis();

        let G = stumpff_G(beta, s);
        let t = r_p * G[1] + mu * G[3];
        let t_prime = r_p * G[0] + mu * G[2];

        (t, t_prime)
    }

    #[allow(clippy::float_cmp)]
    pub fn tsp_to_s(&self, time_since_periapsis: f64) -> Option<f64> {
        if time_since_periapsis == 0.0 {
            return Some(0.0);
        }

        // We want to find a root of this function, which is monotonically increasing:
        let f_and_f_prime = |s: f64| {
            let (t, t_prime) = self.ts_and_derivative(s);
            (t - time_since_periapsis, t_prime)
        };

        let center = time_since_periapsis / self.periapsis();
        let bracket = find_root_bracket(
            |x| f_and_f_prime(x).0,
            center,
            center.abs(),
            NUM_ITERATIONS_DELTA_T,
        );
        let s = bracket.and_then(|bracket| {
            newton_plus_bisection(f_and_f_prime, bracket, NUM_ITERATIONS_DELTA_T)
        });

        if s.is_none() {
            log::warn!(
                "Could not solve for universal anomaly: tsp = {}, r_p = {}, beta = {}",
                time_since_periapsis,
                self.periapsis(),
                self.beta()
            );
        }
        s
    }

    pub fn s_to_tsp(&self, s: f64) -> f64 {
        self.ts_and_derivative(s).0
    }
}
