use nalgebra::{Rotation3, Unit, Vector3};

use super::TransferError;
use crate::math::geometry::{directed_angle, reject};

/// Orientation of the hyperbolic escape from a circular parking orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EjectionGeometry {
    /// Direction of the outgoing asymptote (the hyperbolic excess velocity).
    pub asymptote: Unit<Vector3<f64>>,
    /// Normal of the parking/escape orbit plane.
    pub plane_normal: Unit<Vector3<f64>>,
    /// Direction of the escape hyperbola's periapsis, where the burn happens.
    pub peri_direction: Unit<Vector3<f64>>,
    pub inclination: f64,
    pub long_asc_node: f64,
    /// Angle from periapsis to the asymptote, i.e. the true anomaly at
    /// infinity.
    pub ejection_angle: f64,
    pub eccentricity: f64,
}

/// Escape geometry for leaving a circular orbit of radius `parking_radius`
/// around a body with gravitational parameter `mu`, ending up with hyperbolic
/// excess velocity `v_infinity`.
///
/// The escape orbit is the least inclined plane that contains the asymptote.
pub fn ejection_geometry(
    v_infinity: &Vector3<f64>,
    parking_radius: f64,
    mu: f64,
) -> Result<EjectionGeometry, TransferError> {
    let v_inf = v_infinity.norm();
    let asymptote = Unit::try_new(*v_infinity, 1e-12)
        .ok_or(TransferError::DegenerateGeometry("zero hyperbolic excess velocity"))?;

    // Rejecting z from the asymptote tilts z as little as possible while
    // staying perpendicular to it. Straight up or down, any plane through z
    // will do; take the x-z plane.
    let plane_normal = Unit::try_new(reject(&Vector3::z(), &asymptote), 1e-9)
        .unwrap_or_else(|| -Vector3::y_axis());

    let inclination = plane_normal.angle(&Vector3::z());
    let node = Vector3::z().cross(&plane_normal);
    let long_asc_node = if node.norm() < 1e-12 {
        0.0
    } else {
        directed_angle(&Vector3::x(), &node, &Vector3::z())
    };

    // With a massless body, e is infinite and the hyperbola is a straight
    // line perpendicular to periapsis
    let eccentricity = 1.0 + parking_radius * v_inf * v_inf / mu;
    let ejection_angle = (-1.0 / eccentricity).acos();

    let peri_direction = Rotation3::from_axis_angle(&plane_normal, -ejection_angle) * asymptote;

    Ok(EjectionGeometry {
        asymptote,
        plane_normal,
        peri_direction,
        inclination,
        long_asc_node,
        ejection_angle,
        eccentricity,
    })
}

/// Lowest inclination reachable when capturing with hyperbolic excess
/// velocity `v_infinity`: the declination of the incoming asymptote.
pub fn insertion_inclination(v_infinity: &Vector3<f64>) -> Result<f64, TransferError> {
    let v_inf = v_infinity.norm();
    if v_inf < 1e-12 {
        return Err(TransferError::DegenerateGeometry(
            "zero arrival hyperbolic excess velocity",
        ));
    }
    Ok((v_infinity.z / v_inf).clamp(-1.0, 1.0).asin().abs())
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_equatorial_ejection() {
        // Escaping along +y from a 700 km orbit of Kerbin
        let mu = 3.5316e12;
        let r_p = 700_000.0;
        let v_inf = 1_000.0;
        let geometry = ejection_geometry(&(v_inf * Vector3::y()), r_p, mu).unwrap();

        assert_relative_eq!(geometry.inclination, 0.0);
        assert_relative_eq!(geometry.long_asc_node, 0.0);
        assert_relative_eq!(geometry.plane_normal.into_inner(), Vector3::z());

        let e = 1.0 + r_p * v_inf * v_inf / mu;
        assert_relative_eq!(geometry.eccentricity, e);
        assert_relative_eq!(geometry.ejection_angle, (-1.0 / e).acos());
        assert!(geometry.ejection_angle > FRAC_PI_2 && geometry.ejection_angle < PI);

        // Periapsis trails the asymptote by the ejection angle, in the plane
        assert_relative_eq!(
            geometry.peri_direction.angle(&geometry.asymptote),
            geometry.ejection_angle,
            max_relative = 1e-12
        );
        assert_relative_eq!(geometry.peri_direction.z, 0.0, epsilon = 1e-12);
        assert!(geometry.peri_direction.cross(&geometry.asymptote).z > 0.0);
    }

    #[test]
    fn test_inclined_ejection() {
        // 45 degrees out of the plane, heading over +x
        let direction = Vector3::new(1.0, 0.0, 1.0);
        let geometry = ejection_geometry(&(2_000.0 * direction), 700_000.0, 3.5316e12).unwrap();

        assert_relative_eq!(geometry.inclination, FRAC_PI_4, max_relative = 1e-12);
        // Ascending node is a quarter turn behind the asymptote's longitude
        assert_relative_eq!(geometry.long_asc_node, 1.5 * PI, max_relative = 1e-12);
        assert_relative_eq!(
            geometry.plane_normal.dot(&geometry.asymptote),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_polar_and_massless() {
        // Straight up: falls back to the x-z plane
        let geometry = ejection_geometry(&Vector3::new(0.0, 0.0, 50.0), 1.0, 1.0).unwrap();
        assert_relative_eq!(geometry.plane_normal.into_inner(), -Vector3::y());
        assert_relative_eq!(geometry.inclination, FRAC_PI_2);

        // A massless origin can't bend the path at all
        let geometry = ejection_geometry(&Vector3::new(10.0, 0.0, 0.0), 1.0, 0.0).unwrap();
        assert!(geometry.eccentricity.is_infinite());
        assert_relative_eq!(geometry.ejection_angle, FRAC_PI_2);

        assert!(matches!(
            ejection_geometry(&Vector3::zeros(), 1.0, 1.0),
            Err(TransferError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_insertion_inclination() {
        assert_relative_eq!(insertion_inclination(&Vector3::new(3.0, 4.0, 0.0)).unwrap(), 0.0);
        assert_relative_eq!(
            insertion_inclination(&Vector3::new(1.0, 0.0, -1.0)).unwrap(),
            FRAC_PI_4,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            insertion_inclination(&Vector3::new(0.0, 0.0, 7.0)).unwrap(),
            FRAC_PI_2
        );
        assert!(insertion_inclination(&Vector3::zeros()).is_err());
    }
}
