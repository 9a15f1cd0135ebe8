//! Evaluates a single patched-conic transfer between two bodies orbiting the
//! same primary.

use std::f64::consts::FRAC_PI_2;
use std::fmt;

use nalgebra::{Rotation3, Unit, UnitQuaternion, Vector3};
use thiserror::Error;

use crate::astro::lambert::{self, LambertError, TransferDirection};
use crate::calendar::{Calendar, DateFormat, DateTime, SpanFormat, TimeSpan};
use crate::math::geometry::to_working_frame;
use crate::orrery::{BodyID, OrbitState};

pub mod ejection;
pub mod porkchop;

use ejection::{ejection_geometry, insertion_inclination};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    #[error("travel time must be positive, got {0} s")]
    InvalidTimeOfFlight(f64),
    #[error("no transfer arc: {0}")]
    NoTransferArc(#[from] LambertError),
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
    #[error("{origin} and {destination} do not orbit the same body")]
    MismatchedPrimaries { origin: String, destination: String },
    #[error("no body with id {0:?}")]
    UnknownBody(BodyID),
    #[error("{0} has no orbit")]
    NoOrbit(String),
    #[error("could not find the state of {name} at UT {time}")]
    StateUnavailable { name: String, time: f64 },
}

/// Everything that pins down one transfer.
#[derive(Debug, Clone, Copy)]
pub struct TransferRequest<B> {
    pub origin: B,
    pub destination: B,
    /// Seconds since epoch
    pub departure_time: f64,
    /// Seconds
    pub travel_time: f64,
}

/// Assumptions about the vessel that aren't part of the request itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferOptions {
    /// Altitude of the circular parking orbit the ejection burn starts from.
    pub origin_parking_altitude: f64,
    /// Altitude of the circular orbit to capture into.
    pub destination_parking_altitude: f64,
    pub direction: TransferDirection,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            origin_parking_altitude: 100_000.0,
            destination_parking_altitude: 100_000.0,
            direction: TransferDirection::Prograde,
        }
    }
}

/// The solved transfer, and everything derived from it. Angles are in
/// radians, speeds in m/s, vectors in the primary's inertial frame.
#[derive(Debug, Clone)]
pub struct TransferDetails<B> {
    origin: B,
    destination: B,
    departure_time: f64,
    travel_time: f64,

    origin_position: Vector3<f64>,
    destination_position: Vector3<f64>,
    origin_velocity: Vector3<f64>,
    transfer_initial_velocity: Vector3<f64>,
    transfer_final_velocity: Vector3<f64>,
    destination_velocity: Vector3<f64>,
    transfer_semimajor_axis: f64,

    dv_ejection: f64,
    dv_injection: f64,
    origin_vessel_orbital_speed: f64,
    destination_vessel_orbital_speed: f64,

    phase_angle: f64,
    transfer_angle: f64,

    parking_semimajor_axis: f64,
    destination_parking_radius: f64,
    ejection_inclination: f64,
    ejection_long_asc_node: f64,
    ejection_angle: f64,
    insertion_inclination: f64,
    asymptote_direction: Unit<Vector3<f64>>,
    peri_direction: Unit<Vector3<f64>>,
}

/// The escape asymptote and the parking-orbit periapsis, ready to be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EjectionMarkers {
    pub asymptote: Vector3<f64>,
    pub periapsis: Vector3<f64>,
    /// Angle between the two markers
    pub angle: f64,
}

/// Signed phase angle (radians) of `destination` relative to `origin`, both
/// measured from their shared primary.
///
/// The unsigned angle is negated when the destination sits more than 90°
/// away from the origin's direction of travel, which puts outward transfers
/// in [-π, π]. For inward transfers a further full turn is subtracted and
/// the result is not wrapped, so it lies in [-3π, -π] rather than (-2π, π].
/// Burn-angle displays depend on that offset.
pub fn phase_angle(
    origin_position: &Vector3<f64>,
    destination_position: &Vector3<f64>,
    orbit_normal: &Unit<Vector3<f64>>,
    origin_semimajor_axis: f64,
    destination_semimajor_axis: f64,
) -> Result<f64, TransferError> {
    if origin_position.norm() == 0.0 || destination_position.norm() == 0.0 {
        return Err(TransferError::DegenerateGeometry(
            "phase angle of a body sitting on its primary",
        ));
    }

    let mut angle = origin_position.angle(destination_position).to_degrees();

    let ahead = Rotation3::from_axis_angle(orbit_normal, FRAC_PI_2) * origin_position;
    if ahead.angle(destination_position).to_degrees() > 90.0 {
        angle = -angle;
    }

    if destination_semimajor_axis < origin_semimajor_axis {
        angle -= 360.0;
    }

    Ok(angle.to_radians())
}

fn circular_speed(mu: f64, radius: f64) -> f64 {
    (mu / radius).sqrt()
}

// Burn from a circular orbit at `radius` to a hyperbola with excess speed
// `v_infinity`, or the reverse
fn oberth_burn(mu: f64, radius: f64, v_infinity: f64) -> f64 {
    let periapsis_speed = (v_infinity * v_infinity + 2.0 * mu / radius).sqrt();
    (periapsis_speed - circular_speed(mu, radius)).max(0.0)
}

fn state_of<B: OrbitState>(
    body: &B,
    time: f64,
) -> Result<(Vector3<f64>, Vector3<f64>), TransferError> {
    let state = body
        .state_at(time)
        .ok_or_else(|| TransferError::StateUnavailable {
            name: body.name().to_owned(),
            time,
        })?;
    Ok((state.position(), state.velocity()))
}

/// Solves the transfer described by `request`.
///
/// Failures are returned, never retried; a caller sweeping over many
/// requests is expected to skip the ones that fail.
pub fn evaluate<B: OrbitState + Clone>(
    request: &TransferRequest<B>,
    options: &TransferOptions,
) -> Result<TransferDetails<B>, TransferError> {
    let TransferRequest {
        origin,
        destination,
        departure_time,
        travel_time,
    } = request;
    let (departure_time, travel_time) = (*departure_time, *travel_time);

    if !(travel_time > 0.0 && travel_time.is_finite()) {
        return Err(TransferError::InvalidTimeOfFlight(travel_time));
    }
    if origin.primary_id() != destination.primary_id() {
        return Err(TransferError::MismatchedPrimaries {
            origin: origin.name().to_owned(),
            destination: destination.name().to_owned(),
        });
    }

    let arrival_time = departure_time + travel_time;
    let (origin_position, origin_velocity) = state_of(origin, departure_time)?;
    let (destination_position, destination_velocity) = state_of(destination, arrival_time)?;
    if origin_position.norm() == 0.0 || destination_position.norm() == 0.0 {
        return Err(TransferError::DegenerateGeometry(
            "body position coincides with its primary",
        ));
    }

    let orbit_normal = origin.orbit_normal();
    let (destination_now, _) = state_of(destination, departure_time)?;
    let phase_angle = phase_angle(
        &origin_position,
        &destination_now,
        &orbit_normal,
        origin.semimajor_axis(),
        destination.semimajor_axis(),
    )?;

    let arc = lambert::solve(
        &origin_position,
        &destination_position,
        travel_time,
        origin.primary_mu(),
        &orbit_normal,
        options.direction,
    )
    .map_err(|err| {
        log::debug!(
            "No arc from {} at {} to {} at {}: {}",
            origin.name(),
            departure_time,
            destination.name(),
            arrival_time,
            err
        );
        TransferError::NoTransferArc(err)
    })?;

    let ejection_vector = arc.v1 - origin_velocity;
    let injection_vector = arc.v2 - destination_velocity;

    let parking_semimajor_axis = origin.radius() + options.origin_parking_altitude;
    let destination_parking_radius = destination.radius() + options.destination_parking_altitude;
    let geometry = ejection_geometry(&ejection_vector, parking_semimajor_axis, origin.mu())?;
    let insertion_inclination = insertion_inclination(&injection_vector)?;

    Ok(TransferDetails {
        origin: origin.clone(),
        destination: destination.clone(),
        departure_time,
        travel_time,
        origin_position,
        destination_position,
        origin_velocity,
        transfer_initial_velocity: arc.v1,
        transfer_final_velocity: arc.v2,
        destination_velocity,
        transfer_semimajor_axis: arc.semimajor_axis,
        dv_ejection: ejection_vector.norm(),
        dv_injection: injection_vector.norm(),
        origin_vessel_orbital_speed: circular_speed(origin.mu(), parking_semimajor_axis),
        destination_vessel_orbital_speed: circular_speed(
            destination.mu(),
            destination_parking_radius,
        ),
        phase_angle,
        transfer_angle: arc.transfer_angle,
        parking_semimajor_axis,
        destination_parking_radius,
        ejection_inclination: geometry.inclination,
        ejection_long_asc_node: geometry.long_asc_node,
        ejection_angle: geometry.ejection_angle,
        insertion_inclination,
        asymptote_direction: geometry.asymptote,
        peri_direction: geometry.peri_direction,
    })
}

impl<B> TransferDetails<B> {
    pub fn origin(&self) -> &B {
        &self.origin
    }

    pub fn destination(&self) -> &B {
        &self.destination
    }

    pub fn departure_time(&self) -> f64 {
        self.departure_time
    }

    pub fn travel_time(&self) -> f64 {
        self.travel_time
    }

    pub fn arrival_time(&self) -> f64 {
        self.departure_time + self.travel_time
    }

    // -- Vectors --

    pub fn origin_position(&self) -> Vector3<f64> {
        self.origin_position
    }

    /// Where the destination is at arrival.
    pub fn destination_position(&self) -> Vector3<f64> {
        self.destination_position
    }

    pub fn origin_velocity(&self) -> Vector3<f64> {
        self.origin_velocity
    }

    pub fn transfer_initial_velocity(&self) -> Vector3<f64> {
        self.transfer_initial_velocity
    }

    pub fn transfer_final_velocity(&self) -> Vector3<f64> {
        self.transfer_final_velocity
    }

    pub fn destination_velocity(&self) -> Vector3<f64> {
        self.destination_velocity
    }

    /// Hyperbolic excess velocity leaving the origin.
    pub fn ejection_vector(&self) -> Vector3<f64> {
        self.transfer_initial_velocity - self.origin_velocity
    }

    /// Hyperbolic excess velocity arriving at the destination.
    pub fn injection_vector(&self) -> Vector3<f64> {
        self.transfer_final_velocity - self.destination_velocity
    }

    pub fn transfer_semimajor_axis(&self) -> f64 {
        self.transfer_semimajor_axis
    }

    // -- Delta-v --

    pub fn dv_ejection(&self) -> f64 {
        self.dv_ejection
    }

    pub fn dv_injection(&self) -> f64 {
        self.dv_injection
    }

    pub fn dv_total(&self) -> f64 {
        self.dv_ejection + self.dv_injection
    }

    pub fn origin_vessel_orbital_speed(&self) -> f64 {
        self.origin_vessel_orbital_speed
    }

    pub fn destination_vessel_orbital_speed(&self) -> f64 {
        self.destination_vessel_orbital_speed
    }

    // -- Angles --

    pub fn phase_angle(&self) -> f64 {
        self.phase_angle
    }

    pub fn transfer_angle(&self) -> f64 {
        self.transfer_angle
    }

    pub fn ejection_inclination(&self) -> f64 {
        self.ejection_inclination
    }

    pub fn ejection_long_asc_node(&self) -> f64 {
        self.ejection_long_asc_node
    }

    pub fn ejection_angle(&self) -> f64 {
        self.ejection_angle
    }

    pub fn insertion_inclination(&self) -> f64 {
        self.insertion_inclination
    }

    // -- Parking orbits --

    /// Radius of the circular parking orbit around the origin.
    pub fn parking_semimajor_axis(&self) -> f64 {
        self.parking_semimajor_axis
    }

    pub fn destination_parking_radius(&self) -> f64 {
        self.destination_parking_radius
    }

    pub fn peri_direction(&self) -> Unit<Vector3<f64>> {
        self.peri_direction
    }

    pub fn asymptote_direction(&self) -> Unit<Vector3<f64>> {
        self.asymptote_direction
    }

    /// Maps the asymptote and periapsis directions into the rendering frame.
    pub fn ejection_markers(&self, frame_rotation: &UnitQuaternion<f64>) -> EjectionMarkers {
        let asymptote = to_working_frame(&self.asymptote_direction, frame_rotation);
        let periapsis = to_working_frame(&self.peri_direction, frame_rotation);
        EjectionMarkers {
            asymptote,
            periapsis,
            angle: asymptote.angle(&periapsis),
        }
    }
}

impl<B: OrbitState> TransferDetails<B> {
    /// Prograde burn at the parking orbit's periapsis that leaves the origin
    /// with the required excess velocity.
    pub fn ejection_burn_from_parking(&self) -> f64 {
        oberth_burn(self.origin.mu(), self.parking_semimajor_axis, self.dv_ejection)
    }

    /// Retrograde burn that captures into the destination's parking orbit.
    pub fn insertion_burn_to_parking(&self) -> f64 {
        oberth_burn(
            self.destination.mu(),
            self.destination_parking_radius,
            self.dv_injection,
        )
    }

    /// A human-readable summary, with dates in `calendar`.
    pub fn report<'a>(&'a self, calendar: &'a Calendar) -> TransferReport<'a, B> {
        TransferReport {
            details: self,
            calendar,
        }
    }
}

pub struct TransferReport<'a, B> {
    details: &'a TransferDetails<B>,
    calendar: &'a Calendar,
}

impl<B: OrbitState> fmt::Display for TransferReport<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.details;
        let calendar = *self.calendar;
        let depart = DateTime::from_ut(d.departure_time, calendar);
        let arrive = DateTime::from_ut(d.arrival_time(), calendar);
        let travel = TimeSpan::from_seconds(d.travel_time, calendar);

        writeln!(
            f,
            "{} (@{:.0}km) -> {} (@{:.0}km)",
            d.origin.name(),
            (d.parking_semimajor_axis - d.origin.radius()) / 1000.0,
            d.destination.name(),
            (d.destination_parking_radius - d.destination.radius()) / 1000.0,
        )?;
        writeln!(f, "Depart at:      {}", depart.display(DateFormat::DateTime))?;
        writeln!(f, "       UT:      {:.0}", d.departure_time)?;
        writeln!(
            f,
            "   Travel:      {}",
            travel.display(SpanFormat::IntervalLongTrimYears)
        )?;
        writeln!(f, "       UT:      {:.0}", d.travel_time)?;
        writeln!(f, "Arrive at:      {}", arrive.display(DateFormat::DateTime))?;
        writeln!(f, "       UT:      {:.0}", d.arrival_time())?;
        writeln!(f, "Phase Angle:    {:.2}°", d.phase_angle.to_degrees())?;
        writeln!(f, "Ejection Angle: {:.2}°", d.ejection_angle.to_degrees())?;
        writeln!(f, "Ejection Inc.:  {:.2}°", d.ejection_inclination.to_degrees())?;
        writeln!(f, "Ejection LAN:   {:.2}°", d.ejection_long_asc_node.to_degrees())?;
        writeln!(f, "Ejection Δv:    {:.0} m/s", d.dv_ejection)?;
        writeln!(f, "Insertion Inc.: {:.2}°", d.insertion_inclination.to_degrees())?;
        writeln!(f, "Insertion Δv:   {:.0} m/s", d.dv_injection)?;
        writeln!(f, "Total Δv:       {:.0} m/s", d.dv_total())?;
        writeln!(
            f,
            "Parking burns:  {:.0} m/s + {:.0} m/s",
            d.ejection_burn_from_parking(),
            d.insertion_burn_to_parking()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;

    fn on_circle(radius: f64, degrees: f64) -> Vector3<f64> {
        let theta = degrees.to_radians();
        radius * Vector3::new(theta.cos(), theta.sin(), 0.0)
    }

    #[test]
    fn test_phase_angle_outbound() {
        let normal = Vector3::z_axis();
        let origin = on_circle(1.0, 0.0);

        // Destination leading by 44 degrees
        let angle = phase_angle(&origin, &on_circle(2.0, 44.0), &normal, 1.0, 2.0).unwrap();
        assert_relative_eq!(angle, 44.0_f64.to_radians(), max_relative = 1e-12);

        // Trailing by 30 degrees
        let angle = phase_angle(&origin, &on_circle(2.0, -30.0), &normal, 1.0, 2.0).unwrap();
        assert_relative_eq!(angle, -30.0_f64.to_radians(), max_relative = 1e-12);

        // Either side of opposition
        let angle = phase_angle(&origin, &on_circle(2.0, 179.0), &normal, 1.0, 2.0).unwrap();
        assert_relative_eq!(angle, 179.0_f64.to_radians(), max_relative = 1e-12);
        let angle = phase_angle(&origin, &on_circle(2.0, 181.0), &normal, 1.0, 2.0).unwrap();
        assert_relative_eq!(angle, -179.0_f64.to_radians(), max_relative = 1e-12);

        for degrees in [-179.0, -90.0, -1.0, 0.5, 60.0, 89.0, 135.0, 179.0] {
            let angle =
                phase_angle(&origin, &on_circle(3.0, degrees), &normal, 1.0, 3.0).unwrap();
            assert!((-PI..=PI).contains(&angle), "{} -> {}", degrees, angle);
        }
    }

    #[test]
    fn test_phase_angle_inbound() {
        let normal = Vector3::z_axis();
        let origin = on_circle(2.0, 0.0);

        let angle = phase_angle(&origin, &on_circle(1.0, 44.0), &normal, 2.0, 1.0).unwrap();
        assert_relative_eq!(angle, (44.0_f64 - 360.0).to_radians(), max_relative = 1e-12);

        for degrees in [-179.0, -90.0, -1.0, 0.5, 60.0, 89.0, 135.0, 179.0] {
            let angle =
                phase_angle(&origin, &on_circle(1.0, degrees), &normal, 2.0, 1.0).unwrap();
            assert!((-3.0 * PI..=-PI).contains(&angle), "{} -> {}", degrees, angle);
        }
    }

    #[test]
    fn test_phase_angle_follows_normal() {
        // Orbiting clockwise seen from +z, "ahead" is the other way round
        let normal = -Vector3::z_axis();
        let angle = phase_angle(
            &on_circle(1.0, 0.0),
            &on_circle(2.0, -44.0),
            &normal,
            1.0,
            2.0,
        )
        .unwrap();
        assert_relative_eq!(angle, 44.0_f64.to_radians(), max_relative = 1e-12);

        assert!(matches!(
            phase_angle(&Vector3::zeros(), &on_circle(2.0, 0.0), &normal, 1.0, 2.0),
            Err(TransferError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_oberth_burn() {
        // Escape with no excess speed costs (sqrt(2) - 1) v_circ
        let mu = 3.5316e12;
        let r = 700_000.0;
        let v_circ = circular_speed(mu, r);
        assert_relative_eq!(oberth_burn(mu, r, 0.0), (2.0_f64.sqrt() - 1.0) * v_circ);

        // Massless bodies give exactly the excess speed back
        assert_relative_eq!(oberth_burn(0.0, r, 1234.0), 1234.0);
    }
}
