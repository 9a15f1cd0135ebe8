use std::collections::HashMap;

use nalgebra::{Unit, Vector3};

use super::body::{Body, BodyID, BodyInfo, BodyState};
use super::OrbitState;
use crate::astro::{CartesianState, HasMass, Orbit, PointMass, TimedOrbit};
use crate::transfer::TransferError;

#[derive(Debug, Clone, Default)]
pub struct Orrery {
    bodies: HashMap<BodyID, Body>,
    next_body_id: usize,
}

/// A body that has an orbit, viewed through the [OrbitState] capability.
#[derive(Debug, Clone, Copy)]
pub struct OrbitingBody<'orr> {
    id: BodyID,
    info: &'orr BodyInfo,
    parent_id: BodyID,
    parent_mu: f64,
    orbit: &'orr TimedOrbit<PointMass, ()>,
}

impl Orrery {
    pub fn new() -> Self {
        Self::default()
    }

    /// All bodies, in the order they were added.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        let mut bodies: Vec<_> = self.bodies.values().collect();
        bodies.sort_by_key(|body| body.id);
        bodies.into_iter()
    }

    pub fn get_body(&self, id: BodyID) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<BodyID> {
        self.bodies
            .values()
            .find(|body| body.info.name.eq_ignore_ascii_case(name))
            .map(|body| body.id)
    }

    pub fn child_bodies(&self, id: BodyID) -> impl Iterator<Item = &Body> {
        self.bodies().filter(move |body| body.parent_id() == Some(id))
    }

    pub fn add_body(
        &mut self,
        body_info: BodyInfo,
        orbit: Orbit<PointMass, ()>,
        time_at_periapsis: f64,
        parent_id: BodyID,
    ) -> BodyID {
        let orbit = TimedOrbit::from_orbit(orbit, time_at_periapsis);
        self.insert_new_body(body_info, BodyState::Orbiting { parent_id, orbit })
    }

    pub fn add_fixed_body(&mut self, body_info: BodyInfo) -> BodyID {
        self.insert_new_body(body_info, BodyState::FixedAtOrigin)
    }

    fn insert_new_body(&mut self, info: BodyInfo, state: BodyState) -> BodyID {
        let id = BodyID(self.next_body_id);
        self.next_body_id += 1;

        self.bodies.insert(id, Body { id, info, state });
        id
    }

    pub fn get_soi_radius(&self, id: BodyID) -> Option<f64> {
        let body = self.bodies.get(&id)?;

        body.orbit()?
            .orbit()
            .with_secondary(PointMass::with_mu(body.info.mu))
            .soi_radius()
    }

    pub fn orbiting_body(&self, id: BodyID) -> Result<OrbitingBody<'_>, TransferError> {
        let body = self.bodies.get(&id).ok_or(TransferError::UnknownBody(id))?;
        match &body.state {
            BodyState::FixedAtOrigin => Err(TransferError::NoOrbit(body.info.name.clone())),
            BodyState::Orbiting { parent_id, orbit } => Ok(OrbitingBody {
                id,
                info: &body.info,
                parent_id: *parent_id,
                parent_mu: orbit.orbit().primary().mu(),
                orbit,
            }),
        }
    }
}

impl<'orr> OrbitingBody<'orr> {
    pub fn id(&self) -> BodyID {
        self.id
    }

    pub fn timed_orbit(&self) -> &'orr TimedOrbit<PointMass, ()> {
        self.orbit
    }
}

impl HasMass for OrbitingBody<'_> {
    fn mu(&self) -> f64 {
        self.info.mu
    }
}

impl OrbitState for OrbitingBody<'_> {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn state_at(&self, time: f64) -> Option<CartesianState<PointMass>> {
        let state = self.orbit.state_at_time(time)?;
        let primary = state.primary().to_point_mass();
        Some(state.with_primary(primary))
    }

    fn orbit_normal(&self) -> Unit<Vector3<f64>> {
        self.orbit.orbit().normal_vector()
    }

    fn semimajor_axis(&self) -> f64 {
        self.orbit.orbit().semimajor_axis()
    }

    fn period(&self) -> Option<f64> {
        self.orbit.orbit().period()
    }

    fn primary_mu(&self) -> f64 {
        self.parent_mu
    }

    fn primary_id(&self) -> BodyID {
        self.parent_id
    }

    fn radius(&self) -> f64 {
        self.info.radius
    }
}
