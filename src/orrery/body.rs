use crate::astro::{PointMass, TimedOrbit};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct BodyID(pub usize);

// All the immutable info about a body
#[derive(Debug, Clone)]
pub struct BodyInfo {
    pub name: String,
    pub mu: f64,
    pub radius: f64,
}

#[derive(Debug, Clone)]
pub enum BodyState {
    FixedAtOrigin,
    Orbiting {
        parent_id: BodyID,
        orbit: TimedOrbit<PointMass, ()>,
    },
}

#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyID,
    pub info: BodyInfo,
    pub state: BodyState,
}

impl Body {
    pub fn parent_id(&self) -> Option<BodyID> {
        match self.state {
            BodyState::FixedAtOrigin => None,
            BodyState::Orbiting { parent_id, .. } => Some(parent_id),
        }
    }

    pub fn orbit(&self) -> Option<&TimedOrbit<PointMass, ()>> {
        match &self.state {
            BodyState::FixedAtOrigin => None,
            BodyState::Orbiting { orbit, .. } => Some(orbit),
        }
    }
}
