//! Loads a body catalogue: one body per line, whitespace separated, after a
//! header line.
//!
//! ```text
//! name mu radius parent a ecc incl lan argp maae
//! ```
//!
//! Angles are in degrees, except the mean anomaly at epoch (radians). Root
//! bodies use `-` as their parent and stop after `parent`. Parents must be
//! listed before their children.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::astro::{Orbit, PointMass, TimedOrbit};
use crate::orrery::{BodyInfo, Orrery};

#[derive(Debug, Error)]
pub enum BodyFileError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: missing field `{field}`")]
    MissingField { line: usize, field: &'static str },
    #[error("line {line}: `{value}` is not a valid {field}")]
    BadNumber {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: unknown parent body `{parent}`")]
    UnknownParent { line: usize, parent: String },
    #[error("line {line}: {name} is not on a closed orbit")]
    OpenOrbit { line: usize, name: String },
    #[error("line {line}: semi-major axis {a} and eccentricity {ecc} of {name} disagree")]
    BadElements {
        line: usize,
        name: String,
        a: f64,
        ecc: f64,
    },
}

pub fn read_bodies(path: impl AsRef<Path>) -> Result<Orrery, BodyFileError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| BodyFileError::Io {
        path: path.to_owned(),
        source,
    })?;
    let orrery = parse_bodies(&contents)?;
    log::debug!("Loaded {} bodies from {}", orrery.bodies().count(), path.display());
    Ok(orrery)
}

struct Fields<'a, I> {
    inner: I,
    line: usize,
    _marker: std::marker::PhantomData<&'a str>,
}

impl<'a, I: Iterator<Item = &'a str>> Fields<'a, I> {
    fn next_str(&mut self, field: &'static str) -> Result<&'a str, BodyFileError> {
        self.inner.next().ok_or(BodyFileError::MissingField {
            line: self.line,
            field,
        })
    }

    fn next_f64(&mut self, field: &'static str) -> Result<f64, BodyFileError> {
        let value = self.next_str(field)?;
        match value.parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(x),
            _ => Err(BodyFileError::BadNumber {
                line: self.line,
                field,
                value: value.to_owned(),
            }),
        }
    }
}

pub fn parse_bodies(contents: &str) -> Result<Orrery, BodyFileError> {
    let mut orrery = Orrery::new();

    let mut name_to_id = HashMap::new();
    let mut name_to_mu = HashMap::new();

    // Read lines, skipping header
    for (index, line) in contents.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = Fields {
            inner: line.split_ascii_whitespace(),
            line: index + 1,
            _marker: std::marker::PhantomData,
        };

        let name = fields.next_str("name")?;
        let mu = fields.next_f64("mu")?;
        let body_info = BodyInfo {
            name: name.to_owned(),
            mu,
            radius: fields.next_f64("radius")?,
        };

        // Figure out what our orbit is
        let parent = fields.next_str("parent")?;

        let id = if parent == "-" {
            orrery.add_fixed_body(body_info)
        } else {
            let (parent_id, parent_mu) = match (name_to_id.get(parent), name_to_mu.get(parent)) {
                (Some(&id), Some(&mu)) => (id, mu),
                _ => {
                    return Err(BodyFileError::UnknownParent {
                        line: fields.line,
                        parent: parent.to_owned(),
                    })
                }
            };

            let a = fields.next_f64("a")?;
            let ecc = fields.next_f64("ecc")?;
            let incl = fields.next_f64("incl")?.to_radians();
            let lan = fields.next_f64("lan")?.to_radians();
            let argp = fields.next_f64("argp")?.to_radians();
            let maae = fields.next_f64("maae")?; // already in radians!

            // Ellipses have a > 0 and e < 1, hyperbolas a < 0 and e > 1
            if a == 0.0 || ecc < 0.0 || (a > 0.0) != (ecc < 1.0) {
                return Err(BodyFileError::BadElements {
                    line: fields.line,
                    name: name.to_owned(),
                    a,
                    ecc,
                });
            }

            let orbit =
                Orbit::from_kepler(PointMass::with_mu(parent_mu), (), a, ecc, incl, lan, argp);
            let timed = TimedOrbit::from_mean_anomaly(orbit, maae, 0.0).ok_or_else(|| {
                BodyFileError::OpenOrbit {
                    line: fields.line,
                    name: name.to_owned(),
                }
            })?;

            orrery.add_body(body_info, orbit, timed.time_at_periapsis(), parent_id)
        };
        name_to_id.insert(name, id);
        name_to_mu.insert(name, mu);
    }

    Ok(orrery)
}
