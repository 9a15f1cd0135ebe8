//! Planner configuration, loaded from TOML.
//!
//! ```toml
//! bodies = "ksp-bodies.txt"
//!
//! [calendar]
//! preset = "kerbin"        # or "earth"
//! hours_per_day = 6        # any field overrides the preset
//!
//! [solver]
//! direction = "prograde"
//! sweep_resolution = 60
//!
//! [parking]
//! origin_altitude = 100000.0
//! destination_altitude = 100000.0
//! ```
//!
//! Every section and field is optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::astro::lambert::TransferDirection;
use crate::calendar::{Calendar, CalendarError};
use crate::transfer::TransferOptions;

const MIN_SWEEP_RESOLUTION: usize = 2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid calendar: {0}")]
    Calendar(#[from] CalendarError),
    #[error("parking altitude must be finite and non-negative, got {0} m")]
    ParkingAltitude(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarPreset {
    #[default]
    Kerbin,
    Earth,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarSection {
    pub preset: CalendarPreset,
    pub seconds_per_minute: Option<u32>,
    pub minutes_per_hour: Option<u32>,
    pub hours_per_day: Option<u32>,
    pub days_per_year: Option<u32>,
    pub epoch_year: Option<i32>,
    pub epoch_day: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSection {
    pub direction: TransferDirection,
    pub sweep_resolution: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParkingSection {
    pub origin_altitude: f64,
    pub destination_altitude: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Body catalogue to load, relative to the working directory.
    pub bodies: Option<PathBuf>,
    pub calendar: CalendarSection,
    pub solver: SolverSection,
    pub parking: ParkingSection,
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            direction: TransferDirection::Prograde,
            sweep_resolution: 60,
        }
    }
}

impl Default for ParkingSection {
    fn default() -> Self {
        let defaults = TransferOptions::default();
        Self {
            origin_altitude: defaults.origin_parking_altitude,
            destination_altitude: defaults.destination_parking_altitude,
        }
    }
}

impl CalendarSection {
    pub fn to_calendar(&self) -> Result<Calendar, CalendarError> {
        let base = match self.preset {
            CalendarPreset::Kerbin => Calendar::kerbin(),
            CalendarPreset::Earth => Calendar::earth(),
        };
        Calendar::new(
            self.seconds_per_minute.unwrap_or(base.seconds_per_minute()),
            self.minutes_per_hour.unwrap_or(base.minutes_per_hour()),
            self.hours_per_day.unwrap_or(base.hours_per_day()),
            self.days_per_year.unwrap_or(base.days_per_year()),
            self.epoch_year.unwrap_or(base.epoch_year()),
            self.epoch_day.unwrap_or(base.epoch_day()),
        )
    }
}

impl PlannerConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_toml(&contents)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if there is one, otherwise falls back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        self.calendar.to_calendar()?;

        for altitude in [self.parking.origin_altitude, self.parking.destination_altitude] {
            if !(altitude >= 0.0 && altitude.is_finite()) {
                return Err(ConfigError::ParkingAltitude(altitude));
            }
        }

        if self.solver.sweep_resolution < MIN_SWEEP_RESOLUTION {
            log::warn!(
                "sweep_resolution {} is too small, using {}",
                self.solver.sweep_resolution,
                MIN_SWEEP_RESOLUTION
            );
            self.solver.sweep_resolution = MIN_SWEEP_RESOLUTION;
        }

        Ok(())
    }

    pub fn calendar(&self) -> Result<Calendar, CalendarError> {
        self.calendar.to_calendar()
    }

    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions {
            origin_parking_altitude: self.parking.origin_altitude,
            destination_parking_altitude: self.parking.destination_altitude,
            direction: self.solver.direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::from_toml("").unwrap();
        assert_eq!(config.calendar().unwrap(), Calendar::kerbin());
        assert_eq!(config.calendar().unwrap().seconds_per_minute(), 60);
        assert_eq!(config.transfer_options(), TransferOptions::default());
        assert_eq!(config.solver.sweep_resolution, 60);
        assert!(config.bodies.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = PlannerConfig::from_toml(
            r#"
            bodies = "rss.txt"

            [calendar]
            preset = "earth"
            seconds_per_minute = 100
            epoch_year = 1951

            [solver]
            direction = "retrograde"
            sweep_resolution = 1

            [parking]
            origin_altitude = 250000.0
            "#,
        )
        .unwrap();

        let calendar = config.calendar().unwrap();
        assert_eq!(calendar.seconds_per_minute(), 100);
        assert_eq!(calendar.minutes_per_hour(), 60);
        assert_eq!(calendar.hours_per_day(), 24);
        assert_eq!(calendar.epoch_year(), 1951);
        assert_eq!(calendar.day_length(), 144_000.0);
        assert_eq!(config.bodies, Some(PathBuf::from("rss.txt")));

        let options = config.transfer_options();
        assert_eq!(options.direction, TransferDirection::Retrograde);
        assert_eq!(options.origin_parking_altitude, 250_000.0);
        assert_eq!(options.destination_parking_altitude, 100_000.0);

        // Too-small resolutions get bumped up rather than rejected
        assert_eq!(config.solver.sweep_resolution, MIN_SWEEP_RESOLUTION);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            PlannerConfig::from_toml("[calendar]\ndays_per_year = 0"),
            Err(ConfigError::Calendar(CalendarError::ZeroPeriod("days per year")))
        ));
        assert!(matches!(
            PlannerConfig::from_toml("[parking]\norigin_altitude = -5.0"),
            Err(ConfigError::ParkingAltitude(_))
        ));
        assert!(matches!(
            PlannerConfig::from_toml("[solver]\ndirection = \"sideways\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            PlannerConfig::from_toml("[parkng]\norigin_altitude = 1.0"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[calendar]\nhours_per_day = 12").unwrap();

        let config = PlannerConfig::load(file.path()).unwrap();
        assert_eq!(config.calendar().unwrap().hours_per_day(), 12);

        let missing = PlannerConfig::load("/definitely/not/here.toml");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let fallback = PlannerConfig::load_or_default(None).unwrap();
        assert_eq!(fallback.calendar().unwrap(), Calendar::kerbin());
    }
}
