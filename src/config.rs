//! Controller configuration

use crate::error::{ensure_positive, ControllerError, Result};
use ::config::{Config, Environment, File, FileFormat};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_DT: f64 = 0.1;
pub const DEFAULT_LOOKAHEAD_DISTANCE: f64 = 0.5;
pub const DEFAULT_LINEAR_VELOCITY: f64 = 0.3;

/// Pure pursuit parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurePursuitConfig {
    /// Sampling period [s]. Stored for the caller's control loop, unused by the control law.
    pub dt: f64,
    /// Distance to the next target point [m]
    pub lookahead_distance: f64,
    /// Cruising linear velocity [m/s]
    pub linear_velocity: f64,
}

impl Default for PurePursuitConfig {
    fn default() -> Self {
        PurePursuitConfig {
            dt: DEFAULT_DT,
            lookahead_distance: DEFAULT_LOOKAHEAD_DISTANCE,
            linear_velocity: DEFAULT_LINEAR_VELOCITY,
        }
    }
}

impl PurePursuitConfig {
    pub fn new(dt: f64, lookahead_distance: f64) -> Self {
        PurePursuitConfig {
            dt,
            lookahead_distance,
            ..Default::default()
        }
    }

    /// Reject a non-positive lookahead distance or cruise speed.
    ///
    /// `dt` is not checked here: the control law never reads it, and the
    /// loop that schedules on it validates it.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("lookahead_distance", self.lookahead_distance)?;
        ensure_positive("linear_velocity", self.linear_velocity)?;
        Ok(())
    }

    /// Apply a string-keyed parameter map on top of this configuration.
    ///
    /// The map is applied all-or-nothing: an unknown key or an invalid value
    /// leaves `self` untouched.
    pub fn apply_params(&mut self, params: &HashMap<String, f64>) -> Result<()> {
        let mut updated = *self;
        for (key, &value) in params {
            match key.as_str() {
                "dt" => updated.dt = value,
                "lookahead_distance" => updated.lookahead_distance = value,
                "linear_velocity" => updated.linear_velocity = value,
                other => return Err(ControllerError::UnknownParameter(other.to_string())),
            }
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

/// Load a settings struct from a TOML file layered with `AMR_` environment
/// variables (`AMR_CONTROLLER__LOOKAHEAD_DISTANCE=1.0`).
///
/// A missing file is not an error; every field falls back to its serde default.
pub fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    info!("Loading configuration from {}", path.display());

    let settings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("AMR")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let loaded = settings.try_deserialize()?;
    debug!("Configuration loaded from {}", path.display());
    Ok(loaded)
}
