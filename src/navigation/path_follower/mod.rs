//! Path following algorithms

use crate::common::types::{Pose2D, VelocityCommand, Waypoint};
use crate::error::Result;
use std::collections::HashMap;
use std::fmt::Debug;

/// Trait for path following algorithms that own the path they track
pub trait PathFollower: Debug + Send {
    /// Replace the stored path wholesale
    fn set_path(&mut self, path: Vec<Waypoint>);

    /// Read access to the stored path
    fn path(&self) -> &[Waypoint];

    /// Compute velocity commands toward the stored path from `pose`
    fn compute_velocity(&self, pose: Pose2D) -> VelocityCommand;

    /// Get the name of this path follower
    fn name(&self) -> &str;

    /// Configure the path follower with parameters
    fn configure(&mut self, params: &HashMap<String, f64>) -> Result<()>;
}

pub mod pure_pursuit;

pub use pure_pursuit::PurePursuitFollower as DefaultPathFollower;
