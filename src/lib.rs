//! Pure pursuit path tracking for a wheeled mobile robot.
//!
//! A [`PurePursuitFollower`] stores the path to track and turns each pose
//! estimate into a linear/angular velocity command. [`NavigationStack`] hosts
//! a follower behind a lifecycle so the embedding node can gate its output.
pub mod common;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod navigation;

pub use crate::common::types::{Pose2D, VelocityCommand, Waypoint};
pub use crate::config::PurePursuitConfig;
pub use crate::error::{ControllerError, Result};
pub use crate::lifecycle::{LifecycleNode, State};
pub use crate::navigation::path_follower::pure_pursuit::{PurePursuitFollower, PursuitStep};
pub use crate::navigation::path_follower::PathFollower;
pub use crate::navigation::NavigationStack;
