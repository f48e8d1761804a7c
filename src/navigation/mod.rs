//! Navigation module hosting the path follower
pub mod path_follower;

use self::path_follower::{DefaultPathFollower, PathFollower};
use crate::common::types::{Pose2D, VelocityCommand, Waypoint};
use crate::error::Result;
use crate::lifecycle::{LifecycleNode, LifecycleNodeBase, State};
use std::collections::HashMap;
use tracing::{debug, info};

/// Navigation stack for the robot.
///
/// Commands are only produced while the stack is active; in every other
/// lifecycle state it commands a stop.
#[derive(Debug)]
pub struct NavigationStack {
    base: LifecycleNodeBase,
    path_follower: Box<dyn PathFollower>,
}

impl NavigationStack {
    /// Create a new navigation stack with the default path follower
    pub fn new() -> Self {
        Self::with_path_follower(DefaultPathFollower::default())
    }

    /// Create a new navigation stack with a specific path follower
    pub fn with_path_follower<T: PathFollower + 'static>(path_follower: T) -> Self {
        NavigationStack {
            base: LifecycleNodeBase::new("navigation_stack"),
            path_follower: Box::new(path_follower),
        }
    }

    /// Swap the path follower. The stored path carries over.
    pub fn set_path_follower<T: PathFollower + 'static>(&mut self, mut path_follower: T) {
        path_follower.set_path(self.path_follower.path().to_vec());
        self.path_follower = Box::new(path_follower);
    }

    /// Configure the path follower
    pub fn configure_path_follower(&mut self, params: &HashMap<String, f64>) -> Result<()> {
        self.path_follower.configure(params)
    }

    /// Get the name of the current path follower
    pub fn path_follower_name(&self) -> &str {
        self.path_follower.name()
    }

    /// Set the current path to follow
    pub fn set_path<I, P>(&mut self, path: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<Waypoint>,
    {
        self.path_follower
            .set_path(path.into_iter().map(Into::into).collect());
    }

    /// The path currently tracked
    pub fn path(&self) -> &[Waypoint] {
        self.path_follower.path()
    }

    pub fn state(&self) -> State {
        self.base.get_state()
    }

    /// Compute velocity command for the current pose
    pub fn compute_velocity_command(&self, pose: impl Into<Pose2D>) -> VelocityCommand {
        if !self.base.is_active() {
            debug!(state = ?self.base.get_state(), "navigation stack not active, commanding stop");
            return VelocityCommand::STOP;
        }

        self.path_follower.compute_velocity(pose.into())
    }
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleNode for NavigationStack {
    fn on_configure(&mut self) -> Result<()> {
        info!("Configuring navigation stack with {}", self.path_follower_name());
        self.base.transition(State::Unconfigured, State::Inactive)
    }

    fn on_activate(&mut self) -> Result<()> {
        info!("Activating navigation stack");
        self.base.transition(State::Inactive, State::Active)
    }

    fn on_deactivate(&mut self) -> Result<()> {
        info!("Deactivating navigation stack");
        self.base.transition(State::Active, State::Inactive)
    }

    fn on_cleanup(&mut self) -> Result<()> {
        info!("Cleaning up navigation stack");
        self.base.transition(State::Inactive, State::Unconfigured)?;
        self.path_follower.set_path(Vec::new());
        Ok(())
    }
}
