//! Pure Pursuit path follower implementation

use super::PathFollower;
use crate::common::types::{normalize_angle, Pose2D, VelocityCommand, Waypoint};
use crate::config::{PurePursuitConfig, DEFAULT_LOOKAHEAD_DISTANCE};
use crate::error::Result;
use std::collections::HashMap;
use tracing::{debug, info, trace};

/// Pure Pursuit path follower for the robot.
///
/// Owns the path it tracks. Replacing the path while a command is being
/// computed is ruled out by `&mut self` on [`PurePursuitFollower::set_path`];
/// callers sharing a follower between threads wrap it in a lock.
#[derive(Debug, Clone, Default)]
pub struct PurePursuitFollower {
    config: PurePursuitConfig,
    path: Vec<Waypoint>,
}

/// Intermediate quantities of one control step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PursuitStep {
    pub closest_idx: usize,
    pub target: Waypoint,
    /// Heading error toward the target, in (-pi, pi]
    pub alpha: f64,
    /// Distance from the robot to the target
    pub distance: f64,
    pub command: VelocityCommand,
}

impl PurePursuitFollower {
    /// Create a follower with sampling period `dt` [s] and `lookahead_distance` [m].
    pub fn new(dt: f64, lookahead_distance: f64) -> Result<Self> {
        Self::from_config(PurePursuitConfig::new(dt, lookahead_distance))
    }

    /// Create a follower with the default lookahead distance.
    pub fn with_dt(dt: f64) -> Result<Self> {
        Self::new(dt, DEFAULT_LOOKAHEAD_DISTANCE)
    }

    pub fn from_config(config: PurePursuitConfig) -> Result<Self> {
        config.validate()?;
        Ok(PurePursuitFollower {
            config,
            path: Vec::new(),
        })
    }

    pub fn config(&self) -> &PurePursuitConfig {
        &self.config
    }

    pub fn dt(&self) -> f64 {
        self.config.dt
    }

    pub fn lookahead_distance(&self) -> f64 {
        self.config.lookahead_distance
    }

    /// Find the path point closest to (x, y) and its index.
    ///
    /// On an empty path the query position itself comes back with index 0.
    pub fn find_closest_point(&self, x: f64, y: f64) -> (Waypoint, usize) {
        let mut closest = match self.path.first() {
            Some(&first) => (first, 0),
            None => return (Waypoint::new(x, y), 0),
        };
        let mut d_min = closest.0.distance_to(x, y);

        for (i, point) in self.path.iter().enumerate().skip(1) {
            let d = point.distance_to(x, y);
            if d < d_min {
                d_min = d;
                closest = (*point, i);
            }
        }

        closest
    }

    /// Find the first path point from `origin_idx` onward that lies at least
    /// the lookahead distance away from `origin`, or the last path point if
    /// none does.
    pub fn find_target_point(&self, origin: Waypoint, origin_idx: usize) -> Waypoint {
        let Some(&last) = self.path.last() else {
            return origin;
        };

        self.path
            .iter()
            .skip(origin_idx)
            .find(|point| point.distance_to(origin.x, origin.y) >= self.config.lookahead_distance)
            .copied()
            .unwrap_or(last)
    }

    /// Compute (v, w) for the pose (x, y, theta).
    pub fn compute_commands(&self, x: f64, y: f64, theta: f64) -> (f64, f64) {
        self.compute_velocity(Pose2D::new(x, y, theta)).into()
    }

    /// Run one control step, exposing the target selection alongside the command.
    ///
    /// Returns `None` when there is no path to track.
    pub fn step(&self, pose: Pose2D) -> Option<PursuitStep> {
        if self.path.is_empty() {
            return None;
        }

        let (_, closest_idx) = self.find_closest_point(pose.x, pose.y);
        let target = self.find_target_point(Waypoint::new(pose.x, pose.y), closest_idx);

        let angle_to_target = (target.y - pose.y).atan2(target.x - pose.x);
        let alpha = normalize_angle(angle_to_target - pose.theta);
        let distance = target.distance_to(pose.x, pose.y);

        let linear = self.config.linear_velocity;
        let angular = if distance > 0.0 {
            linear * 2.0 * alpha.sin() / distance
        } else {
            0.0
        };

        trace!(
            closest_idx,
            target_x = target.x,
            target_y = target.y,
            alpha,
            distance,
            "pure pursuit step"
        );

        Some(PursuitStep {
            closest_idx,
            target,
            alpha,
            distance,
            command: VelocityCommand { linear, angular },
        })
    }
}

impl PathFollower for PurePursuitFollower {
    fn set_path(&mut self, path: Vec<Waypoint>) {
        info!("Pure Pursuit: tracking path with {} points", path.len());
        self.path = path;
    }

    fn path(&self) -> &[Waypoint] {
        &self.path
    }

    fn compute_velocity(&self, pose: Pose2D) -> VelocityCommand {
        match self.step(pose) {
            Some(step) => step.command,
            None => {
                debug!("Pure Pursuit: empty path, commanding stop");
                VelocityCommand::STOP
            }
        }
    }

    fn name(&self) -> &str {
        "PurePursuitFollower"
    }

    fn configure(&mut self, params: &HashMap<String, f64>) -> Result<()> {
        self.config.apply_params(params)?;
        info!(
            "Pure Pursuit: dt={}, lookahead_distance={}, linear_velocity={}",
            self.config.dt, self.config.lookahead_distance, self.config.linear_velocity
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControllerError;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn follower(lookahead: f64, path: &[(f64, f64)]) -> PurePursuitFollower {
        let mut follower = PurePursuitFollower::new(0.1, lookahead).unwrap();
        follower.set_path(path.iter().copied().map(Waypoint::from).collect());
        follower
    }

    #[test]
    fn rejects_non_positive_lookahead() {
        for lookahead in [0.0, -0.5] {
            assert!(matches!(
                PurePursuitFollower::new(0.1, lookahead),
                Err(ControllerError::InvalidParameter {
                    name: "lookahead_distance",
                    ..
                })
            ));
        }
    }

    #[test]
    fn dt_is_stored_unchecked() {
        let follower = PurePursuitFollower::new(0.0, 0.5).unwrap();
        assert_eq!(follower.dt(), 0.0);
    }

    #[test]
    fn default_lookahead() {
        let follower = PurePursuitFollower::with_dt(0.05).unwrap();
        assert_eq!(follower.lookahead_distance(), 0.5);
        assert_eq!(follower.dt(), 0.05);
        assert!(follower.path().is_empty());
    }

    #[test]
    fn empty_path_stops() {
        let follower = follower(0.5, &[]);
        for (x, y, theta) in [(0.0, 0.0, 0.0), (-3.0, 7.5, 2.0), (1e6, -1e6, -PI)] {
            assert_eq!(follower.compute_commands(x, y, theta), (0.0, 0.0));
        }
        assert!(follower.step(Pose2D::default()).is_none());
    }

    #[test]
    fn empty_path_locator_and_selector_pass_through() {
        let follower = follower(0.5, &[]);
        assert_eq!(
            follower.find_closest_point(1.5, -2.0),
            (Waypoint::new(1.5, -2.0), 0)
        );
        let origin = Waypoint::new(4.0, 4.0);
        assert_eq!(follower.find_target_point(origin, 3), origin);
    }

    #[test]
    fn closest_point_is_minimal() {
        let path = [(0.0, 0.0), (1.0, 0.5), (2.0, 1.0), (3.0, 0.0), (1.2, 0.4)];
        let follower = follower(0.5, &path);
        let queries = [(0.0, 0.0), (1.1, 0.45), (2.5, 2.0), (10.0, -3.0), (-5.0, 0.0)];
        for (x, y) in queries {
            let (point, idx) = follower.find_closest_point(x, y);
            assert_eq!(follower.path()[idx], point);
            let d = point.distance_to(x, y);
            assert!(follower.path().iter().all(|p| p.distance_to(x, y) >= d));
        }
    }

    #[test]
    fn closest_point_ties_go_to_first() {
        let follower = follower(0.5, &[(1.0, 0.0), (-1.0, 0.0), (1.0, 0.0)]);
        assert_eq!(follower.find_closest_point(0.0, 0.0).1, 0);
        assert_eq!(follower.find_closest_point(1.0, 0.0).1, 0);
    }

    #[test]
    fn target_is_first_point_beyond_lookahead() {
        let path = [(0.0, 0.0), (0.3, 0.0), (0.6, 0.0), (0.9, 0.0), (1.2, 0.0)];
        let follower = follower(0.5, &path);
        let target = follower.find_target_point(Waypoint::new(0.0, 0.0), 0);
        assert_eq!(target, Waypoint::new(0.6, 0.0));
    }

    #[test]
    fn target_threshold_is_inclusive() {
        let follower = follower(0.5, &[(0.0, 0.0), (0.5, 0.0), (1.0, 0.0)]);
        let target = follower.find_target_point(Waypoint::new(0.0, 0.0), 0);
        assert_eq!(target, Waypoint::new(0.5, 0.0));
    }

    #[test]
    fn target_never_looks_back() {
        // Index 0 qualifies by distance but lies before the origin index
        let follower = follower(1.0, &[(-5.0, 0.0), (0.0, 0.0), (0.2, 0.0), (3.0, 0.0)]);
        let target = follower.find_target_point(Waypoint::new(0.0, 0.0), 1);
        assert_eq!(target, Waypoint::new(3.0, 0.0));
    }

    #[test]
    fn target_defaults_to_last_point() {
        let follower = follower(5.0, &[(0.0, 0.0), (1.0, 0.0), (0.5, 0.5)]);
        let target = follower.find_target_point(Waypoint::new(0.0, 0.0), 0);
        assert_eq!(target, Waypoint::new(0.5, 0.5));
        // An origin index past the end also falls back to the last point
        assert_eq!(
            follower.find_target_point(Waypoint::new(0.0, 0.0), 10),
            Waypoint::new(0.5, 0.5)
        );
    }

    #[test]
    fn straight_path_scenario() {
        let follower = follower(0.5, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let step = follower.step(Pose2D::new(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(step.closest_idx, 0);
        assert_eq!(step.target, Waypoint::new(1.0, 0.0));
        assert_abs_diff_eq!(step.alpha, 0.0);
        assert_abs_diff_eq!(step.command.linear, 0.3);
        assert_abs_diff_eq!(step.command.angular, 0.0);
    }

    #[test]
    fn lookahead_beyond_path_end_scenario() {
        let follower = follower(5.0, &[(0.0, 0.0), (1.0, 0.0)]);
        let step = follower.step(Pose2D::new(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(step.target, Waypoint::new(1.0, 0.0));
        assert_abs_diff_eq!(step.distance, 1.0);
        assert_abs_diff_eq!(step.alpha, 0.0);
        assert_abs_diff_eq!(step.command.angular, 0.0);
    }

    #[test]
    fn facing_target_scenario() {
        let follower = follower(0.5, &[(0.0, 0.0), (0.0, 1.0)]);
        let (v, w) = follower.compute_commands(0.0, 0.0, FRAC_PI_2);
        assert_abs_diff_eq!(v, 0.3);
        assert_abs_diff_eq!(w, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn at_target_gives_zero_turn_rate() {
        // Single point path: the robot sits on the target, L = 0
        let follower = follower(0.5, &[(2.0, 3.0)]);
        let step = follower.step(Pose2D::new(2.0, 3.0, 1.0)).unwrap();
        assert_eq!(step.distance, 0.0);
        assert_eq!(step.command.angular, 0.0);
        assert_eq!(step.command.linear, 0.3);
    }

    #[test]
    fn heading_error_is_wrapped() {
        // Bearing to target is 3.0 rad while the heading is -3.0 rad
        let target = (3.0_f64.cos(), 3.0_f64.sin());
        let follower = follower(0.5, &[(0.0, 0.0), target]);
        let step = follower.step(Pose2D::new(0.0, 0.0, -3.0)).unwrap();
        assert!(step.alpha > -PI && step.alpha <= PI);
        assert_abs_diff_eq!(step.alpha, 6.0 - 2.0 * PI, epsilon = 1e-9);
    }

    #[test]
    fn turns_toward_target() {
        let follower = follower(0.5, &[(0.0, 0.0), (1.0, 1.0)]);
        let step = follower.step(Pose2D::new(0.0, 0.0, 0.0)).unwrap();
        // Target 45 degrees to the left at distance sqrt(2)
        assert_abs_diff_eq!(step.alpha, PI / 4.0, epsilon = 1e-12);
        let expected = 0.3 * 2.0 * (PI / 4.0).sin() / 2.0_f64.sqrt();
        assert_abs_diff_eq!(step.command.angular, expected, epsilon = 1e-12);

        let (_, w) = follower.compute_commands(0.0, 0.0, FRAC_PI_2);
        assert!(w < 0.0);
    }

    #[test]
    fn set_path_replaces_wholesale() {
        let mut follower = follower(0.5, &[(0.0, 0.0), (1.0, 0.0)]);
        follower.set_path(vec![Waypoint::new(5.0, 5.0)]);
        assert_eq!(follower.path(), &[Waypoint::new(5.0, 5.0)]);
        follower.set_path(Vec::new());
        assert!(follower.path().is_empty());
    }

    #[test]
    fn configure_updates_lookahead() {
        let mut follower = follower(0.5, &[(0.0, 0.0), (0.6, 0.0), (2.0, 0.0)]);
        let mut params = HashMap::new();
        params.insert("lookahead_distance".to_string(), 1.0);
        follower.configure(&params).unwrap();
        assert_eq!(
            follower.find_target_point(Waypoint::new(0.0, 0.0), 0),
            Waypoint::new(2.0, 0.0)
        );

        params.insert("lookahead_distance".to_string(), 0.0);
        assert!(follower.configure(&params).is_err());
        assert_eq!(follower.lookahead_distance(), 1.0);
    }
}
