//! Common utilities and types for the path tracking controller

/// Common types shared by the path follower and its host
pub mod types {
    use nalgebra::Point2;
    use serde::{Deserialize, Serialize};
    use std::f64::consts::PI;

    /// A single (x, y) point of a path, in meters
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Waypoint {
        pub x: f64,
        pub y: f64,
    }

    impl Waypoint {
        pub const fn new(x: f64, y: f64) -> Self {
            Waypoint { x, y }
        }

        /// Euclidean distance to the planar position (x, y)
        pub fn distance_to(&self, x: f64, y: f64) -> f64 {
            nalgebra::distance(&self.to_point(), &Point2::new(x, y))
        }

        pub fn to_point(self) -> Point2<f64> {
            Point2::new(self.x, self.y)
        }
    }

    impl From<(f64, f64)> for Waypoint {
        fn from((x, y): (f64, f64)) -> Self {
            Waypoint::new(x, y)
        }
    }

    impl From<[f64; 2]> for Waypoint {
        fn from([x, y]: [f64; 2]) -> Self {
            Waypoint::new(x, y)
        }
    }

    impl From<Waypoint> for (f64, f64) {
        fn from(p: Waypoint) -> Self {
            (p.x, p.y)
        }
    }

    /// Estimated robot pose: position in meters, heading in radians
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct Pose2D {
        pub x: f64,
        pub y: f64,
        pub theta: f64,
    }

    impl Pose2D {
        pub const fn new(x: f64, y: f64, theta: f64) -> Self {
            Pose2D { x, y, theta }
        }
    }

    impl From<(f64, f64, f64)> for Pose2D {
        fn from((x, y, theta): (f64, f64, f64)) -> Self {
            Pose2D::new(x, y, theta)
        }
    }

    impl From<[f64; 3]> for Pose2D {
        fn from([x, y, theta]: [f64; 3]) -> Self {
            Pose2D::new(x, y, theta)
        }
    }

    /// Velocity command for the robot
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct VelocityCommand {
        /// Linear velocity [m/s]
        pub linear: f64,
        /// Angular velocity [rad/s]
        pub angular: f64,
    }

    impl VelocityCommand {
        pub const STOP: VelocityCommand = VelocityCommand {
            linear: 0.0,
            angular: 0.0,
        };

        pub fn is_stop(&self) -> bool {
            self.linear == 0.0 && self.angular == 0.0
        }
    }

    impl From<VelocityCommand> for (f64, f64) {
        fn from(cmd: VelocityCommand) -> Self {
            (cmd.linear, cmd.angular)
        }
    }

    /// Wrap an angle into (-pi, pi] using atan2 of its sine and cosine.
    pub fn normalize_angle(angle: f64) -> f64 {
        let wrapped = angle.sin().atan2(angle.cos());
        // atan2 may return -pi for inputs sitting on the cut
        if wrapped <= -PI {
            PI
        } else {
            wrapped
        }
    }
}
