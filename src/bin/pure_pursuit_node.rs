use amr_control::{
    config, LifecycleNode, NavigationStack, Pose2D, PurePursuitConfig, PurePursuitFollower,
    VelocityCommand, Waypoint,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config/pure_pursuit.toml";

#[derive(Debug, Deserialize)]
#[serde(default)]
struct NodeConfig {
    controller: PurePursuitConfig,
    path: Vec<[f64; 2]>,
    initial_pose: [f64; 3],
    goal_tolerance: f64,
    max_steps: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            controller: PurePursuitConfig::default(),
            path: vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [2.0, 2.0]],
            initial_pose: [0.0, -0.2, 0.0],
            goal_tolerance: 0.1,
            max_steps: 600,
        }
    }
}

/// Unicycle model standing in for the motion estimation and actuation nodes
struct SimulatedBase {
    pose: Pose2D,
}

impl SimulatedBase {
    fn apply(&mut self, cmd: VelocityCommand, dt: f64) {
        let theta = self.pose.theta;
        self.pose.x += cmd.linear * theta.cos() * dt;
        self.pose.y += cmd.linear * theta.sin() * dt;
        self.pose.theta += cmd.angular * dt;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let node_config: NodeConfig =
        config::load(&config_path).with_context(|| format!("loading {}", config_path))?;

    info!(
        "Using parameters: dt={}, lookahead_distance={}, linear_velocity={}",
        node_config.controller.dt,
        node_config.controller.lookahead_distance,
        node_config.controller.linear_velocity
    );

    let follower = PurePursuitFollower::from_config(node_config.controller)
        .context("invalid controller parameters")?;
    let dt = follower.dt();
    if !dt.is_finite() || dt <= 0.0 {
        anyhow::bail!("controller.dt must be a positive number of seconds, got {}", dt);
    }

    let mut stack = NavigationStack::with_path_follower(follower);
    stack.on_configure()?;
    stack.on_activate()?;
    stack.set_path(node_config.path.iter().copied().map(Waypoint::from));
    let goal = stack.path().last().copied();

    let mut base = SimulatedBase {
        pose: Pose2D::from(node_config.initial_pose),
    };

    let mut ticker = interval(Duration::from_secs_f64(dt));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut reached = false;
    for step in 0..node_config.max_steps {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, stopping control loop");
                break;
            }
        }

        if let Some(goal) = goal {
            if goal.distance_to(base.pose.x, base.pose.y) < node_config.goal_tolerance {
                info!(step, "Goal reached at ({:.2}, {:.2})", goal.x, goal.y);
                reached = true;
                break;
            }
        }

        // The path is only replaced between ticks, so no lock is needed here
        let cmd = stack.compute_velocity_command(base.pose);

        info!(
            step,
            x = base.pose.x,
            y = base.pose.y,
            theta = base.pose.theta,
            "Pure Pursuit velocity: linear={:.2}, angular={:.2}",
            cmd.linear,
            cmd.angular
        );
        base.apply(cmd, dt);
    }

    info!("Commanding stop");
    base.apply(VelocityCommand::STOP, dt);
    if !reached {
        warn!("Control loop ended before reaching the goal");
    }

    stack.on_deactivate()?;
    stack.on_cleanup()?;

    Ok(())
}
