//! Staged spawning demo
//!
//! Builds a small patrol: a waypoint node, a guard that is handed the
//! waypoint before it wakes up, and a clone of that guard with its own route.
//!
//! Run with: cargo run -p stagehand --example staged_spawn
//! Set `RUST_LOG=trace` to also see every lifecycle hook.

use stagehand::prelude::*;
use stagehand_scene::{Component, NodeId, SceneConfig, Vec3, World};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Default)]
struct Waypoint {
    radius: f32,
}

impl Component for Waypoint {}

#[derive(Clone, Debug, Default)]
struct Guard {
    route: Vec<NodeId>,
    speed: f32,
}

impl Component for Guard {
    fn awake(&mut self) {
        tracing::info!(stops = self.route.len(), speed = self.speed, "guard awake");
    }
}

impl Initializable<(Vec<NodeId>, f32)> for Guard {
    fn init(&mut self, (route, speed): (Vec<NodeId>, f32)) -> anyhow::Result<()> {
        anyhow::ensure!(!route.is_empty(), "a guard needs at least one waypoint");
        self.route = route;
        self.speed = speed;
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let mut world = World::with_config(SceneConfig::debug());

    let mut waypoint = StagedNode::<Waypoint>::new(
        &mut world,
        StageOptions::new()
            .named("Gate")
            .with_position(Vec3::new(0.0, 0.0, 12.0)),
    )?;
    waypoint.as_component()?.radius = 1.5;
    tracing::info!(radius = waypoint.as_component()?.radius, "gate placed");
    let gate = waypoint.as_node()?;

    let mut guard = StagedNode::<Guard>::new(
        &mut world,
        StageOptions::new()
            .named("Guard")
            .with_position(Vec3::new(2.0, 0.0, 0.0)),
    )?;
    guard.init_with((vec![gate], 3.0))?;
    let first = guard.as_node()?;

    let mut twin = StagedNode::<Guard>::new(
        &mut world,
        StageOptions::clone_of(first).with_position(Vec3::new(-2.0, 0.0, 0.0)),
    )?;
    twin.init_with((vec![gate, first], 4.5))?;
    let second = twin.as_node()?;

    for node in [gate, first, second] {
        tracing::info!(
            name = world.name(node).unwrap_or_default(),
            active = world.active_self(node),
            position = ?world.world_transform(node)?.position,
            "spawned"
        );
    }
    Ok(())
}
