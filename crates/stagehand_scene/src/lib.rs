//! # Stagehand Scene
//!
//! A small scene graph with an activation lifecycle.
//!
//! This crate provides:
//! - **Nodes** with names, hide flags, a hierarchy and local transforms
//! - **Components** with `awake` / `on_enable` / `on_disable` hooks
//! - **Activation** that propagates through the hierarchy and fires hooks
//! - **Instantiation** of whole subtrees
//!
//! ## Quick Start
//!
//! ```rust
//! use stagehand_scene::prelude::*;
//!
//! let mut world = World::new();
//! let parent = world.spawn("Parent").id();
//! let child = world.spawn("Child").parent(parent)?.id();
//!
//! world.transform(child)?.set_position(Vec3::new(1.0, 2.0, 3.0));
//! world.set_active(parent, false)?;
//! assert!(!world.active_in_hierarchy(child));
//! # Ok::<(), stagehand_scene::SceneError>(())
//! ```

pub mod config;
pub mod ecs;
pub mod error;
pub mod math;
pub mod scene;

pub mod prelude;

pub use config::SceneConfig;
pub use ecs::{Component, ComponentSlot, NodeBuilder, NodeId, NodeMeta, StorageType, World};
pub use error::{Result, SceneError};
pub use math::{Quat, Vec3};
pub use scene::{HideFlags, Transform, TransformMut};
