//! Prelude module for common imports
//!
//! ```rust
//! use stagehand_scene::prelude::*;
//! ```

pub use crate::config::SceneConfig;
pub use crate::ecs::{Component, NodeBuilder, NodeId, StorageType, World};
pub use crate::error::{Result, SceneError};
pub use crate::math::{Quat, Vec3};
pub use crate::scene::{HideFlags, Transform, TransformMut};
