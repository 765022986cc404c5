//! Error types for stagehand_scene

use crate::ecs::NodeId;
use thiserror::Error;

/// Errors that can occur while mutating the scene
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The node was despawned or never existed in this world
    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),

    /// Re-parenting would make a node its own ancestor
    #[error("cannot parent {child:?} under {parent:?}: it would create a cycle")]
    CyclicParent { child: NodeId, parent: NodeId },

    /// Configuration could not be parsed
    #[error("invalid scene configuration: {0}")]
    Config(String),
}

/// Result type for stagehand_scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
