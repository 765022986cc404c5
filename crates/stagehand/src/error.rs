//! Error types for stagehand

use stagehand_scene::SceneError;
use thiserror::Error;

/// Errors that can occur while staging or initializing a node
#[derive(Error, Debug)]
pub enum StageError {
    /// The underlying scene operation failed
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Both a quaternion rotation and Euler angles were requested
    #[error("rotation and euler_angles cannot both be set")]
    ConflictingRotation,

    /// A positional token pointed past the end of the sibling list
    #[error("no sibling component at position {index} ({len} available)")]
    MissingSibling { index: usize, len: usize },

    /// Initialization was requested again after it already ran
    #[error("staged {0} is already initialized")]
    AlreadyInitialized(&'static str),

    /// The component expected on the staged node is not there
    #[error("component {0} is not attached to the staged node")]
    ComponentMissing(&'static str),

    /// The component rejected its initialization arguments
    #[error("initializing {component} failed")]
    Init {
        component: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Result type for stagehand operations
pub type Result<T> = std::result::Result<T, StageError>;
