//! Construction options for staged nodes.

use crate::error::{Result, StageError};
use serde::{Deserialize, Serialize};
use stagehand_scene::{HideFlags, NodeId, Quat, Vec3};

/// Everything a staged node can be created or cloned with.
///
/// Unset fields leave the engine defaults alone. `rotation` and
/// `euler_angles` are mutually exclusive.
///
/// Spatial values are local unless `world_space` is set *and* the node has a
/// parent; without a parent local and world space coincide.
///
/// # Example
///
/// ```rust
/// use stagehand::StageOptions;
/// use stagehand_scene::Vec3;
///
/// let options = StageOptions::new()
///     .named("Enemy")
///     .with_position(Vec3::new(0.0, 1.0, 0.0))
///     .active(false);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageOptions {
    /// Node name; defaults to the component type name (or the original's
    /// name plus the clone suffix when cloning)
    pub name: Option<String>,
    /// Parent to attach the node to
    #[serde(skip)]
    pub parent: Option<NodeId>,
    /// Position, local unless `world_space`
    pub position: Option<Vec3>,
    /// Rotation, local unless `world_space`
    pub rotation: Option<Quat>,
    /// Rotation as Euler angles in radians, local unless `world_space`
    pub euler_angles: Option<Vec3>,
    /// Scale, local unless `world_space`
    pub scale: Option<Vec3>,
    /// Interpret spatial values in world space
    pub world_space: bool,
    /// Final activation state once initialized
    ///
    /// Fresh nodes default to active. Clones default to the original's
    /// own active flag.
    pub active: Option<bool>,
    /// Hide flags to apply to the node
    pub hide_flags: Option<HideFlags>,
    /// Node to clone instead of creating a fresh one
    #[serde(skip)]
    pub clone_from: Option<NodeId>,
}

impl StageOptions {
    /// Options for a fresh node with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for cloning `original`
    pub fn clone_of(original: NodeId) -> Self {
        Self {
            clone_from: Some(original),
            ..Self::default()
        }
    }

    /// Set the node name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the parent node
    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Set the rotation as Euler angles (radians)
    pub fn with_euler_angles(mut self, angles: Vec3) -> Self {
        self.euler_angles = Some(angles);
        self
    }

    /// Set the scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Interpret spatial values in world space
    pub fn in_world_space(mut self, world_space: bool) -> Self {
        self.world_space = world_space;
        self
    }

    /// Set the final activation state
    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Set hide flags
    pub fn with_hide_flags(mut self, flags: HideFlags) -> Self {
        self.hide_flags = Some(flags);
        self
    }

    /// Clone `original` instead of creating a fresh node
    pub fn cloned_from(mut self, original: NodeId) -> Self {
        self.clone_from = Some(original);
        self
    }

    /// Check that the options can be applied together
    pub fn validate(&self) -> Result<()> {
        if self.rotation.is_some() && self.euler_angles.is_some() {
            return Err(StageError::ConflictingRotation);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_rotation_rejected() {
        let options = StageOptions::new()
            .with_rotation(Quat::IDENTITY)
            .with_euler_angles(Vec3::ZERO);

        assert!(matches!(
            options.validate(),
            Err(StageError::ConflictingRotation)
        ));
    }

    #[test]
    fn test_defaults() {
        let options = StageOptions::new();

        assert_eq!(options.active, None);
        assert!(!options.world_space);
        assert!(options.clone_from.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let options: StageOptions = toml::from_str(
            r#"
            name = "Turret"
            world_space = true
            active = false
            hide_flags = 4

            [position]
            x = 1.0
            y = 2.0
            z = 3.0
            "#,
        )
        .unwrap();

        assert_eq!(options.name.as_deref(), Some("Turret"));
        assert_eq!(options.position, Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(options.hide_flags, Some(HideFlags::DONT_SAVE));
        assert_eq!(options.active, Some(false));
        assert!(options.world_space);
        assert!(options.parent.is_none());
    }
}
