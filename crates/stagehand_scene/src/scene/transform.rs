//! Node transforms
//!
//! Every node owns a [`Transform`] relative to its parent. World-space values
//! are derived by composing transforms from the root down; scale is tracked
//! per axis and shear is ignored, so the derived world scale is "lossy" in the
//! same way a TRS hierarchy always is.

use crate::ecs::NodeId;
use crate::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position, rotation and scale relative to the parent node
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position relative to the parent
    pub position: Vec3,
    /// Rotation relative to the parent
    pub rotation: Quat,
    /// Scale relative to the parent
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No translation, no rotation, unit scale
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform at a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Set rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Treat `self` as a parent's world transform and place `local` under it
    pub fn compose(&self, local: &Transform) -> Transform {
        Transform {
            position: self.position
                + self
                    .rotation
                    .rotate_vec3(self.scale.mul_elements(local.position)),
            rotation: self.rotation * local.rotation,
            scale: self.scale.mul_elements(local.scale),
        }
    }

    /// Convert a world position into this (parent) space
    pub fn inverse_position(&self, world: Vec3) -> Vec3 {
        self.rotation
            .conjugate()
            .rotate_vec3(world - self.position)
            .div_nonzero(self.scale)
    }

    /// Convert a world rotation into this (parent) space
    pub fn inverse_rotation(&self, world: Quat) -> Quat {
        (self.rotation.conjugate() * world).normalize()
    }

    /// Convert a world scale into this (parent) space
    ///
    /// Axes where the parent scale is exactly zero keep the requested value.
    pub fn inverse_scale(&self, world: Vec3) -> Vec3 {
        world.div_nonzero(self.scale)
    }
}

/// Mutable view of a node's transform with world-space accessors
///
/// Obtained from [`World::transform`](crate::World::transform). While the
/// view is alive the world is borrowed, so the parent chain cannot change and
/// the cached parent transform stays exact.
pub struct TransformMut<'w> {
    node: NodeId,
    parent_world: Transform,
    local: &'w mut Transform,
}

impl<'w> TransformMut<'w> {
    pub(crate) fn new(node: NodeId, parent_world: Transform, local: &'w mut Transform) -> Self {
        Self {
            node,
            parent_world,
            local,
        }
    }

    /// The node this view belongs to
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Full local transform
    pub fn local(&self) -> Transform {
        *self.local
    }

    /// Full world transform
    pub fn world(&self) -> Transform {
        self.parent_world.compose(self.local)
    }

    pub fn local_position(&self) -> Vec3 {
        self.local.position
    }

    pub fn set_local_position(&mut self, position: Vec3) {
        self.local.position = position;
    }

    /// World-space position
    pub fn position(&self) -> Vec3 {
        self.world().position
    }

    /// Move to a world-space position
    pub fn set_position(&mut self, position: Vec3) {
        self.local.position = self.parent_world.inverse_position(position);
    }

    pub fn local_rotation(&self) -> Quat {
        self.local.rotation
    }

    pub fn set_local_rotation(&mut self, rotation: Quat) {
        self.local.rotation = rotation;
    }

    /// World-space rotation
    pub fn rotation(&self) -> Quat {
        self.world().rotation
    }

    /// Rotate to a world-space orientation
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.local.rotation = self.parent_world.inverse_rotation(rotation);
    }

    /// Local rotation as Euler angles (radians)
    pub fn local_euler_angles(&self) -> Vec3 {
        self.local.rotation.to_euler()
    }

    pub fn set_local_euler_angles(&mut self, angles: Vec3) {
        self.local.rotation = Quat::from_euler_vec(angles);
    }

    /// World rotation as Euler angles (radians)
    pub fn euler_angles(&self) -> Vec3 {
        self.rotation().to_euler()
    }

    pub fn set_euler_angles(&mut self, angles: Vec3) {
        self.set_rotation(Quat::from_euler_vec(angles));
    }

    /// Set world position and rotation together
    pub fn set_position_and_rotation(&mut self, position: Vec3, rotation: Quat) {
        self.set_position(position);
        self.set_rotation(rotation);
    }

    pub fn local_scale(&self) -> Vec3 {
        self.local.scale
    }

    pub fn set_local_scale(&mut self, scale: Vec3) {
        self.local.scale = scale;
    }

    /// Approximate world scale
    pub fn lossy_scale(&self) -> Vec3 {
        self.world().scale
    }

    /// World scale of the parent ([`Vec3::ONE`] for root nodes)
    pub fn parent_lossy_scale(&self) -> Vec3 {
        self.parent_world.scale
    }

    /// Set a world-space scale by dividing out the parent's lossy scale
    ///
    /// Axes where the parent scale is exactly zero take the requested value
    /// directly.
    pub fn set_lossy_scale(&mut self, scale: Vec3) {
        self.local.scale = self.parent_world.inverse_scale(scale);
    }
}
