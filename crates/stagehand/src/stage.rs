//! Staging core shared by the single- and multi-component builders
//!
//! A stage owns a node from the moment it is created (or cloned) until its
//! components have been initialized. The node is kept inactive the whole
//! time; only [`Stage::on_after_init`] (or its failure twin
//! [`Stage::on_before_exception`]) may activate it.

use crate::error::{Result, StageError};
use crate::init::{ComponentRef, Initializable, SiblingRef};
use crate::options::StageOptions;
use crate::token::{resolve_sibling, Position};
use stagehand_scene::{Component, NodeId, World};
use std::any::type_name;

/// Whether the staged node exists yet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    /// Deferred construction: the node is created on first initialization
    Unallocated,
    /// The node exists and is owned by the stage
    Allocated(NodeId),
}

impl NodeState {
    /// The node, if allocated
    pub fn node(&self) -> Option<NodeId> {
        match self {
            NodeState::Unallocated => None,
            NodeState::Allocated(node) => Some(*node),
        }
    }
}

pub(crate) struct Stage<'w> {
    world: &'w mut World,
    state: NodeState,
    leave_inactive: bool,
    is_clone: bool,
    initialized: bool,
    default_name: &'static str,
}

impl<'w> Stage<'w> {
    /// A stage whose node is created lazily by [`Stage::on_before_init`]
    pub(crate) fn deferred(world: &'w mut World, default_name: &'static str) -> Self {
        Self {
            world,
            state: NodeState::Unallocated,
            leave_inactive: false,
            is_clone: false,
            initialized: false,
            default_name,
        }
    }

    /// Create or clone a node according to `options`, leaving it inactive
    pub(crate) fn new(
        world: &'w mut World,
        options: &StageOptions,
        default_name: &'static str,
    ) -> Result<Self> {
        options.validate()?;

        let (node, requested_active, is_clone) = match options.clone_from {
            Some(original) => {
                let (node, original_active) = clone_inactive(world, original, options.parent)?;
                if let Some(name) = &options.name {
                    world.set_name(node, name.clone())?;
                }
                (node, options.active.unwrap_or(original_active), true)
            }
            None => {
                let name = options.name.as_deref().unwrap_or(default_name);
                let node = world.spawn(name).inactive().id();
                if let Some(parent) = options.parent {
                    world.set_parent(node, Some(parent), true)?;
                }
                (node, options.active.unwrap_or(true), false)
            }
        };

        if let Some(flags) = options.hide_flags {
            world.set_hide_flags(node, flags)?;
        }
        apply_spatial(world, node, options)?;

        tracing::debug!(
            ?node,
            name = world.name(node).unwrap_or_default(),
            is_clone,
            active = requested_active,
            "staged node"
        );

        Ok(Self {
            world,
            state: NodeState::Allocated(node),
            leave_inactive: !requested_active,
            is_clone,
            initialized: false,
            default_name,
        })
    }

    pub(crate) fn world(&mut self) -> &mut World {
        self.world
    }

    pub(crate) fn world_ref(&self) -> &World {
        self.world
    }

    pub(crate) fn state(&self) -> NodeState {
        self.state
    }

    pub(crate) fn is_clone(&self) -> bool {
        self.is_clone
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn leave_inactive(&self) -> bool {
        self.leave_inactive
    }

    /// Make sure the node exists; idempotent
    pub(crate) fn on_before_init(&mut self) -> Result<NodeId> {
        match self.state {
            NodeState::Allocated(node) => Ok(node),
            NodeState::Unallocated => {
                let node = self.world.spawn(self.default_name).inactive().id();
                self.state = NodeState::Allocated(node);
                tracing::debug!(?node, name = self.default_name, "allocated deferred node");
                Ok(node)
            }
        }
    }

    /// Mark initialized and apply the final activation state
    ///
    /// Runs once; later calls are no-ops.
    pub(crate) fn on_after_init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;
        let Some(node) = self.state.node() else {
            return Ok(());
        };
        if !self.leave_inactive {
            self.world.set_active(node, true)?;
        }
        tracing::debug!(?node, active = !self.leave_inactive, "staged node initialized");
        Ok(())
    }

    /// Failure-path twin of [`Stage::on_after_init`]
    ///
    /// The node still reaches its final activation state so it is never left
    /// stranded in the scene as an inert, half-built object.
    pub(crate) fn on_before_exception(&mut self) {
        if let Err(error) = self.on_after_init() {
            tracing::warn!(%error, "could not finalize staged node after failed initialization");
        }
    }
}

/// Runs [`Stage::on_before_exception`] unless [`InitGuard::complete`] is reached
///
/// Covers both early `?` returns and panics inside a component initializer.
pub(crate) struct InitGuard<'s, 'w> {
    stage: &'s mut Stage<'w>,
    armed: bool,
}

impl<'s, 'w> InitGuard<'s, 'w> {
    pub(crate) fn new(stage: &'s mut Stage<'w>) -> Self {
        Self { stage, armed: true }
    }

    pub(crate) fn stage_ref(&self) -> &Stage<'w> {
        &*self.stage
    }

    pub(crate) fn world(&mut self) -> &mut World {
        self.stage.world()
    }

    /// Successful initialization
    pub(crate) fn complete(mut self) -> Result<()> {
        self.armed = false;
        self.stage.on_after_init()
    }
}

impl Drop for InitGuard<'_, '_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!(node = ?self.stage.state.node(), "initialization did not complete");
            self.stage.on_before_exception();
        }
    }
}

/// One initialization run over a staged node
///
/// Every component is attached before the first initializer runs, so any of
/// them can be handed to another as a sibling. The guard stays armed until
/// [`Staging::complete`]; dropping the run early takes the failure path.
pub(crate) struct Staging<'s, 'w> {
    guard: InitGuard<'s, 'w>,
    node: NodeId,
    is_clone: bool,
    siblings: Vec<SiblingRef>,
}

impl<'s, 'w> Staging<'s, 'w> {
    /// Allocate the node if needed and arm the failure guard
    ///
    /// `siblings` lists the node's components in position order.
    pub(crate) fn begin(
        stage: &'s mut Stage<'w>,
        siblings: impl FnOnce(NodeId) -> Vec<SiblingRef>,
    ) -> Result<Self> {
        if stage.is_initialized() {
            return Err(StageError::AlreadyInitialized(stage.default_name));
        }
        let node = stage.on_before_init()?;
        let is_clone = stage.is_clone();
        Ok(Self {
            guard: InitGuard::new(stage),
            node,
            is_clone,
            siblings: siblings(node),
        })
    }

    pub(crate) fn node(&self) -> NodeId {
        self.node
    }

    pub(crate) fn world_ref(&self) -> &World {
        self.guard.stage_ref().world_ref()
    }

    /// Attach `C`, keeping the one a clone inherited
    pub(crate) fn attach<C: Component + Default>(&mut self) -> Result<()> {
        attach::<C>(self.guard.world(), self.node, self.is_clone)
    }

    pub(crate) fn component<C: Component>(&mut self) -> Result<&mut C> {
        let node = self.node;
        self.guard
            .world()
            .get_mut::<C>(node)
            .ok_or(StageError::ComponentMissing(type_name::<C>()))
    }

    /// Hand `args` to the `C` on the node
    pub(crate) fn run<C, Args>(&mut self, args: Args) -> Result<()>
    where
        C: Initializable<Args>,
    {
        self.component::<C>()?
            .init(args)
            .map_err(|source| StageError::Init {
                component: type_name::<C>(),
                source,
            })
    }

    /// Let `init` configure the `C` on the node directly
    pub(crate) fn run_fn<C: Component>(&mut self, init: impl FnOnce(&mut C)) -> Result<()> {
        init(self.component::<C>()?);
        Ok(())
    }

    /// Typed handle to the sibling at `position`
    pub(crate) fn sibling<C: Component>(&self, position: Position) -> Result<ComponentRef<C>> {
        resolve_sibling(&self.siblings, position)?
            .downcast::<C>()
            .ok_or(StageError::ComponentMissing(type_name::<C>()))
    }

    /// Every initializer ran: disarm the guard and activate
    pub(crate) fn complete(self) -> Result<NodeId> {
        let node = self.node;
        self.guard.complete()?;
        Ok(node)
    }
}

/// Attach a fresh `C`, or keep the one a clone inherited
fn attach<C: Component + Default>(
    world: &mut World,
    node: NodeId,
    reuse_existing: bool,
) -> Result<()> {
    if !(reuse_existing && world.has::<C>(node)) {
        world.insert(node, C::default())?;
    }
    Ok(())
}

/// Duplicate `original` without letting the clone run its activation hooks
///
/// Returns the clone and the original's own active flag.
fn clone_inactive(
    world: &mut World,
    original: NodeId,
    parent: Option<NodeId>,
) -> Result<(NodeId, bool)> {
    assert!(
        world.exists(original),
        "staged clone requested from a node that does not exist: {original:?}"
    );

    let original_active = world.active_self(original);
    if original_active {
        world.set_active(original, false)?;
    }
    let cloned = world.instantiate(original, parent);
    if original_active {
        world.set_active(original, true)?;
    }
    Ok((cloned?, original_active))
}

/// Apply position, rotation and scale from `options`
fn apply_spatial(world: &mut World, node: NodeId, options: &StageOptions) -> Result<()> {
    let world_space = options.world_space && world.parent(node).is_some();
    let mut transform = world.transform(node)?;

    if let Some(position) = options.position {
        if world_space {
            transform.set_position(position);
        } else {
            transform.set_local_position(position);
        }
    }

    if let Some(rotation) = options.rotation {
        if world_space {
            transform.set_rotation(rotation);
        } else {
            transform.set_local_rotation(rotation);
        }
    }

    if let Some(angles) = options.euler_angles {
        if world_space {
            transform.set_euler_angles(angles);
        } else {
            transform.set_local_euler_angles(angles);
        }
    }

    if let Some(scale) = options.scale {
        if world_space {
            transform.set_lossy_scale(scale);
        } else {
            transform.set_local_scale(scale);
        }
    }
    Ok(())
}
