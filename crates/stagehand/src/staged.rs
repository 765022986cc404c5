//! Staged construction of a node hosting one component

use crate::error::{Result, StageError};
use crate::init::{short_type_name, Initializable, SiblingRef};
use crate::options::StageOptions;
use crate::stage::{NodeState, Stage, Staging};
use stagehand_scene::{Component, NodeId, TransformMut, World};
use std::any::type_name;
use std::marker::PhantomData;

/// Builder that creates (or clones) a node, initializes its `T`, and only
/// then activates it.
///
/// Attaching a component to an active node runs its `awake` and
/// `on_enable` hooks immediately, before the caller could hand it any
/// dependencies. `StagedNode` keeps the node inactive until
/// [`init`](Self::init) or [`init_with`](Self::init_with) has finished, so
/// the hooks always observe a fully initialized component.
///
/// # Example
///
/// ```rust
/// use stagehand::{StageOptions, StagedNode};
/// use stagehand_scene::{Component, Vec3, World};
///
/// #[derive(Clone, Default)]
/// struct Light {
///     intensity: f32,
/// }
///
/// impl Component for Light {}
///
/// let mut world = World::new();
/// let options = StageOptions::new().with_position(Vec3::new(0.0, 3.0, 0.0));
/// let mut staged = StagedNode::<Light>::new(&mut world, options)?;
///
/// staged.as_component()?.intensity = 2.0;
/// let node = staged.as_node()?;
/// assert!(world.active_self(node));
/// # Ok::<(), stagehand::StageError>(())
/// ```
pub struct StagedNode<'w, T> {
    stage: Stage<'w>,
    _component: PhantomData<fn() -> T>,
}

impl<'w, T: Component> StagedNode<'w, T> {
    /// Create or clone a node as described by `options`
    ///
    /// The node is inactive when this returns, whatever `options.active`
    /// says.
    ///
    /// # Panics
    ///
    /// Panics if `options.clone_from` names a node that does not exist.
    pub fn new(world: &'w mut World, options: StageOptions) -> Result<Self> {
        Ok(Self {
            stage: Stage::new(world, &options, short_type_name::<T>())?,
            _component: PhantomData,
        })
    }

    /// Clone `original` with default options
    ///
    /// # Panics
    ///
    /// Panics if `original` does not exist.
    pub fn clone_of(world: &'w mut World, original: NodeId) -> Result<Self> {
        Self::new(world, StageOptions::clone_of(original))
    }

    /// Defer node creation until initialization
    pub fn deferred(world: &'w mut World) -> Self {
        Self {
            stage: Stage::deferred(world, short_type_name::<T>()),
            _component: PhantomData,
        }
    }

    /// Current node state, without forcing initialization
    pub fn state(&self) -> NodeState {
        self.stage.state()
    }

    /// The node if it has been allocated, without forcing initialization
    pub fn node(&self) -> Option<NodeId> {
        self.stage.state().node()
    }

    /// Whether the node was cloned from an existing one
    pub fn is_clone(&self) -> bool {
        self.stage.is_clone()
    }

    /// Whether initialization has run (successfully or not)
    pub fn is_initialized(&self) -> bool {
        self.stage.is_initialized()
    }

    /// Whether the node stays inactive after initialization
    pub fn leave_inactive(&self) -> bool {
        self.stage.leave_inactive()
    }

    /// The world the node lives in
    pub fn world(&self) -> &World {
        self.stage.world_ref()
    }

    /// Hook run before arguments are supplied: allocates a deferred node
    pub fn on_before_init(&mut self) -> Result<NodeId> {
        self.stage.on_before_init()
    }

    /// Hook run after arguments were supplied: marks the builder
    /// initialized and activates the node unless it should stay inactive
    pub fn on_after_init(&mut self) -> Result<()> {
        self.stage.on_after_init()
    }

    /// Hook run when initialization failed part-way
    ///
    /// Equivalent to [`on_after_init`](Self::on_after_init) but never fails.
    pub fn on_before_exception(&mut self) {
        self.stage.on_before_exception()
    }

    /// Initialize a component that takes arguments
    ///
    /// A clone reuses the `T` it inherited from the original; a fresh node
    /// gets a new `T::default()`. Either way `T::init(args)` runs while the
    /// node is inactive. If `init` fails or panics, the node is still
    /// finalized before the error reaches the caller.
    ///
    /// Fails with [`StageError::AlreadyInitialized`] if initialization
    /// already ran.
    pub fn init_with<Args>(&mut self, args: Args) -> Result<&mut T>
    where
        T: Initializable<Args> + Default,
    {
        let mut staging = Staging::begin(&mut self.stage, siblings::<T>)?;
        staging.attach::<T>()?;
        staging.run::<T, Args>(args)?;
        let node = staging.complete()?;
        self.component_mut(node)
    }

    /// Initialize by configuring the component in place
    ///
    /// Same rules as [`init_with`](Self::init_with).
    pub fn init_fn(&mut self, init: impl FnOnce(&mut T)) -> Result<&mut T>
    where
        T: Default,
    {
        let mut staging = Staging::begin(&mut self.stage, siblings::<T>)?;
        staging.attach::<T>()?;
        staging.run_fn::<T>(init)?;
        let node = staging.complete()?;
        self.component_mut(node)
    }

    fn component_mut(&mut self, node: NodeId) -> Result<&mut T> {
        self.stage
            .world()
            .get_mut::<T>(node)
            .ok_or(StageError::ComponentMissing(type_name::<T>()))
    }

    fn allocated(&self) -> Result<NodeId> {
        self.stage
            .state()
            .node()
            .ok_or(StageError::ComponentMissing(type_name::<T>()))
    }
}

impl<'w, T: Component + Default> StagedNode<'w, T> {
    /// Initialize a component that takes no arguments
    ///
    /// Once initialized, returns the existing component untouched.
    pub fn init(&mut self) -> Result<&mut T> {
        if let (true, NodeState::Allocated(node)) = (self.stage.is_initialized(), self.stage.state())
        {
            return self.component_mut(node);
        }
        let mut staging = Staging::begin(&mut self.stage, siblings::<T>)?;
        staging.attach::<T>()?;
        let node = staging.complete()?;
        self.component_mut(node)
    }

    fn ensure_initialized(&mut self) -> Result<NodeId> {
        match (self.stage.is_initialized(), self.stage.state()) {
            (true, NodeState::Allocated(node)) => Ok(node),
            _ => {
                self.init()?;
                self.allocated()
            }
        }
    }

    /// The node, initializing with no arguments first if needed
    pub fn as_node(&mut self) -> Result<NodeId> {
        self.ensure_initialized()
    }

    /// The node's transform, initializing with no arguments first if needed
    pub fn as_transform(&mut self) -> Result<TransformMut<'_>> {
        let node = self.ensure_initialized()?;
        Ok(self.stage.world().transform(node)?)
    }

    /// The component, initializing with no arguments first if needed
    pub fn as_component(&mut self) -> Result<&mut T> {
        let node = self.ensure_initialized()?;
        self.component_mut(node)
    }

    /// Node and component together, initializing first if needed
    pub fn destructure(&mut self) -> Result<(NodeId, &mut T)> {
        let node = self.ensure_initialized()?;
        Ok((node, self.component_mut(node)?))
    }
}

fn siblings<T: Component>(node: NodeId) -> Vec<SiblingRef> {
    vec![SiblingRef::of::<T>(node)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_scene::{HideFlags, Quat, Vec3};

    #[derive(Clone, Debug, Default)]
    struct Marker {
        awake: u32,
        tag: u32,
    }

    impl Component for Marker {
        fn awake(&mut self) {
            self.awake += 1;
        }
    }

    impl Initializable<u32> for Marker {
        fn init(&mut self, tag: u32) -> anyhow::Result<()> {
            self.tag = tag;
            Ok(())
        }
    }

    #[test]
    fn test_new_node_is_inactive() {
        let mut world = World::new();
        let staged = StagedNode::<Marker>::new(&mut world, StageOptions::new()).unwrap();

        let node = staged.node().unwrap();
        assert!(!staged.is_initialized());
        assert!(!staged.is_clone());
        assert!(!staged.world().active_self(node));
        assert_eq!(staged.world().name(node), Some("Marker"));
    }

    #[test]
    fn test_init_activates() {
        let mut world = World::new();
        let mut staged = StagedNode::<Marker>::new(&mut world, StageOptions::new()).unwrap();

        let marker = staged.init().unwrap();
        assert_eq!(marker.awake, 1);

        let node = staged.as_node().unwrap();
        assert!(staged.is_initialized());
        assert!(world.active_self(node));
    }

    #[test]
    fn test_init_after_init_with_keeps_component() {
        let mut world = World::new();
        let mut staged = StagedNode::<Marker>::new(&mut world, StageOptions::new()).unwrap();
        staged.init_with(7u32).unwrap();

        let marker = staged.init().unwrap();
        assert_eq!(marker.tag, 7);
        assert_eq!(marker.awake, 1);
    }

    #[test]
    fn test_init_with_twice_rejected() {
        let mut world = World::new();
        let mut staged = StagedNode::<Marker>::new(&mut world, StageOptions::new()).unwrap();
        staged.init_with(7u32).unwrap();

        let result = staged.init_with(9u32);
        assert!(matches!(result, Err(StageError::AlreadyInitialized("Marker"))));
        assert!(matches!(
            staged.init_fn(|marker| marker.tag = 9),
            Err(StageError::AlreadyInitialized(_))
        ));
        assert_eq!(staged.as_component().unwrap().tag, 7);
    }

    #[test]
    fn test_init_fn_runs_before_awake() {
        let mut world = World::new();
        let mut staged = StagedNode::<Marker>::new(&mut world, StageOptions::new()).unwrap();

        let marker = staged.init_fn(|marker| marker.tag = 3).unwrap();
        assert_eq!(marker.tag, 3);
        assert_eq!(marker.awake, 1);
    }

    #[test]
    fn test_init_leaves_inactive_when_requested() {
        let mut world = World::new();
        let mut staged =
            StagedNode::<Marker>::new(&mut world, StageOptions::new().active(false)).unwrap();

        assert!(staged.leave_inactive());
        assert_eq!(staged.init().unwrap().awake, 0);

        let node = staged.as_node().unwrap();
        assert!(!world.active_self(node));
        assert!(world.has::<Marker>(node));
    }

    #[test]
    fn test_deferred_allocates_once() {
        let mut world = World::new();
        let mut staged = StagedNode::<Marker>::deferred(&mut world);
        assert_eq!(staged.state(), NodeState::Unallocated);

        let first = staged.on_before_init().unwrap();
        let second = staged.on_before_init().unwrap();
        assert_eq!(first, second);
        assert!(!staged.world().active_self(first));
        assert_eq!(staged.world().name(first), Some("Marker"));
        assert_eq!(staged.world().node_count(), 1);
    }

    #[test]
    fn test_manual_hooks() {
        let mut world = World::new();
        let mut staged = StagedNode::<Marker>::deferred(&mut world);

        let node = staged.on_before_init().unwrap();
        staged.on_after_init().unwrap();

        assert!(staged.is_initialized());
        assert!(staged.world().active_self(node));
    }

    #[test]
    fn test_options_applied() {
        let mut world = World::new();
        let parent = world.spawn("Parent").id();
        let options = StageOptions::new()
            .named("Child")
            .with_parent(parent)
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Quat::from_axis_angle(Vec3::UP, 0.5))
            .with_scale(Vec3::splat(2.0))
            .with_hide_flags(HideFlags::HIDE_IN_HIERARCHY);

        let mut staged = StagedNode::<Marker>::new(&mut world, options).unwrap();
        let transform = staged.as_transform().unwrap();
        assert_eq!(transform.local_position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.local_scale(), Vec3::splat(2.0));
        let node = transform.node();

        assert_eq!(world.name(node), Some("Child"));
        assert_eq!(world.parent(node), Some(parent));
        assert_eq!(world.hide_flags(node), Some(HideFlags::HIDE_IN_HIERARCHY));
    }

    #[test]
    fn test_conflicting_rotation() {
        let mut world = World::new();
        let options = StageOptions::new()
            .with_rotation(Quat::IDENTITY)
            .with_euler_angles(Vec3::ZERO);

        let result = StagedNode::<Marker>::new(&mut world, options);
        assert!(matches!(result, Err(StageError::ConflictingRotation)));
        assert_eq!(world.node_count(), 0);
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn test_clone_of_missing_node_panics() {
        let mut world = World::new();
        let gone = world.spawn("Gone").id();
        world.despawn(gone);

        let _ = StagedNode::<Marker>::clone_of(&mut world, gone);
    }
}
