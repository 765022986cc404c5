//! Staged construction of a node hosting two sibling components
//!
//! The second component is often a dependency of the first (or the other
//! way round). Both are attached while the node is inactive, then each is
//! initialized in turn; either can be handed the other as a
//! [`ComponentRef`] picked out of the sibling list by a positional token.

use crate::error::{Result, StageError};
use crate::init::{short_type_name, ComponentRef, Initializable, SiblingRef};
use crate::options::StageOptions;
use crate::phase::{InitPhase, PairFirstPhase, PairSecondPhase};
use crate::stage::{NodeState, Stage, Staging};
use crate::token::{First, Second};
use stagehand_scene::{Component, NodeId, World};
use std::any::type_name;
use std::marker::PhantomData;

/// Builder for a node carrying an `A` and a `B`
///
/// Same staging rules as [`StagedNode`](crate::StagedNode): the node stays
/// inactive until both components are attached and initialized.
///
/// [`begin`](Self::begin) gives step-by-step control: the first component
/// is initialized, then the second, and only then is the node activated.
/// The `*_wired` shorthands cover the common case of handing one component
/// to the other.
///
/// ```rust
/// use stagehand::{ComponentRef, Initializable, Second, StageOptions, StagedPair};
/// use stagehand_scene::{Component, World};
///
/// #[derive(Clone, Default)]
/// struct Health(u32);
/// impl Component for Health {}
///
/// #[derive(Clone, Default)]
/// struct Hud {
///     label: String,
///     health: Option<ComponentRef<Health>>,
/// }
/// impl Component for Hud {}
///
/// impl Initializable<(String, ComponentRef<Health>)> for Hud {
///     fn init(&mut self, (label, health): (String, ComponentRef<Health>)) -> anyhow::Result<()> {
///         self.label = label;
///         self.health = Some(health);
///         Ok(())
///     }
/// }
///
/// let mut world = World::new();
/// let mut staged = StagedPair::<Hud, Health>::new(&mut world, StageOptions::new())?;
/// staged.init_first_wired("Player".to_string(), Second::Component)?;
///
/// let (node, hud, health) = staged.destructure()?;
/// assert_eq!(hud.get(&world).and_then(|h| h.health), Some(health));
/// assert!(world.active_self(node));
/// # Ok::<(), stagehand::StageError>(())
/// ```
pub struct StagedPair<'w, A, B> {
    stage: Stage<'w>,
    _components: PhantomData<fn() -> (A, B)>,
}

impl<'w, A, B> StagedPair<'w, A, B>
where
    A: Component + Default,
    B: Component + Default,
{
    /// Create or clone a node as described by `options`
    ///
    /// # Panics
    ///
    /// Panics if `options.clone_from` names a node that does not exist.
    pub fn new(world: &'w mut World, options: StageOptions) -> Result<Self> {
        Ok(Self {
            stage: Stage::new(world, &options, short_type_name::<A>())?,
            _components: PhantomData,
        })
    }

    /// Defer node creation until initialization
    pub fn deferred(world: &'w mut World) -> Self {
        Self {
            stage: Stage::deferred(world, short_type_name::<A>()),
            _components: PhantomData,
        }
    }

    /// Whether the node has been created yet
    pub fn state(&self) -> NodeState {
        self.stage.state()
    }

    /// The node, once allocated
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

    pub fn world(&self) -> &World {
        self.stage.world_ref()
    }

    /// Allocate the node if deferred; idempotent
    pub fn on_before_init(&mut self) -> Result<NodeId> {
        self.stage.on_before_init()
    }

    /// Mark initialized and activate unless asked to stay inactive
    pub fn on_after_init(&mut self) -> Result<()> {
        self.stage.on_after_init()
    }

    /// Failure-path twin of [`on_after_init`](Self::on_after_init)
    pub fn on_before_exception(&mut self) {
        self.stage.on_before_exception()
    }

    /// Attach both components and start initializing them one at a time
    ///
    /// Clones keep the components they inherited. Fails with
    /// [`StageError::AlreadyInitialized`] if initialization already ran.
    pub fn begin(&mut self) -> Result<PairFirstPhase<'_, 'w, A, B>> {
        let mut staging = Staging::begin(&mut self.stage, |node| {
            vec![SiblingRef::of::<A>(node), SiblingRef::of::<B>(node)]
        })?;
        staging.attach::<A>()?;
        staging.attach::<B>()?;
        Ok(InitPhase::new(staging))
    }

    /// Attach both components with their defaults
    ///
    /// Once initialized, returns the node without touching it.
    pub fn init(&mut self) -> Result<NodeId> {
        if let (true, NodeState::Allocated(node)) = (self.stage.is_initialized(), self.stage.state())
        {
            return Ok(node);
        }
        self.begin()?.init_first().init_second()
    }

    /// Initialize the first component with `args`
    ///
    /// The returned phase initializes the second; the node activates after it.
    pub fn init_first_with<Args>(&mut self, args: Args) -> Result<PairSecondPhase<'_, 'w, A, B>>
    where
        A: Initializable<Args>,
    {
        self.begin()?.init_first_with(args)
    }

    /// Configure the first component in place, then continue with the second
    pub fn init_first_fn(
        &mut self,
        init: impl FnOnce(&mut A),
    ) -> Result<PairSecondPhase<'_, 'w, A, B>> {
        self.begin()?.init_first_fn(init)
    }

    /// Initialize the first component with `arg` and the second component
    pub fn init_first_wired<X>(&mut self, arg: X, _second: Second) -> Result<NodeId>
    where
        A: Initializable<(X, ComponentRef<B>)>,
    {
        let phase = self.begin()?;
        let second = phase.sibling::<B>(Second::Component)?;
        phase.init_first_with((arg, second))?.init_second()
    }

    /// Initialize the second component with the first component and `arg`
    pub fn init_second_wired<X>(&mut self, _first: First, arg: X) -> Result<NodeId>
    where
        B: Initializable<(ComponentRef<A>, X)>,
    {
        let phase = self.begin()?.init_first();
        let first = phase.sibling::<A>(First::Component)?;
        phase.init_second_with((first, arg))
    }

    /// The node, initializing with defaults first if needed
    pub fn as_node(&mut self) -> Result<NodeId> {
        self.init()
    }

    /// The first component, initializing with defaults first if needed
    pub fn as_first(&mut self) -> Result<&mut A> {
        let node = self.init()?;
        self.stage
            .world()
            .get_mut::<A>(node)
            .ok_or(StageError::ComponentMissing(type_name::<A>()))
    }

    /// The second component, initializing with defaults first if needed
    pub fn as_second(&mut self) -> Result<&mut B> {
        let node = self.init()?;
        self.stage
            .world()
            .get_mut::<B>(node)
            .ok_or(StageError::ComponentMissing(type_name::<B>()))
    }

    /// Node plus handles to both components
    pub fn destructure(&mut self) -> Result<(NodeId, ComponentRef<A>, ComponentRef<B>)> {
        let node = self.init()?;
        Ok((node, ComponentRef::new(node), ComponentRef::new(node)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default)]
    struct Engine {
        power: u32,
        awake_power: Option<u32>,
    }

    impl Component for Engine {
        fn awake(&mut self) {
            self.awake_power = Some(self.power);
        }
    }

    #[derive(Clone, Debug, Default)]
    struct Car {
        engine: Option<ComponentRef<Engine>>,
        model: String,
    }

    impl Component for Car {}

    impl Initializable<String> for Car {
        fn init(&mut self, model: String) -> anyhow::Result<()> {
            self.model = model;
            Ok(())
        }
    }

    impl Initializable<(String, ComponentRef<Engine>)> for Car {
        fn init(&mut self, (model, engine): (String, ComponentRef<Engine>)) -> anyhow::Result<()> {
            self.model = model;
            self.engine = Some(engine);
            Ok(())
        }
    }

    impl Initializable<(ComponentRef<Car>, u32)> for Engine {
        fn init(&mut self, (_car, power): (ComponentRef<Car>, u32)) -> anyhow::Result<()> {
            anyhow::ensure!(power > 0, "engine needs power");
            self.power = power;
            Ok(())
        }
    }

    #[test]
    fn test_first_wired_gets_second() {
        let mut world = World::new();
        let mut staged = StagedPair::<Car, Engine>::new(&mut world, StageOptions::new()).unwrap();

        let node = staged
            .init_first_wired("Roadster".to_string(), Second::Component)
            .unwrap();
        assert!(staged.is_initialized());

        let car = world.get::<Car>(node).unwrap();
        assert_eq!(car.model, "Roadster");
        assert_eq!(car.engine, Some(ComponentRef::new(node)));
        assert!(world.active_self(node));
        assert_eq!(world.name(node), Some("Car"));
    }

    #[test]
    fn test_second_wired_initialized_before_awake() {
        let mut world = World::new();
        let mut staged = StagedPair::<Car, Engine>::new(&mut world, StageOptions::new()).unwrap();

        let node = staged.init_second_wired(First::Component, 300).unwrap();

        let engine = world.get::<Engine>(node).unwrap();
        assert_eq!(engine.power, 300);
        assert_eq!(engine.awake_power, Some(300));
        assert!(world.has::<Car>(node));
    }

    #[test]
    fn test_wired_failure_still_finalizes() {
        let mut world = World::new();
        let mut staged = StagedPair::<Car, Engine>::new(&mut world, StageOptions::new()).unwrap();

        let err = staged.init_second_wired(First::Component, 0).unwrap_err();
        assert!(matches!(err, StageError::Init { .. }));
        assert!(staged.is_initialized());

        let node = staged.node().unwrap();
        assert!(world.active_self(node));
    }

    #[test]
    fn test_accessors_default_init() {
        let mut world = World::new();
        let mut staged = StagedPair::<Car, Engine>::deferred(&mut world);
        assert!(staged.node().is_none());

        staged.as_second().unwrap().power = 7;
        assert_eq!(staged.as_second().unwrap().power, 7);
        assert!(staged.as_first().unwrap().engine.is_none());

        let (node, car, engine) = staged.destructure().unwrap();
        assert!(car.get(&world).is_some());
        assert_eq!(engine.get(&world).unwrap().power, 7);
        assert_eq!(world.components(node).len(), 2);
    }

    #[test]
    fn test_second_phase_gets_its_own_args() {
        let mut world = World::new();
        let mut staged = StagedPair::<Car, Engine>::new(&mut world, StageOptions::new()).unwrap();

        let phase = staged.init_first_with("Coupe".to_string()).unwrap();
        let node = phase.node();
        assert!(!phase.world().active_self(node));
        assert_eq!(phase.world().get::<Car>(node).unwrap().model, "Coupe");

        let car = phase.sibling::<Car>(First::Component).unwrap();
        let node = phase.init_second_with((car, 120)).unwrap();
        assert!(staged.is_initialized());

        let engine = world.get::<Engine>(node).unwrap();
        assert_eq!(engine.power, 120);
        assert_eq!(engine.awake_power, Some(120));
        assert!(world.active_self(node));
    }

    #[test]
    fn test_second_phase_failure_still_finalizes() {
        let mut world = World::new();
        let mut staged = StagedPair::<Car, Engine>::new(&mut world, StageOptions::new()).unwrap();

        let phase = staged.init_first_with("Coupe".to_string()).unwrap();
        let car = phase.sibling::<Car>(First::Component).unwrap();
        let err = phase.init_second_with((car, 0)).unwrap_err();
        assert!(matches!(err, StageError::Init { .. }));
        assert!(staged.is_initialized());

        let node = staged.node().unwrap();
        assert!(world.active_self(node));
        assert_eq!(world.get::<Car>(node).unwrap().model, "Coupe");
    }

    #[test]
    fn test_dropped_phase_finalizes() {
        let mut world = World::new();
        let mut staged = StagedPair::<Car, Engine>::new(&mut world, StageOptions::new()).unwrap();

        drop(staged.begin().unwrap());
        assert!(staged.is_initialized());
        let node = staged.node().unwrap();
        assert!(world.active_self(node));
    }

    #[test]
    fn test_callback_phases() {
        let mut world = World::new();
        let mut staged = StagedPair::<Car, Engine>::new(&mut world, StageOptions::new()).unwrap();

        let node = staged
            .init_first_fn(|car| car.model = "Van".to_string())
            .unwrap()
            .init_second_fn(|engine| engine.power = 90)
            .unwrap();

        assert_eq!(world.get::<Car>(node).unwrap().model, "Van");
        assert_eq!(world.get::<Engine>(node).unwrap().awake_power, Some(90));
    }

    #[test]
    fn test_repeat_init() {
        let mut world = World::new();
        let mut staged = StagedPair::<Car, Engine>::new(&mut world, StageOptions::new()).unwrap();

        let node = staged.init_second_wired(First::Component, 300).unwrap();
        assert_eq!(staged.init().unwrap(), node);
        assert!(matches!(
            staged.init_first_with("Coupe".to_string()),
            Err(StageError::AlreadyInitialized("Car"))
        ));
        assert!(matches!(staged.begin(), Err(StageError::AlreadyInitialized(_))));

        let engine = world.get::<Engine>(node).unwrap();
        assert_eq!(engine.power, 300);
        assert_eq!(engine.awake_power, Some(300));
        assert!(world.get::<Car>(node).unwrap().model.is_empty());
    }

    #[test]
    fn test_sibling_token_resolution() {
        let mut world = World::new();
        let mut staged = StagedPair::<Car, Engine>::new(&mut world, StageOptions::new()).unwrap();
        let phase = staged.begin().unwrap();

        let engine = phase.sibling::<Engine>(Second::Component).unwrap();
        assert_eq!(engine.node(), phase.node());

        let wrong = phase.sibling::<Engine>(First::Component);
        assert!(matches!(wrong, Err(StageError::ComponentMissing(_))));

        let missing = phase.sibling::<Engine>(crate::token::Third::Component);
        assert!(matches!(
            missing,
            Err(StageError::MissingSibling { index: 2, len: 2 })
        ));
        phase.init_first().init_second().unwrap();
    }
}
