//! Staged construction of a node hosting three sibling components

use crate::error::{Result, StageError};
use crate::init::{short_type_name, ComponentRef, Initializable, SiblingRef};
use crate::options::StageOptions;
use crate::phase::{InitPhase, TripleFirstPhase, TripleSecondPhase};
use crate::stage::{NodeState, Stage, Staging};
use stagehand_scene::{Component, NodeId, World};
use std::any::type_name;
use std::marker::PhantomData;

/// Builder for a node carrying an `A`, a `B` and a `C`
///
/// All three are attached while the node is inactive, then initialized in
/// order; the node is activated after the third. Any component can be handed
/// another through [`First`](crate::First), [`Second`](crate::Second) or
/// [`Third`](crate::Third).
///
/// ```rust
/// use stagehand::{StageOptions, StagedTriple, Third};
/// use stagehand_scene::{Component, World};
///
/// #[derive(Clone, Default)]
/// struct Body;
/// impl Component for Body {}
///
/// #[derive(Clone, Default)]
/// struct Collider(f32);
/// impl Component for Collider {}
///
/// #[derive(Clone, Default)]
/// struct Mass(f32);
/// impl Component for Mass {}
///
/// let mut world = World::new();
/// let mut staged = StagedTriple::<Body, Collider, Mass>::new(&mut world, StageOptions::new())?;
///
/// let phase = staged.begin()?.init_first().init_second_fn(|collider| collider.0 = 0.5)?;
/// let mass = phase.sibling::<Mass>(Third::Component)?;
/// let node = phase.init_third_fn(|m| m.0 = 80.0)?;
///
/// assert_eq!(mass.get(&world).map(|m| m.0), Some(80.0));
/// assert!(world.active_self(node));
/// # Ok::<(), stagehand::StageError>(())
/// ```
pub struct StagedTriple<'w, A, B, C> {
    stage: Stage<'w>,
    _components: PhantomData<fn() -> (A, B, C)>,
}

impl<'w, A, B, C> StagedTriple<'w, A, B, C>
where
    A: Component + Default,
    B: Component + Default,
    C: Component + Default,
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

    /// Attach all three components and start initializing them in order
    ///
    /// Fails with [`StageError::AlreadyInitialized`] if initialization
    /// already ran.
    pub fn begin(&mut self) -> Result<TripleFirstPhase<'_, 'w, A, B, C>> {
        let mut staging = Staging::begin(&mut self.stage, |node| {
            vec![
                SiblingRef::of::<A>(node),
                SiblingRef::of::<B>(node),
                SiblingRef::of::<C>(node),
            ]
        })?;
        staging.attach::<A>()?;
        staging.attach::<B>()?;
        staging.attach::<C>()?;
        Ok(InitPhase::new(staging))
    }

    /// Attach all three components with their defaults
    ///
    /// Once initialized, returns the node without touching it.
    pub fn init(&mut self) -> Result<NodeId> {
        if let (true, NodeState::Allocated(node)) = (self.stage.is_initialized(), self.stage.state())
        {
            return Ok(node);
        }
        self.begin()?.init_first().init_second().init_third()
    }

    /// Initialize the first component with `args`, then continue with the second
    pub fn init_first_with<Args>(
        &mut self,
        args: Args,
    ) -> Result<TripleSecondPhase<'_, 'w, A, B, C>>
    where
        A: Initializable<Args>,
    {
        self.begin()?.init_first_with(args)
    }

    pub fn init_first_fn(
        &mut self,
        init: impl FnOnce(&mut A),
    ) -> Result<TripleSecondPhase<'_, 'w, A, B, C>> {
        self.begin()?.init_first_fn(init)
    }

    /// The node, initializing with defaults first if needed
    pub fn as_node(&mut self) -> Result<NodeId> {
        self.init()
    }

    pub fn as_first(&mut self) -> Result<&mut A> {
        self.component_mut::<A>()
    }

    pub fn as_second(&mut self) -> Result<&mut B> {
        self.component_mut::<B>()
    }

    pub fn as_third(&mut self) -> Result<&mut C> {
        self.component_mut::<C>()
    }

    /// Node plus handles to all three components
    pub fn destructure(
        &mut self,
    ) -> Result<(NodeId, ComponentRef<A>, ComponentRef<B>, ComponentRef<C>)> {
        let node = self.init()?;
        Ok((
            node,
            ComponentRef::new(node),
            ComponentRef::new(node),
            ComponentRef::new(node),
        ))
    }

    fn component_mut<T: Component>(&mut self) -> Result<&mut T> {
        let node = self.init()?;
        self.stage
            .world()
            .get_mut::<T>(node)
            .ok_or(StageError::ComponentMissing(type_name::<T>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{First, Second, Third};

    #[derive(Clone, Debug, Default)]
    struct Radio {
        battery: Option<ComponentRef<Battery>>,
        antenna: Option<ComponentRef<Antenna>>,
    }

    impl Component for Radio {}

    impl Initializable<(ComponentRef<Battery>, ComponentRef<Antenna>)> for Radio {
        fn init(
            &mut self,
            (battery, antenna): (ComponentRef<Battery>, ComponentRef<Antenna>),
        ) -> anyhow::Result<()> {
            self.battery = Some(battery);
            self.antenna = Some(antenna);
            Ok(())
        }
    }

    #[derive(Clone, Debug, Default)]
    struct Battery {
        charge: u32,
    }

    impl Component for Battery {}

    impl Initializable<u32> for Battery {
        fn init(&mut self, charge: u32) -> anyhow::Result<()> {
            self.charge = charge;
            Ok(())
        }
    }

    #[derive(Clone, Debug, Default)]
    struct Antenna {
        band: f32,
        radio: Option<ComponentRef<Radio>>,
        band_on_awake: Option<f32>,
    }

    impl Component for Antenna {
        fn awake(&mut self) {
            self.band_on_awake = Some(self.band);
        }
    }

    impl Initializable<(ComponentRef<Radio>, f32)> for Antenna {
        fn init(&mut self, (radio, band): (ComponentRef<Radio>, f32)) -> anyhow::Result<()> {
            anyhow::ensure!(band > 0.0, "antenna band must be positive");
            self.radio = Some(radio);
            self.band = band;
            Ok(())
        }
    }

    #[test]
    fn test_three_phases_wired() {
        let mut world = World::new();
        let mut staged =
            StagedTriple::<Radio, Battery, Antenna>::new(&mut world, StageOptions::new()).unwrap();

        let phase = staged.begin().unwrap();
        let battery = phase.sibling::<Battery>(Second::Component).unwrap();
        let antenna = phase.sibling::<Antenna>(Third::Component).unwrap();

        let phase = phase
            .init_first_with((battery, antenna))
            .unwrap()
            .init_second_with(9u32)
            .unwrap();
        let node = phase.node();
        assert!(!phase.world().active_self(node));

        let radio = phase.sibling::<Radio>(First::Component).unwrap();
        phase.init_third_with((radio, 88.5)).unwrap();
        assert!(staged.is_initialized());

        assert!(world.active_self(node));
        assert_eq!(world.name(node), Some("Radio"));
        let radio = world.get::<Radio>(node).unwrap();
        assert_eq!(radio.battery, Some(battery));
        assert_eq!(radio.antenna, Some(antenna));
        assert_eq!(world.get::<Battery>(node).unwrap().charge, 9);
        assert_eq!(world.get::<Antenna>(node).unwrap().band_on_awake, Some(88.5));
    }

    #[test]
    fn test_third_phase_failure_still_finalizes() {
        let mut world = World::new();
        let mut staged =
            StagedTriple::<Radio, Battery, Antenna>::new(&mut world, StageOptions::new()).unwrap();

        let phase = staged.init_first_fn(|_| {}).unwrap().init_second();
        let radio = phase.sibling::<Radio>(First::Component).unwrap();
        let err = phase.init_third_with((radio, -1.0)).unwrap_err();
        assert!(matches!(err, StageError::Init { .. }));
        assert!(staged.is_initialized());
        let node = staged.node().unwrap();
        assert!(world.active_self(node));
    }

    #[test]
    fn test_leave_inactive_after_all_phases() {
        let mut world = World::new();
        let mut staged = StagedTriple::<Radio, Battery, Antenna>::new(
            &mut world,
            StageOptions::new().active(false),
        )
        .unwrap();

        let node = staged.init().unwrap();
        assert!(staged.leave_inactive());
        assert!(!world.active_self(node));
        assert_eq!(world.get::<Antenna>(node).unwrap().band_on_awake, None);
    }

    #[test]
    fn test_repeat_init() {
        let mut world = World::new();
        let mut staged = StagedTriple::<Radio, Battery, Antenna>::deferred(&mut world);

        staged.as_second().unwrap().charge = 4;
        let node = staged.node().unwrap();
        assert_eq!(staged.init().unwrap(), node);
        assert_eq!(staged.as_second().unwrap().charge, 4);
        assert!(matches!(
            staged.init_first_fn(|_| {}),
            Err(StageError::AlreadyInitialized("Radio"))
        ));

        let (_, _, battery, antenna) = staged.destructure().unwrap();
        assert_eq!(battery.get(&world).unwrap().charge, 4);
        assert!(antenna.get(&world).is_some());
        assert_eq!(world.components(node).len(), 3);
    }
}
