//! Initialization protocol
//!
//! A component that needs dependencies implements [`Initializable`] for the
//! argument type it expects. Several arguments are passed as a tuple. The
//! staged builders call [`Initializable::init`] while the node is still
//! inactive, so `awake` and `on_enable` only ever see a fully initialized
//! component.
//!
//! ```rust
//! use stagehand::{Initializable, StageOptions, StagedNode};
//! use stagehand_scene::{Component, World};
//!
//! #[derive(Clone, Default)]
//! struct Spawner {
//!     prefab: String,
//!     rate: f32,
//! }
//!
//! impl Component for Spawner {}
//!
//! impl Initializable<(String, f32)> for Spawner {
//!     fn init(&mut self, (prefab, rate): (String, f32)) -> anyhow::Result<()> {
//!         anyhow::ensure!(rate > 0.0, "spawn rate must be positive");
//!         self.prefab = prefab;
//!         self.rate = rate;
//!         Ok(())
//!     }
//! }
//!
//! let mut world = World::new();
//! let mut staged = StagedNode::<Spawner>::new(&mut world, StageOptions::new())?;
//! let spawner = staged.init_with(("Goblin".to_string(), 0.5))?;
//! assert_eq!(spawner.prefab, "Goblin");
//! # Ok::<(), stagehand::StageError>(())
//! ```

use stagehand_scene::{Component, NodeId, World};
use std::any::{type_name, TypeId};
use std::fmt;
use std::marker::PhantomData;

/// A component that receives its dependencies before it is activated
pub trait Initializable<Args>: Component {
    /// Hand the component its arguments
    fn init(&mut self, args: Args) -> anyhow::Result<()>;
}

/// Typed handle to a component on a node
///
/// Used to pass a sibling component into an initializer without holding a
/// borrow on the world.
pub struct ComponentRef<C> {
    node: NodeId,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Component> ComponentRef<C> {
    /// Refer to the `C` on `node`
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            _marker: PhantomData,
        }
    }

    /// The node the component lives on
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Look the component up
    pub fn get<'a>(&self, world: &'a World) -> Option<&'a C> {
        world.get::<C>(self.node)
    }

    /// Look the component up mutably
    pub fn get_mut<'a>(&self, world: &'a mut World) -> Option<&'a mut C> {
        world.get_mut::<C>(self.node)
    }
}

impl<C> Clone for ComponentRef<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for ComponentRef<C> {}

impl<C> PartialEq for ComponentRef<C> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<C> Eq for ComponentRef<C> {}

impl<C> fmt::Debug for ComponentRef<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRef")
            .field("component", &type_name::<C>())
            .field("node", &self.node)
            .finish()
    }
}

/// Untyped entry in the ordered sibling list of a multi-component node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SiblingRef {
    node: NodeId,
    type_id: TypeId,
    type_name: &'static str,
}

impl SiblingRef {
    /// Entry for component type `C` on `node`
    pub fn of<C: Component>(node: NodeId) -> Self {
        Self {
            node,
            type_id: TypeId::of::<C>(),
            type_name: type_name::<C>(),
        }
    }

    /// Type name of the component
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recover the typed handle if this entry is a `C`
    pub fn downcast<C: Component>(&self) -> Option<ComponentRef<C>> {
        (self.type_id == TypeId::of::<C>()).then(|| ComponentRef::new(self.node))
    }
}

/// Short, human-readable type name used for default node names
pub(crate) fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Engine;

    impl Component for Engine {}

    #[derive(Clone, Default)]
    struct Wheel;

    impl Component for Wheel {}

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Engine>(), "Engine");
        assert_eq!(short_type_name::<Vec<Engine>>(), "Vec");
        assert_eq!(short_type_name::<u32>(), "u32");
    }

    #[test]
    fn test_sibling_downcast() {
        let mut world = World::new();
        let node = world.spawn("Car").insert(Engine).id();

        let sibling = SiblingRef::of::<Engine>(node);
        assert!(sibling.downcast::<Wheel>().is_none());

        let engine = sibling.downcast::<Engine>().unwrap();
        assert_eq!(engine.node(), node);
        assert!(engine.get(&world).is_some());
    }
}
