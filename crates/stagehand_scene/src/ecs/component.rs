//! Component trait and storage
//!
//! Components are plain data attached to nodes. Unlike a pure ECS, a
//! component here also receives lifecycle callbacks from the world:
//!
//! - `awake` runs once, the first time the component is attached to a node
//!   that is active in the hierarchy (or when its node first becomes active)
//! - `on_enable` runs every time the node becomes active in the hierarchy
//! - `on_disable` runs every time it stops being active
//!
//! These callbacks are exactly what staged construction protects against:
//! a component attached to an active node sees `awake` before anyone had a
//! chance to hand it its dependencies.
//!
//! # Example
//!
//! ```rust
//! use stagehand_scene::{Component, World};
//!
//! #[derive(Clone, Debug, Default)]
//! struct Health {
//!     current: f32,
//!     awake: bool,
//! }
//!
//! impl Component for Health {
//!     fn awake(&mut self) {
//!         self.awake = true;
//!     }
//! }
//!
//! let mut world = World::new();
//! let node = world.spawn("Player").insert(Health::default()).id();
//! assert!(world.get::<Health>(node).unwrap().awake);
//! ```

use super::NodeId;
use rustc_hash::FxHashMap;
use slotmap::SecondaryMap;
use std::any::{Any, TypeId};

/// Storage strategy for components
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageType {
    /// Dense storage keyed by node slot (good for common components)
    #[default]
    Dense,
    /// Sparse storage using HashMap (good for rare components)
    Sparse,
}

/// Lifecycle callback dispatched through type-erased storage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    Awake,
    Enable,
    Disable,
}

/// Trait for all components
///
/// Components must be `Clone` so that [`World::instantiate`](super::World::instantiate)
/// can duplicate a node together with everything attached to it.
pub trait Component: 'static + Send + Sync + Clone {
    /// Storage strategy hint
    const STORAGE: StorageType = StorageType::Dense;

    /// Called once, when the component first becomes active
    fn awake(&mut self) {}

    /// Called whenever the owning node becomes active in the hierarchy
    fn on_enable(&mut self) {}

    /// Called whenever the owning node stops being active in the hierarchy
    fn on_disable(&mut self) {}
}

fn dispatch<T: Component>(component: &mut T, hook: Hook) {
    match hook {
        Hook::Awake => component.awake(),
        Hook::Enable => component.on_enable(),
        Hook::Disable => component.on_disable(),
    }
}

/// Type-erased component storage trait
pub trait ComponentStorage: Any + Send + Sync {
    /// Get as Any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Get as mutable Any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Remove a component from a node
    fn remove(&mut self, node: NodeId) -> bool;

    /// Check if node has this component
    fn contains(&self, node: NodeId) -> bool;

    /// Copy the component on `source` onto `target`
    fn copy_component(&mut self, source: NodeId, target: NodeId) -> bool;

    /// Run a lifecycle hook on the component of `node`
    fn dispatch(&mut self, node: NodeId, hook: Hook) -> bool;

    /// Get component count
    fn len(&self) -> usize;

    /// Check if empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dense storage keyed by node
///
/// Optimized for common components that most nodes have.
pub struct DenseStorage<T: Component> {
    components: SecondaryMap<NodeId, T>,
}

impl<T: Component> Default for DenseStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> DenseStorage<T> {
    /// Create new dense storage
    pub fn new() -> Self {
        Self {
            components: SecondaryMap::new(),
        }
    }

    /// Insert a component for a node, returning the previous one
    pub fn insert(&mut self, node: NodeId, component: T) -> Option<T> {
        self.components.insert(node, component)
    }

    /// Get a component reference
    pub fn get(&self, node: NodeId) -> Option<&T> {
        self.components.get(node)
    }

    /// Get a mutable component reference
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut T> {
        self.components.get_mut(node)
    }

    /// Iterate over all components
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.components.iter()
    }
}

impl<T: Component> ComponentStorage for DenseStorage<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove(&mut self, node: NodeId) -> bool {
        self.components.remove(node).is_some()
    }

    fn contains(&self, node: NodeId) -> bool {
        self.components.contains_key(node)
    }

    fn copy_component(&mut self, source: NodeId, target: NodeId) -> bool {
        let Some(component) = self.components.get(source).cloned() else {
            return false;
        };
        self.components.insert(target, component);
        true
    }

    fn dispatch(&mut self, node: NodeId, hook: Hook) -> bool {
        match self.components.get_mut(node) {
            Some(component) => {
                dispatch(component, hook);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.components.len()
    }
}

/// Sparse storage using HashMap
///
/// Optimized for rare components that few nodes have.
pub struct SparseStorage<T: Component> {
    components: FxHashMap<NodeId, T>,
}

impl<T: Component> Default for SparseStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> SparseStorage<T> {
    /// Create new sparse storage
    pub fn new() -> Self {
        Self {
            components: FxHashMap::default(),
        }
    }

    /// Insert a component for a node, returning the previous one
    pub fn insert(&mut self, node: NodeId, component: T) -> Option<T> {
        self.components.insert(node, component)
    }

    /// Get a component reference
    pub fn get(&self, node: NodeId) -> Option<&T> {
        self.components.get(&node)
    }

    /// Get a mutable component reference
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut T> {
        self.components.get_mut(&node)
    }

    /// Iterate over all components
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.components.iter().map(|(&n, c)| (n, c))
    }
}

impl<T: Component> ComponentStorage for SparseStorage<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove(&mut self, node: NodeId) -> bool {
        self.components.remove(&node).is_some()
    }

    fn contains(&self, node: NodeId) -> bool {
        self.components.contains_key(&node)
    }

    fn copy_component(&mut self, source: NodeId, target: NodeId) -> bool {
        let Some(component) = self.components.get(&source).cloned() else {
            return false;
        };
        self.components.insert(target, component);
        true
    }

    fn dispatch(&mut self, node: NodeId, hook: Hook) -> bool {
        match self.components.get_mut(&node) {
            Some(component) => {
                dispatch(component, hook);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.components.len()
    }
}

/// Registry for all component storage
pub struct ComponentRegistry {
    storages: FxHashMap<TypeId, Box<dyn ComponentStorage>>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    /// Create a new component registry
    pub fn new() -> Self {
        Self {
            storages: FxHashMap::default(),
        }
    }

    /// Get or create storage for a component type
    pub fn get_or_create<T: Component>(&mut self) -> &mut dyn ComponentStorage {
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| match T::STORAGE {
                StorageType::Dense => Box::new(DenseStorage::<T>::new()),
                StorageType::Sparse => Box::new(SparseStorage::<T>::new()),
            })
            .as_mut()
    }

    /// Get storage for a component type
    pub fn get<T: Component>(&self) -> Option<&dyn ComponentStorage> {
        self.get_by_id(TypeId::of::<T>())
    }

    /// Get mutable storage for a component type
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut dyn ComponentStorage> {
        self.get_by_id_mut(TypeId::of::<T>())
    }

    /// Get storage by type id
    pub fn get_by_id(&self, type_id: TypeId) -> Option<&dyn ComponentStorage> {
        self.storages.get(&type_id).map(|b| b.as_ref())
    }

    /// Get mutable storage by type id
    pub fn get_by_id_mut(&mut self, type_id: TypeId) -> Option<&mut dyn ComponentStorage> {
        self.storages.get_mut(&type_id).map(|b| b.as_mut())
    }

    /// Get typed dense storage
    pub fn get_dense<T: Component>(&self) -> Option<&DenseStorage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref())
    }

    /// Get mutable typed dense storage
    pub fn get_dense_mut<T: Component>(&mut self) -> Option<&mut DenseStorage<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut())
    }

    /// Get typed sparse storage
    pub fn get_sparse<T: Component>(&self) -> Option<&SparseStorage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref())
    }

    /// Get mutable typed sparse storage
    pub fn get_sparse_mut<T: Component>(&mut self) -> Option<&mut SparseStorage<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut())
    }

    /// Remove all components for a node
    pub fn remove_all(&mut self, node: NodeId) {
        for storage in self.storages.values_mut() {
            storage.remove(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[derive(Clone, Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    impl Component for Position {}

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Counter {
        awake: u32,
        enabled: u32,
    }

    impl Component for Counter {
        const STORAGE: StorageType = StorageType::Sparse;

        fn awake(&mut self) {
            self.awake += 1;
        }

        fn on_enable(&mut self) {
            self.enabled += 1;
        }
    }

    fn keys(n: usize) -> Vec<NodeId> {
        let mut map = SlotMap::<NodeId, ()>::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_dense_storage() {
        let nodes = keys(2);
        let mut storage = DenseStorage::<Position>::new();

        assert!(storage.insert(nodes[0], Position { x: 1.0, y: 2.0 }).is_none());
        assert_eq!(storage.get(nodes[0]), Some(&Position { x: 1.0, y: 2.0 }));
        assert!(!storage.contains(nodes[1]));

        assert!(storage.copy_component(nodes[0], nodes[1]));
        assert_eq!(storage.get(nodes[1]), storage.get(nodes[0]));
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_sparse_dispatch() {
        let nodes = keys(2);
        let mut storage = SparseStorage::<Counter>::new();
        storage.insert(nodes[0], Counter::default());

        assert!(storage.dispatch(nodes[0], Hook::Awake));
        assert!(storage.dispatch(nodes[0], Hook::Enable));
        assert!(!storage.dispatch(nodes[1], Hook::Enable));

        assert_eq!(
            storage.get(nodes[0]),
            Some(&Counter {
                awake: 1,
                enabled: 1
            })
        );
    }

    #[test]
    fn test_component_registry() {
        let mut registry = ComponentRegistry::new();

        // First access creates storage
        let _storage = registry.get_or_create::<Position>();
        assert!(registry.get::<Position>().is_some());
        assert!(registry.get::<Counter>().is_none());

        let _storage = registry.get_or_create::<Counter>();
        assert!(registry.get_sparse::<Counter>().is_some());
        assert!(registry.get_dense::<Counter>().is_none());
    }
}
