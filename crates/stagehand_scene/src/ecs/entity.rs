//! Node management

use crate::error::{Result, SceneError};
use crate::scene::{HideFlags, Transform};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::any::TypeId;

new_key_type! {
    /// Unique identifier for a node in the world
    pub struct NodeId;
}

/// A component attached to a node, in attachment order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentSlot {
    /// Type of the attached component
    pub type_id: TypeId,
    /// Type name, for logging
    pub type_name: &'static str,
    /// Whether `awake` already ran for this component
    pub awoken: bool,
}

/// Node metadata: name, activation, flags and local transform
#[derive(Clone, Debug)]
pub struct NodeMeta {
    /// Name shown in hierarchies and logs
    pub name: String,
    /// The node's own active flag, ignoring ancestors
    pub active_self: bool,
    /// Editor/serialization visibility flags
    pub hide_flags: HideFlags,
    /// Transform relative to the parent
    pub transform: Transform,
    /// Attached components in attachment order
    pub components: SmallVec<[ComponentSlot; 4]>,
}

impl NodeMeta {
    /// Create new, active node metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active_self: true,
            hide_flags: HideFlags::NONE,
            transform: Transform::IDENTITY,
            components: SmallVec::new(),
        }
    }

    /// Find the slot for a component type
    pub fn slot(&self, type_id: TypeId) -> Option<&ComponentSlot> {
        self.components.iter().find(|s| s.type_id == type_id)
    }

    pub(crate) fn slot_mut(&mut self, type_id: TypeId) -> Option<&mut ComponentSlot> {
        self.components.iter_mut().find(|s| s.type_id == type_id)
    }
}

/// Manages node lifecycle and hierarchy
pub struct NodeManager {
    /// Node storage with metadata
    nodes: SlotMap<NodeId, NodeMeta>,
    /// Parent-child relationships
    children: FxHashMap<NodeId, SmallVec<[NodeId; 8]>>,
    /// Child-parent relationships
    parents: FxHashMap<NodeId, NodeId>,
}

impl Default for NodeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeManager {
    /// Create a new node manager
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a node manager with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(capacity),
            children: FxHashMap::default(),
            parents: FxHashMap::default(),
        }
    }

    /// Spawn a new node with metadata
    pub fn spawn(&mut self, meta: NodeMeta) -> NodeId {
        self.nodes.insert(meta)
    }

    /// Check if a node exists
    pub fn exists(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Get node metadata
    pub fn get(&self, node: NodeId) -> Option<&NodeMeta> {
        self.nodes.get(node)
    }

    /// Get mutable node metadata
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut NodeMeta> {
        self.nodes.get_mut(node)
    }

    /// Get node metadata or fail with [`SceneError::NodeNotFound`]
    pub fn meta(&self, node: NodeId) -> Result<&NodeMeta> {
        self.nodes.get(node).ok_or(SceneError::NodeNotFound(node))
    }

    /// Get mutable node metadata or fail with [`SceneError::NodeNotFound`]
    pub fn meta_mut(&mut self, node: NodeId) -> Result<&mut NodeMeta> {
        self.nodes.get_mut(node).ok_or(SceneError::NodeNotFound(node))
    }

    /// Despawn a node and all its children
    pub fn despawn(&mut self, node: NodeId) {
        if let Some(children) = self.children.remove(&node) {
            for child in children {
                self.parents.remove(&child);
                self.despawn(child);
            }
        }

        self.detach(node);
        self.nodes.remove(node);
    }

    /// Set or clear the parent of a node
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<()> {
        self.meta(child)?;
        if let Some(parent) = parent {
            self.meta(parent)?;
            if parent == child || self.is_ancestor(child, parent) {
                return Err(SceneError::CyclicParent { child, parent });
            }
        }

        self.detach(child);
        if let Some(parent) = parent {
            self.parents.insert(child, parent);
            self.children.entry(parent).or_default().push(child);
        }
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.parents.remove(&child) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|e| *e != child);
            }
        }
    }

    /// Get parent of a node
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    /// Get children of a node
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.children.get(&node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Iterate from the node's parent up to the root
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |n| self.parent(*n))
    }

    /// Whether `ancestor` is above `node` in the hierarchy
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|n| n == ancestor)
    }

    /// The node followed by all its descendants, depth first
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// A node is active in the hierarchy when it and every ancestor is active
    pub fn active_in_hierarchy(&self, node: NodeId) -> bool {
        let Some(meta) = self.nodes.get(node) else {
            return false;
        };
        meta.active_self
            && self
                .ancestors(node)
                .all(|n| self.nodes.get(n).is_some_and(|m| m.active_self))
    }

    /// Get all nodes
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    /// Get node count
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builder for spawning nodes with components
pub struct NodeBuilder<'w> {
    world: &'w mut super::World,
    node: NodeId,
}

impl<'w> NodeBuilder<'w> {
    pub(crate) fn new(world: &'w mut super::World, node: NodeId) -> Self {
        Self { world, node }
    }

    /// Insert a component
    pub fn insert<C: super::Component>(self, component: C) -> Self {
        let _ = self.world.insert(self.node, component);
        self
    }

    /// Set parent node, keeping the local transform
    pub fn parent(self, parent: NodeId) -> Result<Self> {
        self.world.set_parent(self.node, Some(parent), false)?;
        Ok(self)
    }

    /// Deactivate the node
    pub fn inactive(self) -> Self {
        let _ = self.world.set_active(self.node, false);
        self
    }

    /// Set hide flags
    pub fn hide_flags(self, flags: HideFlags) -> Self {
        if let Some(meta) = self.world.nodes.get_mut(self.node) {
            meta.hide_flags = flags;
        }
        self
    }

    /// Set the local transform
    pub fn transform(self, transform: Transform) -> Self {
        if let Some(meta) = self.world.nodes.get_mut(self.node) {
            meta.transform = transform;
        }
        self
    }

    /// Get the node ID
    pub fn id(self) -> NodeId {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(manager: &mut NodeManager, name: &str) -> NodeId {
        manager.spawn(NodeMeta::new(name))
    }

    #[test]
    fn test_node_spawn_despawn() {
        let mut manager = NodeManager::new();

        let n1 = spawn(&mut manager, "a");
        let n2 = spawn(&mut manager, "b");

        assert!(manager.exists(n1));
        assert!(manager.exists(n2));
        assert_eq!(manager.len(), 2);

        manager.despawn(n1);
        assert!(!manager.exists(n1));
        assert!(manager.exists(n2));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_node_hierarchy() {
        let mut manager = NodeManager::new();

        let parent = spawn(&mut manager, "parent");
        let child1 = spawn(&mut manager, "child1");
        let child2 = spawn(&mut manager, "child2");

        manager.set_parent(child1, Some(parent)).unwrap();
        manager.set_parent(child2, Some(parent)).unwrap();

        assert_eq!(manager.parent(child1), Some(parent));
        assert_eq!(manager.children(parent), &[child1, child2]);

        manager.set_parent(child1, None).unwrap();
        assert_eq!(manager.parent(child1), None);
        assert_eq!(manager.children(parent), &[child2]);
    }

    #[test]
    fn test_reparent_rejects_cycles() {
        let mut manager = NodeManager::new();

        let root = spawn(&mut manager, "root");
        let child = spawn(&mut manager, "child");
        manager.set_parent(child, Some(root)).unwrap();

        assert_eq!(
            manager.set_parent(root, Some(child)),
            Err(SceneError::CyclicParent {
                child: root,
                parent: child
            })
        );
        assert!(manager.set_parent(root, Some(root)).is_err());
    }

    #[test]
    fn test_recursive_despawn() {
        let mut manager = NodeManager::new();

        let parent = spawn(&mut manager, "parent");
        let child = spawn(&mut manager, "child");
        let grandchild = spawn(&mut manager, "grandchild");

        manager.set_parent(child, Some(parent)).unwrap();
        manager.set_parent(grandchild, Some(child)).unwrap();
        assert_eq!(manager.subtree(parent), vec![parent, child, grandchild]);

        manager.despawn(parent);

        assert!(manager.is_empty());
    }

    #[test]
    fn test_active_in_hierarchy_follows_ancestors() {
        let mut manager = NodeManager::new();

        let parent = spawn(&mut manager, "parent");
        let child = spawn(&mut manager, "child");
        manager.set_parent(child, Some(parent)).unwrap();

        assert!(manager.active_in_hierarchy(child));

        manager.get_mut(parent).unwrap().active_self = false;
        assert!(!manager.active_in_hierarchy(child));
        assert!(manager.get(child).unwrap().active_self);
    }
}
