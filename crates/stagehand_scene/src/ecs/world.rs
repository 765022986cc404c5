//! World container for all nodes and components

use super::{
    Component, ComponentRegistry, ComponentSlot, Hook, NodeBuilder, NodeId, NodeManager,
    NodeMeta, StorageType,
};
use crate::config::SceneConfig;
use crate::error::Result;
use crate::scene::{HideFlags, Transform, TransformMut};
use smallvec::SmallVec;
use std::any::{type_name, TypeId};

/// The World contains all nodes and their components
pub struct World {
    /// Node manager
    pub(crate) nodes: NodeManager,
    /// Component storage registry
    components: ComponentRegistry,
    /// Behavior settings
    config: SceneConfig,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create a new empty world with custom configuration
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            nodes: NodeManager::with_capacity(config.initial_capacity),
            components: ComponentRegistry::new(),
            config,
        }
    }

    /// Get the world configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    // === Node Operations ===

    /// Spawn a new, active root node
    pub fn spawn(&mut self, name: impl Into<String>) -> NodeBuilder<'_> {
        let node = self.nodes.spawn(NodeMeta::new(name));
        NodeBuilder::new(self, node)
    }

    /// Despawn a node, its descendants and all their components
    pub fn despawn(&mut self, node: NodeId) {
        for n in self.nodes.subtree(node) {
            self.components.remove_all(n);
        }
        self.nodes.despawn(node);
    }

    /// Check if a node exists
    pub fn exists(&self, node: NodeId) -> bool {
        self.nodes.exists(node)
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get node metadata
    pub fn meta(&self, node: NodeId) -> Result<&NodeMeta> {
        self.nodes.meta(node)
    }

    /// Get the node name
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|m| m.name.as_str())
    }

    /// Rename a node
    pub fn set_name(&mut self, node: NodeId, name: impl Into<String>) -> Result<()> {
        self.nodes.meta_mut(node)?.name = name.into();
        Ok(())
    }

    /// Get the node hide flags
    pub fn hide_flags(&self, node: NodeId) -> Option<HideFlags> {
        self.nodes.get(node).map(|m| m.hide_flags)
    }

    /// Replace the node hide flags
    pub fn set_hide_flags(&mut self, node: NodeId, flags: HideFlags) -> Result<()> {
        self.nodes.meta_mut(node)?.hide_flags = flags;
        Ok(())
    }

    /// Get parent of a node
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.parent(node)
    }

    /// Get children of a node
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.children(node)
    }

    // === Activation ===

    /// The node's own active flag (false for missing nodes)
    pub fn active_self(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|m| m.active_self)
    }

    /// Whether the node and all its ancestors are active
    pub fn active_in_hierarchy(&self, node: NodeId) -> bool {
        self.nodes.active_in_hierarchy(node)
    }

    /// Activate or deactivate a node
    ///
    /// Descendants whose effective activation changes get their lifecycle
    /// hooks run, parents before children.
    pub fn set_active(&mut self, node: NodeId, active: bool) -> Result<()> {
        if self.nodes.meta(node)?.active_self == active {
            return Ok(());
        }

        let before = self.snapshot_activation(node);
        self.nodes.meta_mut(node)?.active_self = active;
        self.apply_activation_changes(before);
        Ok(())
    }

    fn snapshot_activation(&self, node: NodeId) -> Vec<(NodeId, bool)> {
        self.nodes
            .subtree(node)
            .into_iter()
            .map(|n| (n, self.nodes.active_in_hierarchy(n)))
            .collect()
    }

    fn apply_activation_changes(&mut self, before: Vec<(NodeId, bool)>) {
        for (node, was_active) in before {
            let is_active = self.nodes.active_in_hierarchy(node);
            match (was_active, is_active) {
                (false, true) => self.activate_components(node),
                (true, false) => self.disable_components(node),
                _ => {}
            }
        }
    }

    fn activate_components(&mut self, node: NodeId) {
        let slots = self.slots(node);
        for slot in slots {
            self.activate_component(node, slot);
        }
    }

    fn activate_component(&mut self, node: NodeId, slot: ComponentSlot) {
        if !slot.awoken {
            if let Some(meta_slot) = self
                .nodes
                .get_mut(node)
                .and_then(|m| m.slot_mut(slot.type_id))
            {
                meta_slot.awoken = true;
            }
            self.dispatch(node, slot, Hook::Awake);
        }
        self.dispatch(node, slot, Hook::Enable);
    }

    fn disable_components(&mut self, node: NodeId) {
        for slot in self.slots(node) {
            self.dispatch(node, slot, Hook::Disable);
        }
    }

    fn slots(&self, node: NodeId) -> SmallVec<[ComponentSlot; 4]> {
        self.nodes
            .get(node)
            .map(|m| m.components.clone())
            .unwrap_or_default()
    }

    fn dispatch(&mut self, node: NodeId, slot: ComponentSlot, hook: Hook) {
        if self.config.trace_lifecycle {
            tracing::trace!(?node, component = slot.type_name, ?hook, "lifecycle hook");
        }
        if let Some(storage) = self.components.get_by_id_mut(slot.type_id) {
            storage.dispatch(node, hook);
        }
    }

    // === Hierarchy ===

    /// Set or clear the parent of a node
    ///
    /// With `keep_world` the node keeps its world position, rotation and
    /// scale; otherwise its local transform is kept as-is.
    pub fn set_parent(
        &mut self,
        child: NodeId,
        parent: Option<NodeId>,
        keep_world: bool,
    ) -> Result<()> {
        let world_before = self.world_transform(child)?;
        let before = self.snapshot_activation(child);

        self.nodes.set_parent(child, parent)?;

        if keep_world {
            let parent_world = self.parent_world(child)?;
            let meta = self.nodes.meta_mut(child)?;
            meta.transform = Transform {
                position: parent_world.inverse_position(world_before.position),
                rotation: parent_world.inverse_rotation(world_before.rotation),
                scale: parent_world.inverse_scale(world_before.scale),
            };
        }

        self.apply_activation_changes(before);
        Ok(())
    }

    // === Transforms ===

    /// Local transform of a node
    pub fn local_transform(&self, node: NodeId) -> Result<Transform> {
        Ok(self.nodes.meta(node)?.transform)
    }

    /// World transform of a node
    pub fn world_transform(&self, node: NodeId) -> Result<Transform> {
        let local = self.nodes.meta(node)?.transform;
        Ok(self.parent_world(node)?.compose(&local))
    }

    fn parent_world(&self, node: NodeId) -> Result<Transform> {
        let chain: Vec<NodeId> = self.nodes.ancestors(node).collect();
        chain
            .into_iter()
            .rev()
            .try_fold(Transform::IDENTITY, |acc, n| -> Result<Transform> {
                Ok(acc.compose(&self.nodes.meta(n)?.transform))
            })
    }

    /// Mutable transform view with local and world accessors
    pub fn transform(&mut self, node: NodeId) -> Result<TransformMut<'_>> {
        let parent_world = self.parent_world(node)?;
        let local = &mut self.nodes.meta_mut(node)?.transform;
        Ok(TransformMut::new(node, parent_world, local))
    }

    // === Cloning ===

    /// Clone a node and its whole subtree
    ///
    /// Under `parent` the clone keeps the original's local transform; at the
    /// root it takes the original's world transform, so a parentless clone
    /// appears exactly where the original is. Components are copied in
    /// attachment order; clone nodes that end up active in the hierarchy run
    /// `awake` and `on_enable` immediately, exactly like freshly attached
    /// components.
    pub fn instantiate(&mut self, original: NodeId, parent: Option<NodeId>) -> Result<NodeId> {
        let world_pose = self.world_transform(original)?;
        if let Some(parent) = parent {
            self.nodes.meta(parent)?;
        }

        let root = self.clone_subtree(original, parent)?;
        let meta = self.nodes.meta_mut(root)?;
        if parent.is_none() {
            meta.transform = world_pose;
        }
        meta.name.push_str(&self.config.clone_suffix);
        tracing::debug!(?original, clone = ?root, name = %meta.name, "instantiated node");

        for node in self.nodes.subtree(root) {
            if self.nodes.active_in_hierarchy(node) {
                self.activate_components(node);
            }
        }
        Ok(root)
    }

    fn clone_subtree(&mut self, source: NodeId, parent: Option<NodeId>) -> Result<NodeId> {
        let mut meta = self.nodes.meta(source)?.clone();
        for slot in meta.components.iter_mut() {
            slot.awoken = false;
        }
        let slots = meta.components.clone();
        let children: SmallVec<[NodeId; 8]> = self.nodes.children(source).into();

        let target = self.nodes.spawn(meta);
        self.nodes.set_parent(target, parent)?;
        for slot in slots {
            if let Some(storage) = self.components.get_by_id_mut(slot.type_id) {
                storage.copy_component(source, target);
            }
        }

        for child in children {
            self.clone_subtree(child, Some(target))?;
        }
        Ok(target)
    }

    // === Component Operations ===

    /// Attach a component to a node, replacing any existing one of that type
    ///
    /// If the node is active in the hierarchy the component is woken and
    /// enabled before this returns.
    pub fn insert<C: Component>(&mut self, node: NodeId, component: C) -> Result<()> {
        let meta = self.nodes.meta_mut(node)?;
        let type_id = TypeId::of::<C>();
        let slot = match meta.slot_mut(type_id) {
            Some(slot) => {
                slot.awoken = false;
                *slot
            }
            None => {
                let slot = ComponentSlot {
                    type_id,
                    type_name: type_name::<C>(),
                    awoken: false,
                };
                meta.components.push(slot);
                slot
            }
        };

        self.components.get_or_create::<C>();
        match C::STORAGE {
            StorageType::Dense => {
                if let Some(storage) = self.components.get_dense_mut::<C>() {
                    storage.insert(node, component);
                }
            }
            StorageType::Sparse => {
                if let Some(storage) = self.components.get_sparse_mut::<C>() {
                    storage.insert(node, component);
                }
            }
        }

        if self.nodes.active_in_hierarchy(node) {
            self.activate_component(node, slot);
        }
        Ok(())
    }

    /// Get a component reference
    pub fn get<C: Component>(&self, node: NodeId) -> Option<&C> {
        match C::STORAGE {
            StorageType::Dense => self.components.get_dense::<C>()?.get(node),
            StorageType::Sparse => self.components.get_sparse::<C>()?.get(node),
        }
    }

    /// Get a mutable component reference
    pub fn get_mut<C: Component>(&mut self, node: NodeId) -> Option<&mut C> {
        match C::STORAGE {
            StorageType::Dense => self.components.get_dense_mut::<C>()?.get_mut(node),
            StorageType::Sparse => self.components.get_sparse_mut::<C>()?.get_mut(node),
        }
    }

    /// Check if a node has a component
    pub fn has<C: Component>(&self, node: NodeId) -> bool {
        self.components
            .get::<C>()
            .is_some_and(|s| s.contains(node))
    }

    /// Remove a component from a node
    ///
    /// The component is disabled first if its node is active.
    pub fn remove<C: Component>(&mut self, node: NodeId) -> bool {
        let type_id = TypeId::of::<C>();
        let Some(slot) = self.nodes.get(node).and_then(|m| m.slot(type_id)).copied() else {
            return false;
        };
        if self.nodes.active_in_hierarchy(node) {
            self.dispatch(node, slot, Hook::Disable);
        }
        if let Some(meta) = self.nodes.get_mut(node) {
            meta.components.retain(|s| s.type_id != type_id);
        }
        self.components
            .get_mut::<C>()
            .is_some_and(|s| s.remove(node))
    }

    /// Components attached to a node, in attachment order
    pub fn components(&self, node: NodeId) -> &[ComponentSlot] {
        self.nodes
            .get(node)
            .map(|m| m.components.as_slice())
            .unwrap_or(&[])
    }
}
