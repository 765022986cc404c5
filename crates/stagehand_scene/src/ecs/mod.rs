//! Nodes, components and the world that owns them
//!
//! ## Overview
//!
//! - **Node**: a unique identifier for a scene object with a name, an active
//!   flag, a transform and a place in the hierarchy
//! - **Component**: data attached to nodes, with lifecycle hooks
//! - **World**: container for all nodes and components; drives the hooks

mod component;
mod entity;
mod world;

pub use component::{
    Component, ComponentRegistry, ComponentStorage, DenseStorage, Hook, SparseStorage, StorageType,
};
pub use entity::{ComponentSlot, NodeBuilder, NodeId, NodeManager, NodeMeta};
pub use world::World;
