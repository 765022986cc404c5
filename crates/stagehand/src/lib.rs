//! Stagehand
//!
//! Staged construction of scene nodes. A node is created (or cloned)
//! deactivated, its components receive their initialization arguments, and
//! only then is the node activated. Component lifecycle hooks (`awake`,
//! `on_enable`) therefore never run against a half-initialized component.
//!
//! # Features
//!
//! - **StagedNode**: one component per node, created fresh, cloned or
//!   deferred
//! - **StagedPair**: two sibling components wired to each other through
//!   positional tokens ([`First`], [`Second`])
//! - **StagedTriple**: the same for three components, with [`Third`]
//! - **InitPhase**: step-by-step initialization of multi-component nodes,
//!   each component receiving its own arguments before activation
//! - **StageOptions**: name, parent, spatial properties, hide flags and
//!   final activation state in one serde-friendly struct
//!
//! # Example
//!
//! ```rust
//! use stagehand::prelude::*;
//! use stagehand_scene::{Component, Vec3, World};
//!
//! #[derive(Clone, Default)]
//! struct Turret {
//!     range: f32,
//!     armed_on_awake: bool,
//! }
//!
//! impl Component for Turret {
//!     fn awake(&mut self) {
//!         self.armed_on_awake = self.range > 0.0;
//!     }
//! }
//!
//! impl Initializable<f32> for Turret {
//!     fn init(&mut self, range: f32) -> anyhow::Result<()> {
//!         self.range = range;
//!         Ok(())
//!     }
//! }
//!
//! let mut world = World::new();
//! let options = StageOptions::new()
//!     .named("Turret")
//!     .with_position(Vec3::new(4.0, 0.0, 2.0));
//!
//! let mut staged = StagedNode::<Turret>::new(&mut world, options)?;
//! let turret = staged.init_with(12.5)?;
//! assert!(turret.armed_on_awake);
//! # Ok::<(), stagehand::StageError>(())
//! ```

pub mod error;
pub mod init;
pub mod options;
pub mod pair;
pub mod phase;
pub mod stage;
pub mod staged;
pub mod token;
pub mod triple;


pub use error::{Result, StageError};
pub use init::{ComponentRef, Initializable, SiblingRef};
pub use options::StageOptions;
pub use pair::StagedPair;
pub use phase::{
    InitPhase, PairFirstPhase, PairSecondPhase, TripleFirstPhase, TripleSecondPhase,
    TripleThirdPhase,
};
pub use stage::NodeState;
pub use staged::StagedNode;
pub use token::{resolve_sibling, First, Position, Positional, Second, Third};
pub use triple::StagedTriple;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::StageError;
    pub use crate::init::{ComponentRef, Initializable};
    pub use crate::options::StageOptions;
    pub use crate::pair::StagedPair;
    pub use crate::staged::StagedNode;
    pub use crate::token::{First, Second, Third};
    pub use crate::triple::StagedTriple;
}
