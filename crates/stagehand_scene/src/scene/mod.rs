//! Scene graph data: transforms and node flags

mod flags;
mod transform;

pub use flags::HideFlags;
pub use transform::{Transform, TransformMut};
