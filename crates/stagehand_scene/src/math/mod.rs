//! Math types for the scene hierarchy

mod quat;
mod vec3;

pub use quat::Quat;
pub use vec3::Vec3;
