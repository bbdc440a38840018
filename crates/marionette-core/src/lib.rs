pub mod armature;
pub mod error;
pub mod scene;
pub mod transform;

pub use armature::*;
pub use error::*;
pub use scene::*;
pub use transform::*;
