pub mod config;
pub mod control;
pub mod pole;
pub mod ragdoll;
pub mod retarget;
pub mod rig;

pub use config::*;
pub use control::*;
pub use pole::*;
pub use ragdoll::*;
pub use retarget::*;
pub use rig::*;
