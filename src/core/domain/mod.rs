//! Domain types.

mod credential;
mod group;
mod target;

pub use credential::{AuthMaterial, Credential};
pub use group::Group;
pub use target::{ProviderType, Target};
