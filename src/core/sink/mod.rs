//! Credential persistence.
//!
//! The login orchestrator hands every successfully retrieved credential to a
//! [`Sink`]. The default sink merges it into a kubeconfig file.
//!
//! ## Example
//!
//! ```ignore
//! struct Recording(Vec<String>);
//!
//! impl Sink for Recording {
//!     fn update(&mut self, target: &str, _: &[String], _: &Credential) -> Result<(), SinkError> {
//!         self.0.push(target.to_string());
//!         Ok(())
//!     }
//! }
//! ```

mod kubeconfig;

pub use kubeconfig::Kubeconfig;

use crate::core::domain::Credential;
use crate::error::SinkError;

/// Persistent store for cluster credentials.
pub trait Sink {
    /// Store the credential for a target under its name and aliases.
    ///
    /// Must be idempotent per target name and must leave entries for other
    /// targets untouched.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the store cannot be read or written.
    fn update(
        &mut self,
        target: &str,
        aliases: &[String],
        credential: &Credential,
    ) -> Result<(), SinkError>;
}
