//! kubegate - log in to groups of Kubernetes clusters.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── login         # Log in to a group of targets
//! │   ├── groups        # List configured groups
//! │   ├── output        # Terminal output helpers
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # ~/.kubegate/config.toml
//!     ├── domain/       # Target, Group, Credential
//!     ├── resolve       # Group resolution
//!     ├── retriever/    # Provider retrievers
//!     │   ├── mod       # Retriever trait
//!     │   ├── factory   # Provider type -> retriever
//!     │   ├── osprey    # Osprey gateway
//!     │   └── oidc      # OIDC device flow / pasted token
//!     ├── login         # Login orchestrator
//!     └── sink/         # Credential persistence
//!         ├── mod       # Sink trait
//!         └── kubeconfig
//! ```
//!
//! # Login semantics
//!
//! - Targets are processed one at a time in group order
//! - A rejected identity aborts the run; later targets are never attempted
//! - An unreachable target is reported and the run continues
//! - Kubeconfig entries for targets outside the run are never touched

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::config::LoginConfig;
pub use crate::core::domain::{AuthMaterial, Credential, Group, ProviderType, Target};
pub use crate::core::login::{login, Event, Login, Outcome, Status};
pub use crate::core::resolve::resolve;
pub use crate::core::retriever::{Retriever, RetrieverFactory};
pub use crate::core::sink::{Kubeconfig, Sink};
