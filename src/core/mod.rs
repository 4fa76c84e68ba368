//! Core library components.
//!
//! Configuration, target and group models, credential retrieval, the login
//! orchestrator and kubeconfig persistence.

pub mod config;
pub mod constants;
pub mod domain;
pub mod login;
pub mod resolve;
pub mod retriever;
pub mod sink;
