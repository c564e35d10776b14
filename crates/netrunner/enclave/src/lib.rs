//! # Netrunner Enclave - Container launch backend
//!
//! Runs every network inside its own sandbox enclave: an isolated container
//! network on a container engine. Nodes are containers within the enclave and
//! address each other by private IP.
//!
//! - [`SandboxEngine`]: The operations consumed from the engine
//! - [`DockerEngine`]: [`SandboxEngine`] over the local Docker daemon
//! - [`EnclaveBackend`]: One enclave per network, images prepared up front
//!
//! Tearing a network down destroys its enclave as a whole; nodes are not
//! removed one by one.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod backend;
pub mod constructor;
pub mod docker;
pub mod engine;
pub mod node;

pub use backend::EnclaveBackend;
pub use constructor::EnclaveConstructor;
pub use docker::DockerEngine;
pub use engine::{SandboxEngine, ServiceInfo, ServiceSpec};
pub use node::EnclaveNode;
