//! # Netrunner Local - Local-process launch backend
//!
//! Runs every node as a child process of the orchestrator on the local host:
//!
//! - [`OrchestratorConfig`]: Base directory, executor registry, cleanup policy
//! - [`LocalBackend`]: [`NetworkBackend`](netrunner_backend::NetworkBackend)
//!   creating one working directory per network
//! - [`LocalNode`]: A spawned node binary and its addresses
//!
//! Each node gets `<base>/<network>/<node>` holding its `config.json` and
//! captured output. Ports the config omits come from the port allocator.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod backend;
pub mod config;
pub mod constructor;
pub mod node;
mod process;

pub use backend::LocalBackend;
pub use config::OrchestratorConfig;
pub use constructor::LocalConstructor;
pub use node::LocalNode;
