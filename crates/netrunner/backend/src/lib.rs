//! # Netrunner Backend - Network orchestration core
//!
//! This crate owns the lifecycle of ephemeral test networks:
//!
//! - [`NetworkOrchestrator`]: Registry of named networks with at-most-one
//!   instance per name
//! - [`Network`]: An isolated set of nodes bound to one launch backend
//! - [`NetworkConstructor`] / [`NetworkBackend`]: The seam between the core and
//!   a concrete substrate (local processes or sandboxed containers)
//! - [`allocate_ports`]: Batches of mutually exclusive free TCP ports
//! - [`ExecutorRegistry`]: Executor kind to binary path / image resolution
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use netrunner_backend::{NetworkBackend, NetworkOrchestrator};
//! use netrunner_types::{constants::NORMAL_EXECUTION, NodeConfig};
//!
//! # async fn example(backend: Arc<dyn NetworkBackend>) -> netrunner_backend::BackendResult<()> {
//! let orchestrator = NetworkOrchestrator::new(backend);
//! let network = orchestrator.create_network("net1").await?;
//! let node = network.add_node(NodeConfig::new("node0", NORMAL_EXECUTION)).await?;
//! println!("{} listening on {}", node.name(), node.http_base_uri());
//! orchestrator.teardown().await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod bootstrap;
pub mod constructor;
pub mod error;
pub mod executor;
pub mod network;
pub mod node;
pub mod orchestrator;
pub mod ports;

pub use bootstrap::create_default_network;
pub use constructor::{NetworkBackend, NetworkConstructor};
pub use error::{BackendError, BackendResult};
pub use executor::ExecutorRegistry;
pub use network::Network;
pub use node::{Node, NodeHandle};
pub use orchestrator::NetworkOrchestrator;
pub use ports::allocate_ports;
