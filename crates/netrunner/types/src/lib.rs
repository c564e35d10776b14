//! Netrunner Types - Core types for test network orchestration
//!
//! Netrunner stands up, queries and tears down ephemeral multi-node networks of
//! validator processes. These types are shared by the orchestrator core, the
//! launch backends and the REST gateway.
//!
//! ## Key Concepts
//!
//! - **NodeConfig**: Declarative description of one node to launch
//! - **ConfigMap**: Opaque, ordered key-value bag handed to the node binary
//! - **NodeInfo**: Wire record describing a launched node
//! - **NetworkState**: Lifecycle state of a network
//! - **api**: Request and response bodies of the control-plane gateway

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod api;
pub mod config;
pub mod constants;
pub mod network;
pub mod node;

pub use config::{ConfigError, ConfigMap, NodeConfig};
pub use network::NetworkState;
pub use node::NodeInfo;
