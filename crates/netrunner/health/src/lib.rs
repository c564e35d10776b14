//! # Netrunner Health - Readiness gate
//!
//! Blocks callers until every node of a network answers its health check:
//!
//! - [`await_healthy`]: Poll until a full pass finds all nodes healthy
//! - [`await_healthy_within`]: The same, bounded by a deadline
//! - [`HealthProbe`]: How a single node is checked
//! - [`HttpHealthProbe`]: `GET {uri}/ext/health`, healthy on 2xx

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod gate;
pub mod probe;

pub use error::{HealthError, HealthResult};
pub use gate::{await_healthy, await_healthy_within, DEFAULT_POLL_INTERVAL};
pub use probe::{HealthProbe, HttpHealthProbe};
