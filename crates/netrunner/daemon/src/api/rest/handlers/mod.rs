//! REST API handlers

mod network;
mod system;

pub use network::*;
pub use system::*;
