//! Free TCP port allocation

use std::net::{Ipv4Addr, TcpListener};

use crate::error::{BackendError, BackendResult};

/// Allocate `count` distinct TCP ports that are free on the local host.
///
/// Every listener stays bound until the whole batch is collected so the OS
/// cannot hand the same port out twice within one batch. All listeners are
/// closed before returning, on success and on failure alike.
pub fn allocate_ports(count: usize) -> BackendResult<Vec<u16>> {
    let mut listeners = Vec::with_capacity(count);
    let mut ports = Vec::with_capacity(count);

    for _ in 0..count {
        let listener =
            TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).map_err(BackendError::PortAllocation)?;
        let port = listener
            .local_addr()
            .map_err(BackendError::PortAllocation)?
            .port();
        ports.push(port);
        listeners.push(listener);
    }

    drop(listeners);
    tracing::trace!(?ports, "Allocated free ports");
    Ok(ports)
}
