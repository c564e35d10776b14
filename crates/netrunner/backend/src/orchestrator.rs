//! Network orchestrator
//!
//! The orchestrator is the process-wide registry of named networks. A create
//! call reserves its name under the write lock, releases the lock while the
//! backend does slow work, and then publishes the network. Other names are
//! never blocked by a slow create, and a reserved name rejects duplicates.
//!
//! Tearing the orchestrator down closes it. A create still in flight at that
//! point releases its fresh network instead of publishing it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{error, info, instrument, warn, Span};

use crate::constructor::NetworkBackend;
use crate::error::{BackendError, BackendResult};
use crate::network::Network;

enum Slot {
    /// Name claimed by an in-flight create.
    Reserved,
    Ready(Arc<Network>),
}

#[derive(Default)]
struct Slots {
    entries: HashMap<String, Slot>,
    closed: bool,
}

type Registry = RwLock<Slots>;

/// Releases a name reservation unless the network was published.
///
/// Dropping the create future (cancellation) drops this guard too, so the
/// registry never keeps a half-registered name.
struct Reservation<'a> {
    networks: &'a Registry,
    name: String,
    committed: bool,
}

impl Reservation<'_> {
    /// Publish the network. Returns false if the orchestrator closed while
    /// it was being created; the name is released in that case.
    fn commit(mut self, network: Arc<Network>) -> bool {
        let networks = self.networks;
        let mut slots = networks.write();
        if slots.closed {
            slots.entries.remove(&self.name);
        } else {
            slots.entries.insert(self.name.clone(), Slot::Ready(network));
        }
        self.committed = true;
        !slots.closed
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        let mut slots = self.networks.write();
        if matches!(slots.entries.get(&self.name), Some(Slot::Reserved)) {
            slots.entries.remove(&self.name);
        }
    }
}

/// Registry of live networks over one launch backend.
pub struct NetworkOrchestrator {
    backend: Arc<dyn NetworkBackend>,
    networks: Registry,
    span: Span,
}

impl NetworkOrchestrator {
    pub fn new(backend: Arc<dyn NetworkBackend>) -> Self {
        let span = tracing::info_span!("orchestrator", backend = backend.kind());
        Self {
            backend,
            networks: RwLock::new(Slots::default()),
            span,
        }
    }

    /// Replace the span networks and operations log under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn backend_kind(&self) -> &'static str {
        self.backend.kind()
    }

    /// Create an isolated network called `name`.
    ///
    /// Fails with [`BackendError::DuplicateNetwork`] if the name is live or
    /// being created. A torn-down network's name may be reused. Fails with
    /// [`BackendError::OrchestratorClosed`] once the orchestrator is torn
    /// down, including when that happens while the network is constructed.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn create_network(&self, name: &str) -> BackendResult<Arc<Network>> {
        let reservation = self.reserve(name)?;

        let start = Instant::now();
        let constructor = self.backend.construct(name).await.map_err(|e| {
            error!(error = %e, "Failed to construct network");
            e
        })?;

        let network = Arc::new(Network::new(name, constructor, &self.span));
        if !reservation.commit(network.clone()) {
            warn!("Orchestrator closed during create; releasing network");
            if let Err(e) = network.teardown().await {
                warn!(error = %e, "Failed to release network created after close");
            }
            return Err(BackendError::OrchestratorClosed);
        }

        info!(
            network_id = %network.id(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Created network"
        );
        Ok(network)
    }

    fn reserve(&self, name: &str) -> BackendResult<Reservation<'_>> {
        let mut slots = self.networks.write();
        if slots.closed {
            return Err(BackendError::OrchestratorClosed);
        }
        let taken = match slots.entries.get(name) {
            Some(Slot::Reserved) => true,
            Some(Slot::Ready(network)) => !network.is_torn_down(),
            None => false,
        };
        if taken {
            return Err(BackendError::DuplicateNetwork(name.to_string()));
        }

        slots.entries.insert(name.to_string(), Slot::Reserved);
        Ok(Reservation {
            networks: &self.networks,
            name: name.to_string(),
            committed: false,
        })
    }

    /// Look up a live network.
    pub fn get_network(&self, name: &str) -> Option<Arc<Network>> {
        match self.networks.read().entries.get(name) {
            Some(Slot::Ready(network)) if !network.is_torn_down() => Some(network.clone()),
            _ => None,
        }
    }

    /// Names of live networks, sorted.
    pub fn network_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .networks
            .read()
            .entries
            .iter()
            .filter_map(|(name, slot)| match slot {
                Slot::Ready(network) if !network.is_torn_down() => Some(name.clone()),
                _ => None,
            })
            .collect();
        names.sort();
        names
    }

    /// Remove a network from the registry and tear it down.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn teardown_network(&self, name: &str) -> BackendResult<()> {
        let network = {
            let mut slots = self.networks.write();
            match slots.entries.get(name) {
                Some(Slot::Ready(_)) => match slots.entries.remove(name) {
                    Some(Slot::Ready(network)) => network,
                    _ => return Err(BackendError::NetworkNotFound(name.to_string())),
                },
                _ => return Err(BackendError::NetworkNotFound(name.to_string())),
            }
        };

        network.teardown().await
    }

    /// Close the orchestrator, tear down every registered network, then let
    /// the backend reclaim anything left over.
    ///
    /// Every network is attempted even if one fails; the first error is
    /// returned. Repeated calls are no-ops apart from the backend clean.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn teardown(&self) -> BackendResult<()> {
        let start = Instant::now();

        let networks: Vec<Arc<Network>> = {
            let mut slots = self.networks.write();
            slots.closed = true;
            let names: Vec<String> = slots
                .entries
                .iter()
                .filter(|(_, slot)| matches!(slot, Slot::Ready(_)))
                .map(|(name, _)| name.clone())
                .collect();
            names
                .into_iter()
                .filter_map(|name| match slots.entries.remove(&name) {
                    Some(Slot::Ready(network)) => Some(network),
                    _ => None,
                })
                .collect()
        };

        let mut first_error = None;
        for network in networks {
            if let Err(e) = network.teardown().await {
                warn!(network = %network.name(), error = %e, "Failed to tear down network");
                first_error.get_or_insert(e);
            }
        }

        if let Err(e) = self.backend.clean().await {
            warn!(error = %e, "Backend clean failed");
            first_error.get_or_insert(e);
        }

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Took {:?} to teardown orchestrator",
            start.elapsed()
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for NetworkOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkOrchestrator")
            .field("backend", &self.backend.kind())
            .field("networks", &self.network_names())
            .finish()
    }
}
