//! Central Module
//!
//! The central-role orchestrator and its supporting state machines.
//!
//! ## Architecture
//!
//! ```text
//!                         CentralEvent
//!                              ▲
//! ┌────────────────────────────┴────────────────────────────┐
//! │                         Central                          │
//! │   (registry · scheduler · scan filter · resource table)  │
//! └──────────┬───────────▲──────────────┬───────────▲───────┘
//!   HciCommand│  HciEvent│    GapCommand│   GapEvent│
//! ┌──────────▼───────────┴──────┐ ┌─────▼───────────┴───────┐
//! │         HCI engine          │ │        GAP engine        │
//! └─────────────────────────────┘ └─────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`filter`] - service-UUID discovery filter
//! - [`scheduler`] - single-outstanding connection scheduler
//! - [`registry`] - peripheral identity / address / handle registry
//! - [`resources`] - per-handle GATT / ACL / signaling resources

pub mod filter;
pub mod registry;
pub mod resources;
pub mod scheduler;

pub use filter::ScanFilter;
pub use registry::{AddressRecord, PeripheralRegistry};
pub use resources::{
    AclFrame, AclStream, ConnectionResources, GattSession, ResourceTable, SignalingChannel,
};
pub use scheduler::{ConnectionScheduler, QueuedConnection};

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::models::{
    AdapterState, AddressType, Advertisement, CentralEvent, ConnectionFailure, ConnectionHandle,
    ConnectionParameters, Discovery, LinkRole, PeripheralId,
};
use crate::domain::settings::ScanSettings;
use crate::infrastructure::gap::{GapCommand, GapEngine, GapEvent};
use crate::infrastructure::hci::{status_message, HciCommand, HciEngine, HciEvent};

/// Central-role orchestrator.
///
/// Owns the peripheral registry, the connection scheduler, the discovery
/// filter and the per-handle resource table, and drives them from the
/// events of an injected HCI engine and GAP engine. All state changes
/// happen synchronously inside [`handle_hci_event`](Self::handle_hci_event)
/// and [`handle_gap_event`](Self::handle_gap_event); the async
/// [`run`](Self::run) loop is only a pump around those two.
pub struct Central {
    hci: HciEngine,
    gap: GapEngine,
    events: mpsc::UnboundedSender<CentralEvent>,

    hci_events: Option<mpsc::UnboundedReceiver<HciEvent>>,
    gap_events: Option<mpsc::UnboundedReceiver<GapEvent>>,

    state: Option<AdapterState>,
    local_address: Option<String>,
    scanning: bool,
    filter: ScanFilter,
    registry: PeripheralRegistry,
    scheduler: ConnectionScheduler,
    resources: ResourceTable,
    shut_down: bool,
}

impl Central {
    /// Builds an orchestrator over injected engine handles. `events` is the
    /// upper layer's notification channel.
    pub fn new(
        hci: HciEngine,
        gap: GapEngine,
        events: mpsc::UnboundedSender<CentralEvent>,
    ) -> Self {
        Self {
            hci,
            gap,
            events,
            hci_events: None,
            gap_events: None,
            state: None,
            local_address: None,
            scanning: false,
            filter: ScanFilter::default(),
            registry: PeripheralRegistry::default(),
            scheduler: ConnectionScheduler::default(),
            resources: ResourceTable::default(),
            shut_down: false,
        }
    }

    /// Subscribes to both engine event surfaces and brings the controller
    /// up. Call once before [`run`](Self::run).
    pub fn init(&mut self) {
        info!("Initializing central");
        self.hci_events = self.hci.subscribe();
        self.gap_events = self.gap.subscribe();
        self.hci.send(HciCommand::Init);
    }

    /// Pumps engine events into the synchronous handlers until `shutdown`
    /// is cancelled or an engine closes its event channel, then runs
    /// [`shutdown`](Self::shutdown) and returns.
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<()> {
        let mut hci_events = self
            .hci_events
            .take()
            .ok_or_else(|| anyhow::anyhow!("run() requires init() to be called first"))?;
        let mut gap_events = self
            .gap_events
            .take()
            .ok_or_else(|| anyhow::anyhow!("run() requires init() to be called first"))?;

        info!("Central event loop running");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, stopping central event loop");
                    self.shutdown();
                    return Ok(());
                }
                event = hci_events.recv() => match event {
                    Some(event) => self.handle_hci_event(event),
                    None => {
                        warn!("HCI engine closed its event channel");
                        self.shutdown();
                        return Ok(());
                    }
                },
                event = gap_events.recv() => match event {
                    Some(event) => self.handle_gap_event(event),
                    None => {
                        warn!("GAP engine closed its event channel");
                        self.shutdown();
                        return Ok(());
                    }
                },
            }
        }
    }

    // ---- Upper-layer command surface ----

    /// Forwards scan timing to the GAP engine (0.625 ms units).
    pub fn set_scan_parameters(&self, interval: u16, window: u16) {
        self.gap.send(GapCommand::SetScanParameters { interval, window });
    }

    /// Arms the discovery filter and starts a scan session. `None` (or an
    /// empty list) accepts every discovered peripheral.
    pub fn start_scanning(&mut self, service_uuids: Option<Vec<String>>, allow_duplicates: bool) {
        let interest = service_uuids.unwrap_or_default();
        debug!(
            "Starting scan, interest set: {:?}, allow_duplicates: {}",
            interest, allow_duplicates
        );
        self.filter.set(interest);
        self.gap.send(GapCommand::StartScanning { allow_duplicates });
    }

    /// Starts a scan session with parameters and interest set taken from
    /// configuration.
    pub fn start_scanning_with(&mut self, settings: &ScanSettings) {
        self.set_scan_parameters(settings.interval, settings.window);
        self.start_scanning(
            Some(settings.service_uuids.clone()),
            settings.allow_duplicates,
        );
    }

    /// Stops the scan session and disarms the discovery filter; reports
    /// arriving after this are dropped.
    pub fn stop_scanning(&mut self) {
        self.filter.clear();
        self.gap.send(GapCommand::StopScanning);
    }

    /// Requests a connection to `peripheral`. At most one attempt is
    /// outstanding at a time; further requests queue FIFO and are issued
    /// as earlier attempts resolve, each with its own parameters.
    pub fn connect(&mut self, peripheral: PeripheralId, parameters: ConnectionParameters) {
        if self.scheduler.is_busy() {
            debug!("Connection to {} queued behind outstanding attempt", peripheral);
            self.scheduler.enqueue(peripheral, parameters);
            return;
        }
        self.issue_connection(peripheral, parameters);
    }

    /// Cancels a pending connection request. Removes the first matching
    /// queue entry (one per call, even with duplicates queued) and always
    /// asks the controller to cancel, with the handle if one is known.
    pub fn cancel_connect(&mut self, peripheral: &PeripheralId) {
        if self.scheduler.cancel_queued(peripheral).is_some() {
            debug!("Removed queued connection request for {}", peripheral);
        }
        let handle = self.registry.handle_of(peripheral);
        self.hci.send(HciCommand::CancelConnection { handle });
    }

    /// Requests teardown of the link to `peripheral`. An unknown identity
    /// is forwarded with no handle; the engine fails it.
    pub fn disconnect(&self, peripheral: &PeripheralId) {
        let handle = self.registry.handle_of(peripheral);
        self.hci.send(HciCommand::Disconnect { handle });
    }

    /// Resets the controller.
    pub fn reset(&self) {
        self.hci.send(HciCommand::Reset);
    }

    /// Requests a fresh RSSI reading for a connected peripheral.
    pub fn update_rssi(&self, peripheral: &PeripheralId) {
        let handle = self.registry.handle_of(peripheral);
        self.hci.send(HciCommand::ReadRssi { handle });
    }

    /// Tears the central down: stops scanning and requests disconnection
    /// of every tracked link, then releases all per-handle state.
    /// Idempotent; address records survive so identities stay resolvable.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        info!("Shutting down central");
        self.gap.send(GapCommand::StopScanning);
        for handle in self.registry.bound_handles() {
            self.hci.send(HciCommand::Disconnect {
                handle: Some(handle),
            });
        }
        self.resources.clear();
        self.registry.clear_handles();
        self.filter.clear();
        self.scanning = false;
    }

    // ---- Read accessors ----

    pub fn state(&self) -> Option<AdapterState> {
        self.state
    }

    /// The local adapter address, once the controller has reported it.
    pub fn local_address(&self) -> Option<&str> {
        self.local_address.as_deref()
    }

    pub fn address_record(&self, peripheral: &PeripheralId) -> Option<&AddressRecord> {
        self.registry.record(peripheral)
    }

    pub fn connection_handle(&self, peripheral: &PeripheralId) -> Option<ConnectionHandle> {
        self.registry.handle_of(peripheral)
    }

    /// The GATT session of an established link, by identity.
    pub fn gatt_session(&self, peripheral: &PeripheralId) -> Option<&GattSession> {
        let handle = self.registry.handle_of(peripheral)?;
        self.resources.get(handle).map(|set| &set.gatt)
    }

    /// The ACL stream of an established link, by identity.
    pub fn acl_stream_mut(&mut self, peripheral: &PeripheralId) -> Option<&mut AclStream> {
        let handle = self.registry.handle_of(peripheral)?;
        self.resources.get_mut(handle).map(|set| &mut set.acl)
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn connected_handles(&self) -> Vec<ConnectionHandle> {
        self.registry.bound_handles()
    }

    /// Forgets every discovered address record.
    pub fn clear_addresses(&mut self) {
        self.registry.clear_addresses();
    }

    // ---- Event dispatch ----

    /// Applies one HCI engine event. Public so embeddings and tests can
    /// drive the orchestrator without the run loop.
    pub fn handle_hci_event(&mut self, event: HciEvent) {
        match event {
            HciEvent::StateChange(state) => self.on_state_change(state),
            HciEvent::AddressChange(address) => self.on_address_change(address),
            HciEvent::LeConnComplete {
                status,
                handle,
                role,
                address_type,
                address,
                ..
            } => self.on_le_conn_complete(status, handle, role, address_type, address),
            HciEvent::LeConnUpdateComplete { handle, .. } => {
                // Connection parameter updates need no orchestrator state.
                debug!("Connection update complete on handle {}", handle);
            }
            HciEvent::DisconnComplete { handle, reason } => {
                self.on_disconn_complete(handle, reason)
            }
            HciEvent::RssiRead { handle, rssi } => self.on_rssi_read(handle, rssi),
            HciEvent::EncryptChange { handle, encrypted } => {
                self.on_encrypt_change(handle, encrypted)
            }
            HciEvent::AclDataPkt { handle, cid, data } => self.on_acl_data(handle, cid, data),
        }
    }

    /// Applies one GAP engine event.
    pub fn handle_gap_event(&mut self, event: GapEvent) {
        match event {
            GapEvent::ScanParametersSet => self.emit(CentralEvent::ScanParametersSet),
            GapEvent::ScanStart { filter_duplicates } => {
                self.scanning = true;
                self.emit(CentralEvent::ScanStart { filter_duplicates });
            }
            GapEvent::ScanStop => {
                self.scanning = false;
                self.emit(CentralEvent::ScanStop);
            }
            GapEvent::Discover {
                status: _,
                address,
                address_type,
                connectable,
                advertisement,
                rssi,
            } => self.on_discover(address, address_type, connectable, advertisement, rssi),
        }
    }

    fn on_state_change(&mut self, state: AdapterState) {
        if self.state == Some(state) {
            debug!("Adapter state {} repeated, coalesced", state);
            return;
        }
        info!("Adapter state changed to {}", state);
        self.state = Some(state);
        self.emit(CentralEvent::StateChange(state));
    }

    fn on_address_change(&mut self, address: String) {
        info!("Local adapter address is {}", address);
        self.local_address = Some(address.clone());
        self.emit(CentralEvent::AddressChange(address));
    }

    fn on_discover(
        &mut self,
        address: String,
        address_type: AddressType,
        connectable: bool,
        advertisement: Advertisement,
        rssi: i8,
    ) {
        if !self.filter.is_active() {
            debug!("Discovery report from {} dropped, no scan session", address);
            return;
        }
        if !self.filter.accepts(&advertisement) {
            return;
        }

        let peripheral = PeripheralId::from_address(&address);
        self.registry.upsert(
            peripheral.clone(),
            AddressRecord {
                address: address.clone(),
                address_type,
                connectable,
            },
        );
        self.emit(CentralEvent::Discover(Discovery {
            peripheral,
            address,
            address_type,
            connectable,
            advertisement,
            rssi,
        }));
    }

    fn on_le_conn_complete(
        &mut self,
        status: u8,
        handle: ConnectionHandle,
        role: LinkRole,
        address_type: AddressType,
        address: String,
    ) {
        if role != LinkRole::Central {
            debug!("Ignoring peripheral-role completion for handle {}", handle);
            return;
        }

        if status == 0 {
            let peripheral = PeripheralId::from_address(&address);
            // The completed attempt is resolved whatever identity it was
            // issued for; the link's own address is authoritative.
            self.scheduler.take_pending();

            info!("Connected to {} on handle {}", peripheral, handle);
            self.registry.bind_handle(peripheral.clone(), handle);
            self.resources.insert(
                handle,
                ConnectionResources::new(
                    handle,
                    self.local_address.clone(),
                    address,
                    address_type,
                ),
            );
            self.emit(CentralEvent::Connect {
                peripheral,
                error: None,
            });
        } else {
            match self.scheduler.take_pending() {
                Some(peripheral) => {
                    let failure = ConnectionFailure::new(status, status_message(status));
                    warn!("Connection to {} failed: {}", peripheral, failure);
                    self.emit(CentralEvent::Connect {
                        peripheral,
                        error: Some(failure),
                    });
                }
                None => {
                    debug!(
                        "Stale connection failure (status 0x{:02x}) with no pending attempt",
                        status
                    );
                }
            }
        }

        self.drain_connection_queue();
    }

    fn on_disconn_complete(&mut self, handle: ConnectionHandle, reason: u8) {
        self.resources.remove(handle);
        match self.registry.release_handle(handle) {
            Some(peripheral) => {
                info!(
                    "Disconnected from {} (handle {}, reason 0x{:02x})",
                    peripheral, handle, reason
                );
                self.emit(CentralEvent::Disconnect { peripheral });
            }
            None => debug!("Stale disconnection for unbound handle {}", handle),
        }
    }

    fn on_rssi_read(&mut self, handle: ConnectionHandle, rssi: i8) {
        match self.registry.peripheral_of(handle) {
            Some(peripheral) => {
                let peripheral = peripheral.clone();
                self.emit(CentralEvent::RssiUpdate { peripheral, rssi });
            }
            None => debug!("RSSI reading for unbound handle {} dropped", handle),
        }
    }

    fn on_encrypt_change(&mut self, handle: ConnectionHandle, encrypted: bool) {
        match self.resources.get_mut(handle) {
            Some(set) => {
                debug!("Link encryption on handle {} now {}", handle, encrypted);
                set.acl.set_encrypted(encrypted);
            }
            None => debug!("Encrypt change for unbound handle {} dropped", handle),
        }
    }

    fn on_acl_data(&mut self, handle: ConnectionHandle, cid: u16, data: Vec<u8>) {
        match self.resources.get(handle) {
            Some(set) => set.acl.push(cid, data),
            None => debug!("ACL frame for unbound handle {} dropped", handle),
        }
    }

    // ---- Internals ----

    fn issue_connection(&mut self, peripheral: PeripheralId, parameters: ConnectionParameters) {
        let (address, address_type) = match self.registry.record(&peripheral) {
            Some(record) => (Some(record.address.clone()), Some(record.address_type)),
            None => (None, None),
        };
        debug!(
            "Creating connection to {} ({})",
            peripheral,
            address.as_deref().unwrap_or("address unknown")
        );
        self.scheduler.begin(peripheral);
        self.hci.send(HciCommand::CreateConnection {
            address,
            address_type,
            parameters,
        });
    }

    fn drain_connection_queue(&mut self) {
        if let Some(next) = self.scheduler.next_queued() {
            self.issue_connection(next.peripheral, next.parameters);
        }
    }

    fn emit(&self, event: CentralEvent) {
        let _ = self.events.send(event);
    }
}

impl Drop for Central {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawns a task that cancels `shutdown` when the process receives Ctrl-C,
/// for embeddings that drive [`Central::run`] off OS signals.
pub fn spawn_shutdown_on_ctrl_c(shutdown: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, requesting shutdown");
                shutdown.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}
