//! BLE central-role orchestration.
//!
//! This crate is the coordination layer of a Bluetooth Low Energy host
//! stack running as a central: it drives an injected HCI command/event
//! engine and a GAP scanning engine to discover peripherals, establish
//! and tear down connections, and hand the upper layer the per-link
//! resources (GATT session, ACL stream, L2CAP signaling channel) it
//! needs to talk to them.
//!
//! ## Architecture
//!
//! ```text
//!            upper layer (CentralEvent notifications)
//!                            ▲
//! ┌──────────────────────────┴──────────────────────────────┐
//! │                        Central                           │
//! │  PeripheralRegistry   identity ↔ address ↔ handle        │
//! │  ConnectionScheduler  one outstanding attempt, FIFO queue│
//! │  ScanFilter           service-UUID interest set          │
//! │  ResourceTable        GATT / ACL / signaling per handle  │
//! └──────────┬───────────▲──────────────┬───────────▲───────┘
//!   HciCommand│  HciEvent│    GapCommand│   GapEvent│
//! ┌──────────▼───────────┴──────┐ ┌─────▼───────────┴───────┐
//! │         HCI engine          │ │        GAP engine        │
//! │  (socket + packet codec)    │ │  (scan cycling + parse)  │
//! └─────────────────────────────┘ └─────────────────────────┘
//! ```
//!
//! The engine boundaries are typed channel surfaces
//! ([`HciEngine`](infrastructure::hci::HciEngine),
//! [`GapEngine`](infrastructure::gap::GapEngine)); the orchestrator never
//! sees raw packets. Event handling is synchronous (`&mut self`), so the
//! whole state machine is testable without a runtime; [`Central::run`]
//! is a thin async pump over the two event channels.
//!
//! ## Example
//!
//! ```no_run
//! use ble_central::{Central, CentralEvent, GapEngine, HciEngine};
//! use tokio::sync::mpsc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let (hci, _hci_backend) = HciEngine::channel();
//! let (gap, _gap_backend) = GapEngine::channel();
//! let (events, mut notifications) = mpsc::unbounded_channel::<CentralEvent>();
//!
//! let mut central = Central::new(hci, gap, events);
//! central.init();
//!
//! let shutdown = CancellationToken::new();
//! ble_central::spawn_shutdown_on_ctrl_c(shutdown.clone());
//!
//! tokio::spawn(async move {
//!     while let Some(event) = notifications.recv().await {
//!         println!("{event:?}");
//!     }
//! });
//!
//! central.run(shutdown).await?;
//! # Ok(())
//! # }
//! ```

pub mod central;
pub mod domain;
pub mod infrastructure;

pub use central::{
    spawn_shutdown_on_ctrl_c, AclFrame, AclStream, AddressRecord, Central, ConnectionResources,
    GattSession, SignalingChannel,
};
pub use domain::models::{
    AdapterState, AddressType, Advertisement, CentralEvent, ConnectionFailure, ConnectionHandle,
    ConnectionParameters, Discovery, LinkRole, PeripheralId, ServiceData,
};
pub use domain::settings::{Settings, SettingsService};
pub use infrastructure::gap::{GapBackend, GapCommand, GapEngine, GapEvent};
pub use infrastructure::hci::{HciBackend, HciCommand, HciEngine, HciEvent};
pub use infrastructure::logging::{init_logger, LoggingGuard};
