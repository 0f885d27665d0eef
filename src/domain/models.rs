//! Core data model for the central-role orchestration layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable identity of a remote peripheral.
///
/// Derived deterministically from the link-layer address by stripping the
/// `:` separators (`"aa:bb:cc:dd:ee:ff"` becomes `"aabbccddeeff"`), so the
/// same device always maps to the same identity. Upper layers address every
/// orchestrator operation by this id; it is never reused for a different
/// address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeripheralId(String);

impl PeripheralId {
    /// Builds an identity from a raw id string (as handed back to an upper
    /// layer in a previous discovery).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the identity from a link-layer address string.
    pub fn from_address(address: &str) -> Self {
        Self(address.replace(':', ""))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeripheralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Link-layer address type of a peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressType {
    Public,
    Random,
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Random => f.write_str("random"),
        }
    }
}

/// Controller-assigned identifier of an established link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionHandle(u16);

impl ConnectionHandle {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// Role the local controller took on a completed link. The central
/// orchestrator only processes [`LinkRole::Central`] completions; a
/// multi-role controller also reports links it accepted as a peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    Central,
    Peripheral,
}

/// Power/authorization state reported by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdapterState {
    Unknown,
    Resetting,
    Unsupported,
    Unauthorized,
    PoweredOff,
    PoweredOn,
}

impl fmt::Display for AdapterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Resetting => f.write_str("resetting"),
            Self::Unsupported => f.write_str("unsupported"),
            Self::Unauthorized => f.write_str("unauthorized"),
            Self::PoweredOff => f.write_str("poweredOff"),
            Self::PoweredOn => f.write_str("poweredOn"),
        }
    }
}

/// One service-data entry of an advertisement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceData {
    pub uuid: String,
    pub data: Vec<u8>,
}

/// Parsed advertisement payload as delivered by the GAP engine.
///
/// Absent fields are `None`; for service-UUID filtering an absent field
/// contributes nothing to the advertised set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    pub local_name: Option<String>,
    pub tx_power_level: Option<i8>,
    pub manufacturer_data: Option<Vec<u8>>,
    pub service_uuids: Option<Vec<String>>,
    pub service_data: Option<Vec<ServiceData>>,
}

impl Advertisement {
    /// All service UUIDs this advertisement carries: the `service_uuids`
    /// list plus the UUIDs of every `service_data` entry.
    pub fn advertised_uuids(&self) -> impl Iterator<Item = &str> {
        self.service_uuids
            .iter()
            .flatten()
            .map(String::as_str)
            .chain(
                self.service_data
                    .iter()
                    .flatten()
                    .map(|entry| entry.uuid.as_str()),
            )
    }
}

/// Link parameters for a connection attempt, in controller units.
///
/// Absent values let the HCI engine fall back to its own defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionParameters {
    /// Minimum connection interval, units of 1.25 ms.
    pub min_interval: Option<u16>,
    /// Maximum connection interval, units of 1.25 ms.
    pub max_interval: Option<u16>,
    /// Peripheral latency, in connection events.
    pub latency: Option<u16>,
    /// Supervision timeout, units of 10 ms.
    pub supervision_timeout: Option<u16>,
}

/// Payload of a discovery notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discovery {
    pub peripheral: PeripheralId,
    pub address: String,
    pub address_type: AddressType,
    pub connectable: bool,
    pub advertisement: Advertisement,
    /// Received signal strength, dBm.
    pub rssi: i8,
}

/// Reason a connection attempt failed, carrying the controller's HCI
/// status code and its decoded name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConnectionFailure {
    pub code: u8,
    pub message: String,
}

impl ConnectionFailure {
    pub fn new(code: u8, name: &str) -> Self {
        Self {
            code,
            message: format!("{} (0x{:02x})", name, code),
        }
    }
}

/// Notifications the orchestrator emits toward the upper layer.
#[derive(Debug, Clone, PartialEq)]
pub enum CentralEvent {
    /// Adapter state changed (only distinct transitions are reported).
    StateChange(AdapterState),
    /// The local adapter address changed.
    AddressChange(String),
    /// The GAP engine acknowledged new scan parameters.
    ScanParametersSet,
    /// Scanning started.
    ScanStart { filter_duplicates: bool },
    /// Scanning stopped.
    ScanStop,
    /// An advertisement passed the discovery filter.
    Discover(Discovery),
    /// A connection attempt resolved; `error` is `None` on success.
    Connect {
        peripheral: PeripheralId,
        error: Option<ConnectionFailure>,
    },
    /// An established link was torn down.
    Disconnect { peripheral: PeripheralId },
    /// An RSSI read completed for a connected peripheral.
    RssiUpdate { peripheral: PeripheralId, rssi: i8 },
}
