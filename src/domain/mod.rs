//! Domain Module
//!
//! Core data model and configuration for the central role.
//!
//! ## Modules
//!
//! - [`models`] - Identifiers, advertisement data, link parameters, and the
//!   notification event type
//! - [`settings`] - Persisted scan/connection/logging settings

pub mod models;
pub mod settings;

pub use models::{
    AdapterState, AddressType, Advertisement, CentralEvent, ConnectionFailure, ConnectionHandle,
    ConnectionParameters, Discovery, LinkRole, PeripheralId, ServiceData,
};
pub use settings::{Settings, SettingsService};
