//! Peripheral Registry
//!
//! Maps stable peripheral identities to the link-layer facts learned about
//! them: the address record captured at discovery time and, while a link is
//! up, the controller-assigned connection handle. Address records live for
//! the registry's lifetime; handle bindings come and go with connections.

use std::collections::HashMap;

use crate::domain::models::{AddressType, ConnectionHandle, PeripheralId};

/// Link-layer addressing facts for one peripheral, captured from the
/// advertisement that first (or most recently) revealed it.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressRecord {
    pub address: String,
    pub address_type: AddressType,
    pub connectable: bool,
}

#[derive(Debug, Default)]
pub struct PeripheralRegistry {
    records: HashMap<PeripheralId, AddressRecord>,
    handles_by_peripheral: HashMap<PeripheralId, ConnectionHandle>,
    peripherals_by_handle: HashMap<ConnectionHandle, PeripheralId>,
}

impl PeripheralRegistry {
    /// Inserts or refreshes the address record for a peripheral.
    pub fn upsert(&mut self, peripheral: PeripheralId, record: AddressRecord) {
        self.records.insert(peripheral, record);
    }

    pub fn record(&self, peripheral: &PeripheralId) -> Option<&AddressRecord> {
        self.records.get(peripheral)
    }

    /// Binds a connection handle to a peripheral. Any previous binding for
    /// the same peripheral is dropped first; an identity holds at most one
    /// handle at a time.
    pub fn bind_handle(&mut self, peripheral: PeripheralId, handle: ConnectionHandle) {
        if let Some(stale) = self.handles_by_peripheral.remove(&peripheral) {
            self.peripherals_by_handle.remove(&stale);
        }
        self.peripherals_by_handle
            .insert(handle, peripheral.clone());
        self.handles_by_peripheral.insert(peripheral, handle);
    }

    /// Removes the binding for `handle`, returning the peripheral it
    /// belonged to. `None` means the handle was never bound (stale event).
    pub fn release_handle(&mut self, handle: ConnectionHandle) -> Option<PeripheralId> {
        let peripheral = self.peripherals_by_handle.remove(&handle)?;
        self.handles_by_peripheral.remove(&peripheral);
        Some(peripheral)
    }

    pub fn handle_of(&self, peripheral: &PeripheralId) -> Option<ConnectionHandle> {
        self.handles_by_peripheral.get(peripheral).copied()
    }

    pub fn peripheral_of(&self, handle: ConnectionHandle) -> Option<&PeripheralId> {
        self.peripherals_by_handle.get(&handle)
    }

    /// Handles of every currently bound link, in no particular order.
    pub fn bound_handles(&self) -> Vec<ConnectionHandle> {
        self.peripherals_by_handle.keys().copied().collect()
    }

    /// Drops every handle binding; address records are untouched.
    pub fn clear_handles(&mut self) {
        self.handles_by_peripheral.clear();
        self.peripherals_by_handle.clear();
    }

    /// Forgets every address record. Handle bindings are untouched.
    pub fn clear_addresses(&mut self) {
        self.records.clear();
    }
}
