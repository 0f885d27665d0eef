//! Per-Handle Resource Table
//!
//! Every established link owns three sub-resources, created together on
//! connection-complete and destroyed together on disconnect or shutdown:
//! a GATT session, an ACL data stream, and an L2CAP signaling channel.
//! The table is the single owner; nothing here outlives its handle.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::domain::models::{AddressType, ConnectionHandle};

/// One inbound ACL data frame, already reassembled by the HCI engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AclFrame {
    pub cid: u16,
    pub data: Vec<u8>,
}

/// ACL data stream for one link. Inbound frames are pushed by the
/// orchestrator and read by at most one subscriber; dropping the stream
/// closes the channel.
#[derive(Debug)]
pub struct AclStream {
    pub handle: ConnectionHandle,
    pub local_address: Option<String>,
    pub local_address_type: AddressType,
    pub peer_address: String,
    pub peer_address_type: AddressType,
    encrypted: bool,
    frames: mpsc::UnboundedSender<AclFrame>,
    frame_rx: Option<mpsc::UnboundedReceiver<AclFrame>>,
}

impl AclStream {
    pub fn new(
        handle: ConnectionHandle,
        local_address: Option<String>,
        local_address_type: AddressType,
        peer_address: String,
        peer_address_type: AddressType,
    ) -> Self {
        let (frames, frame_rx) = mpsc::unbounded_channel();
        Self {
            handle,
            local_address,
            local_address_type,
            peer_address,
            peer_address_type,
            encrypted: false,
            frames,
            frame_rx: Some(frame_rx),
        }
    }

    /// Pushes an inbound frame to the subscriber, if any.
    pub fn push(&self, cid: u16, data: Vec<u8>) {
        let _ = self.frames.send(AclFrame { cid, data });
    }

    /// Takes the frame receiver. Returns `None` after the first call.
    pub fn subscribe(&mut self) -> Option<mpsc::UnboundedReceiver<AclFrame>> {
        self.frame_rx.take()
    }

    pub fn set_encrypted(&mut self, encrypted: bool) {
        self.encrypted = encrypted;
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }
}

/// GATT client session for one link. Attribute protocol parsing happens
/// elsewhere; the session pins the handle/address pair the upper layer
/// addresses it by.
#[derive(Debug, Clone, PartialEq)]
pub struct GattSession {
    pub handle: ConnectionHandle,
    pub peer_address: String,
}

/// L2CAP signaling channel for one link.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalingChannel {
    pub handle: ConnectionHandle,
}

/// The three sub-resources of one established link.
#[derive(Debug)]
pub struct ConnectionResources {
    pub gatt: GattSession,
    pub acl: AclStream,
    pub signaling: SignalingChannel,
}

impl ConnectionResources {
    pub fn new(
        handle: ConnectionHandle,
        local_address: Option<String>,
        peer_address: String,
        peer_address_type: AddressType,
    ) -> Self {
        Self {
            gatt: GattSession {
                handle,
                peer_address: peer_address.clone(),
            },
            // Controller (local) addresses are public device addresses.
            acl: AclStream::new(
                handle,
                local_address,
                AddressType::Public,
                peer_address,
                peer_address_type,
            ),
            signaling: SignalingChannel { handle },
        }
    }
}

#[derive(Debug, Default)]
pub struct ResourceTable {
    entries: HashMap<ConnectionHandle, ConnectionResources>,
}

impl ResourceTable {
    pub fn insert(&mut self, handle: ConnectionHandle, resources: ConnectionResources) {
        self.entries.insert(handle, resources);
    }

    pub fn remove(&mut self, handle: ConnectionHandle) -> Option<ConnectionResources> {
        self.entries.remove(&handle)
    }

    pub fn get(&self, handle: ConnectionHandle) -> Option<&ConnectionResources> {
        self.entries.get(&handle)
    }

    pub fn get_mut(&mut self, handle: ConnectionHandle) -> Option<&mut ConnectionResources> {
        self.entries.get_mut(&handle)
    }

    pub fn contains(&self, handle: ConnectionHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
