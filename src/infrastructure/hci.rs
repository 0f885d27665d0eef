//! HCI Engine Surface
//!
//! Typed command/event boundary between the orchestrator and the
//! Host-Controller-Interface engine. Packet encoding and the controller
//! socket live behind this surface; the orchestrator only ever sees the
//! enums below.

use tokio::sync::mpsc;

use crate::domain::models::{
    AdapterState, AddressType, ConnectionHandle, ConnectionParameters, LinkRole,
};

/// Commands issued toward the HCI engine.
///
/// `Option` fields are the explicit "unknown" sentinel: the orchestrator
/// forwards requests for identities it has never resolved, and the engine
/// decides how to fail them.
#[derive(Debug, Clone, PartialEq)]
pub enum HciCommand {
    /// Bring the controller up and start event delivery.
    Init,
    /// Reset the controller.
    Reset,
    CreateConnection {
        address: Option<String>,
        address_type: Option<AddressType>,
        parameters: ConnectionParameters,
    },
    CancelConnection {
        handle: Option<ConnectionHandle>,
    },
    Disconnect {
        handle: Option<ConnectionHandle>,
    },
    ReadRssi {
        handle: Option<ConnectionHandle>,
    },
}

/// Events reported by the HCI engine.
#[derive(Debug, Clone, PartialEq)]
pub enum HciEvent {
    StateChange(AdapterState),
    /// The controller's own (local) address became known or changed.
    AddressChange(String),
    /// LE Connection Complete. `status` is the raw HCI status code;
    /// non-zero means the attempt failed. Timing fields are in controller
    /// units (interval 1.25 ms, supervision timeout 10 ms).
    LeConnComplete {
        status: u8,
        handle: ConnectionHandle,
        role: LinkRole,
        address_type: AddressType,
        address: String,
        interval: u16,
        latency: u16,
        supervision_timeout: u16,
        master_clock_accuracy: u8,
    },
    /// LE Connection Update Complete. Timing in controller units.
    LeConnUpdateComplete {
        handle: ConnectionHandle,
        interval: u16,
        latency: u16,
        supervision_timeout: u16,
    },
    DisconnComplete {
        handle: ConnectionHandle,
        reason: u8,
    },
    RssiRead {
        handle: ConnectionHandle,
        rssi: i8,
    },
    EncryptChange {
        handle: ConnectionHandle,
        encrypted: bool,
    },
    /// Inbound ACL data fragment, already reassembled by the engine.
    AclDataPkt {
        handle: ConnectionHandle,
        cid: u16,
        data: Vec<u8>,
    },
}

/// Orchestrator-facing handle onto an HCI engine.
///
/// Commands go out fire-and-forget over an unbounded channel; the event
/// receiver is handed out once via [`subscribe`](Self::subscribe).
pub struct HciEngine {
    commands: mpsc::UnboundedSender<HciCommand>,
    events: Option<mpsc::UnboundedReceiver<HciEvent>>,
}

/// Far side of the [`HciEngine`] channels, held by the engine
/// implementation (or a test driving the orchestrator).
pub struct HciBackend {
    pub commands: mpsc::UnboundedReceiver<HciCommand>,
    pub events: mpsc::UnboundedSender<HciEvent>,
}

impl HciEngine {
    /// Builds the orchestrator-facing handle and its backend counterpart.
    pub fn channel() -> (Self, HciBackend) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                commands: command_tx,
                events: Some(event_rx),
            },
            HciBackend {
                commands: command_rx,
                events: event_tx,
            },
        )
    }

    /// Sends a command toward the engine. A disappeared engine is treated
    /// the same as one that never answers, so send errors are discarded.
    pub fn send(&self, command: HciCommand) {
        let _ = self.commands.send(command);
    }

    /// Takes the event receiver. Returns `None` after the first call.
    pub fn subscribe(&mut self) -> Option<mpsc::UnboundedReceiver<HciEvent>> {
        self.events.take()
    }
}

/// Human-readable name for an HCI status code, per the core specification
/// error code table.
pub fn status_message(code: u8) -> &'static str {
    match code {
        0x00 => "Success",
        0x01 => "Unknown HCI Command",
        0x02 => "Unknown Connection Identifier",
        0x03 => "Hardware Failure",
        0x04 => "Page Timeout",
        0x05 => "Authentication Failure",
        0x06 => "PIN or Key Missing",
        0x07 => "Memory Capacity Exceeded",
        0x08 => "Connection Timeout",
        0x09 => "Connection Limit Exceeded",
        0x0a => "Synchronous Connection Limit to a Device Exceeded",
        0x0b => "ACL Connection Already Exists",
        0x0c => "Command Disallowed",
        0x0d => "Connection Rejected due to Limited Resources",
        0x0e => "Connection Rejected due to Security Reasons",
        0x0f => "Connection Rejected due to Unacceptable BD_ADDR",
        0x10 => "Connection Accept Timeout Exceeded",
        0x11 => "Unsupported Feature or Parameter Value",
        0x12 => "Invalid HCI Command Parameters",
        0x13 => "Remote User Terminated Connection",
        0x14 => "Remote Device Terminated due to Low Resources",
        0x15 => "Remote Device Terminated due to Power Off",
        0x16 => "Connection Terminated By Local Host",
        0x17 => "Repeated Attempts",
        0x18 => "Pairing Not Allowed",
        0x19 => "Unknown LMP PDU",
        0x1a => "Unsupported Remote Feature / Unsupported LMP Feature",
        0x1b => "SCO Offset Rejected",
        0x1c => "SCO Interval Rejected",
        0x1d => "SCO Air Mode Rejected",
        0x1e => "Invalid LMP Parameters / Invalid LL Parameters",
        0x1f => "Unspecified Error",
        0x20 => "Unacceptable LMP Parameters / Unacceptable LL Parameters",
        0x21 => "Role Change Not Allowed",
        0x22 => "LMP Response Timeout / LL Response Timeout",
        0x23 => "LMP Error Transaction Collision",
        0x24 => "LMP PDU Not Allowed",
        0x25 => "Encryption Mode Not Acceptable",
        0x26 => "Link Key cannot be Changed",
        0x27 => "Requested QoS Not Supported",
        0x28 => "Instant Passed",
        0x29 => "Pairing With Unit Key Not Supported",
        0x2a => "Different Transaction Collision",
        0x2c => "QoS Unacceptable Parameter",
        0x2d => "QoS Rejected",
        0x2e => "Channel Classification Not Supported",
        0x2f => "Insufficient Security",
        0x30 => "Parameter Out Of Mandatory Range",
        0x32 => "Role Switch Pending",
        0x34 => "Reserved Slot Violation",
        0x35 => "Role Switch Failed",
        0x36 => "Extended Inquiry Response Too Large",
        0x37 => "Secure Simple Pairing Not Supported By Host",
        0x38 => "Host Busy - Pairing",
        0x39 => "Connection Rejected due to No Suitable Channel Found",
        0x3a => "Controller Busy",
        0x3b => "Unacceptable Connection Parameters",
        0x3c => "Directed Advertising Timeout",
        0x3d => "Connection Terminated due to MIC Failure",
        0x3e => "Connection Failed to be Established",
        0x3f => "MAC Connection Failed",
        0x40 => "Coarse Clock Adjustment Rejected",
        _ => "HCI Error: Unknown",
    }
}
