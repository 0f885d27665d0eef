//! GAP Engine Surface
//!
//! Typed command/event boundary between the orchestrator and the GAP
//! scanning engine. Scan parameter encoding and advertising-report
//! reassembly live behind this surface.

use tokio::sync::mpsc;

use crate::domain::models::{AddressType, Advertisement};

/// Commands issued toward the GAP engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GapCommand {
    /// Scan timing in 0.625 ms units.
    SetScanParameters { interval: u16, window: u16 },
    StartScanning { allow_duplicates: bool },
    StopScanning,
}

/// Events reported by the GAP engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GapEvent {
    ScanParametersSet,
    ScanStart {
        filter_duplicates: bool,
    },
    ScanStop,
    /// A peripheral advertised within the scan window. `status` is the raw
    /// advertising-report status and is carried through unused.
    Discover {
        status: u8,
        address: String,
        address_type: AddressType,
        connectable: bool,
        advertisement: Advertisement,
        rssi: i8,
    },
}

/// Orchestrator-facing handle onto a GAP engine.
pub struct GapEngine {
    commands: mpsc::UnboundedSender<GapCommand>,
    events: Option<mpsc::UnboundedReceiver<GapEvent>>,
}

/// Far side of the [`GapEngine`] channels.
pub struct GapBackend {
    pub commands: mpsc::UnboundedReceiver<GapCommand>,
    pub events: mpsc::UnboundedSender<GapEvent>,
}

impl GapEngine {
    /// Builds the orchestrator-facing handle and its backend counterpart.
    pub fn channel() -> (Self, GapBackend) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                commands: command_tx,
                events: Some(event_rx),
            },
            GapBackend {
                commands: command_rx,
                events: event_tx,
            },
        )
    }

    /// Sends a command toward the engine, discarding send errors.
    pub fn send(&self, command: GapCommand) {
        let _ = self.commands.send(command);
    }

    /// Takes the event receiver. Returns `None` after the first call.
    pub fn subscribe(&mut self) -> Option<mpsc::UnboundedReceiver<GapEvent>> {
        self.events.take()
    }
}
