// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

extern crate alloc;

// Module
pub mod config;
pub mod hal;
pub mod link;
pub mod tasks;
pub mod web;

use core::cell::Cell;

// Re-exports von esp-core
pub use esp_core::{
    ChannelMask, CommandError, CommandGate, CommandRecord, Controller, DeviceCommand,
    DeviceStatus, OperationMode, RelayId, TransportEvent, ValidCommand,
};

// Embassy Channel-Typen
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::pubsub::{PubSubChannel, Publisher, Subscriber};

use crate::config::{COMMAND_QUEUE_DEPTH, STATUS_MAX_SUBSCRIBERS};

// ============================================================================
// Type-Aliase für Channel-Typen
// ============================================================================
//
// Statt:  Publisher<'static, NoopRawMutex, DeviceStatus, 2, 10, 1>
// Nutze:  DeviceStatusPublisher

/// PubSubChannel für Status-Broadcasts (Motion Task → MQTT + WebSockets)
/// - 2: Nachrichten-Kapazität im Queue
/// - STATUS_MAX_SUBSCRIBERS: 1 MQTT + bis zu 9 WebSockets
/// - 1: nur der Motion Task publisht
pub type DeviceStatusChannel =
    PubSubChannel<NoopRawMutex, DeviceStatus, 2, STATUS_MAX_SUBSCRIBERS, 1>;

pub type DeviceStatusPublisher =
    Publisher<'static, NoopRawMutex, DeviceStatus, 2, STATUS_MAX_SUBSCRIBERS, 1>;

pub type DeviceStatusSubscriber =
    Subscriber<'static, NoopRawMutex, DeviceStatus, 2, STATUS_MAX_SUBSCRIBERS, 1>;

/// Channel für Kommandos (HTTP, WebSocket, MQTT → Motion Task)
pub type DeviceCommandChannel = Channel<NoopRawMutex, DeviceCommand, COMMAND_QUEUE_DEPTH>;

pub type DeviceCommandSender = Sender<'static, NoopRawMutex, DeviceCommand, COMMAND_QUEUE_DEPTH>;

pub type DeviceCommandReceiver =
    Receiver<'static, NoopRawMutex, DeviceCommand, COMMAND_QUEUE_DEPTH>;

/// Zustand nach allen eingereihten Kommandos
///
/// Jeder Transport hält die Sperre vom Prüfen bis zum Einreihen, deshalb
/// ein async Mutex.
pub type CommandGateLock = embassy_sync::mutex::Mutex<CriticalSectionRawMutex, CommandGate>;

/// Letzter bekannter Gerätezustand
///
/// Schreibt nur der Motion Task. HTTP-Handler lesen hier synchron für
/// `/status` und den ersten WebSocket-Status.
pub type StatusCell = Mutex<CriticalSectionRawMutex, Cell<DeviceStatus>>;
