//! Transport-Events
//!
//! Jeder Transport (WebSocket, MQTT) übersetzt seine Callbacks in ein
//! `TransportEvent`. Nur `Message` erreicht die Kommando-Validierung.

use crate::command::{CommandError, CommandRecord, ValidCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent<'a> {
    Connected,
    Message(CommandRecord<'a>),
    Disconnected,
    Error,
}

/// Ergebnis der Verteilung eines Events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// Gültiges Kommando, an den Controller weiterreichen
    Command(ValidCommand),
    /// Abgelehnt, der Transport meldet den Fehler an seinen Client
    Rejected(CommandError),
    /// Lifecycle-Event ohne Wirkung auf die Bewegung
    Ignored,
}

impl TransportEvent<'_> {
    pub fn dispatch(self) -> Dispatch {
        match self {
            TransportEvent::Message(record) => match record.validate() {
                Ok(command) => Dispatch::Command(command),
                Err(error) => Dispatch::Rejected(error),
            },
            TransportEvent::Connected | TransportEvent::Disconnected | TransportEvent::Error => {
                Dispatch::Ignored
            }
        }
    }
}
