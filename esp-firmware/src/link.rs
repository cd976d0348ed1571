// Command Link - gemeinsamer Eingang aller Transporte zum Motion Task
//
// HTTP, WebSocket und MQTT übersetzen ihre Ereignisse in ein TransportEvent
// und reichen es hier ein. Validierung passiert genau einmal, in
// TransportEvent::dispatch(). Der Modus-Check läuft über das CommandGate,
// nicht über die Status-Zelle: die hinkt den eingereihten Kommandos hinterher.

use defmt::{info, warn};
use esp_core::{CommandGate, Dispatch};

use crate::{
    ChannelMask, CommandError, CommandGateLock, DeviceCommand, DeviceCommandSender, DeviceStatus,
    StatusCell, TransportEvent, ValidCommand,
};

/// Kopierbarer Handle für Tasks: Kommando-Sender, Gate und Status-Zelle
#[derive(Clone, Copy)]
pub struct CommandLink {
    sender: DeviceCommandSender,
    gate: &'static CommandGateLock,
    status: &'static StatusCell,
}

impl CommandLink {
    pub fn new(
        sender: DeviceCommandSender,
        gate: &'static CommandGateLock,
        status: &'static StatusCell,
    ) -> Self {
        Self {
            sender,
            gate,
            status,
        }
    }

    /// Verarbeitet ein Transport-Event
    ///
    /// Liefert `None` für Lifecycle-Events, sonst das Ergebnis von Validierung
    /// und Modus-Check. Im Sequenz-Modus wird ein gültiges Kommando mit
    /// `SequenceActive` abgelehnt, ohne den Motion Task zu erreichen.
    pub async fn submit(
        &self,
        source: &'static str,
        event: TransportEvent<'_>,
    ) -> Option<Result<ValidCommand, CommandError>> {
        match event {
            TransportEvent::Connected => info!("{}: Client connected", source),
            TransportEvent::Disconnected => info!("{}: Client disconnected", source),
            TransportEvent::Error => warn!("{}: Transport error", source),
            TransportEvent::Message(_) => {}
        }

        match event.dispatch() {
            Dispatch::Ignored => None,
            Dispatch::Rejected(error) => {
                warn!("{}: Command rejected: {}", source, error);
                Some(Err(error))
            }
            Dispatch::Command(command) => Some(
                self.send(source, DeviceCommand::Apply(command))
                    .await
                    .map(|_| command),
            ),
        }
    }

    /// Bitstring ohne Lichter (`/setcmd/<bits>`), die Relais bleiben unberührt
    pub async fn submit_channels(
        &self,
        source: &'static str,
        bits: &str,
    ) -> Result<ChannelMask, CommandError> {
        let channels = ChannelMask::parse(bits).inspect_err(|error| {
            warn!("{}: Command rejected: {}", source, error);
        })?;
        self.send(source, DeviceCommand::SetChannels(channels)).await?;
        Ok(channels)
    }

    /// Reiht ein Kommando ein, wenn das Gate es annimmt
    ///
    /// Liefert den Gate-Zustand nach dem Kommando, also den Zustand, den der
    /// Controller nach Abarbeitung der Warteschlange haben wird. Das Gate
    /// bleibt bis nach dem Einreihen gesperrt, damit Gate und Warteschlange
    /// dieselbe Reihenfolge sehen.
    pub async fn send(
        &self,
        source: &'static str,
        command: DeviceCommand,
    ) -> Result<CommandGate, CommandError> {
        let mut gate = self.gate.lock().await;
        if let Err(error) = gate.admit(command) {
            warn!("{}: Command rejected: {}", source, error);
            return Err(error);
        }
        info!("{}: Command accepted: {}", source, command);
        self.sender.send(command).await;
        Ok(*gate)
    }

    /// Zuletzt vom Motion Task gemeldeter Zustand
    pub fn status(&self) -> DeviceStatus {
        self.status.lock(|cell| cell.get())
    }
}
