//! Command Gate - Zustand in Warteschlangen-Reihenfolge
//!
//! Die Transporte sehen den Controller nur über den zuletzt gemeldeten Status,
//! der bis zu einem Tick alt ist. Das Gate verfolgt stattdessen Modus und
//! Relais so, wie sie nach allen bereits eingereihten Kommandos stehen werden.
//! Jedes Kommando läuft vor dem Einreihen durch `admit()`. Was das Gate
//! annimmt, nimmt der Controller später in derselben Reihenfolge ebenfalls an.

use crate::command::CommandError;
use crate::controller::{DeviceCommand, OperationMode};
use crate::relay::RelayId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandGate {
    mode: OperationMode,
    lights: [bool; 2],
}

impl CommandGate {
    /// Startzustand des Controllers: manuell, beide Relais aus
    pub const fn new() -> Self {
        Self {
            mode: OperationMode::Manual,
            lights: [false; 2],
        }
    }

    /// Prüft ein Kommando gegen den eingereihten Zustand und übernimmt es
    ///
    /// Bei `Err` bleibt der Zustand unverändert und das Kommando darf nicht
    /// eingereiht werden.
    pub fn admit(&mut self, command: DeviceCommand) -> Result<(), CommandError> {
        if command.requires_manual() && self.mode == OperationMode::Sequence {
            return Err(CommandError::SequenceActive);
        }

        match command {
            DeviceCommand::Apply(valid) => {
                self.lights = [valid.light1, valid.light2];
            }
            DeviceCommand::ToggleMode => self.mode = self.mode.toggled(),
            DeviceCommand::ToggleRelay(relay) => {
                let slot = Self::slot(relay);
                self.lights[slot] = !self.lights[slot];
            }
            DeviceCommand::SetChannels(_) | DeviceCommand::StopAll => {}
        }
        Ok(())
    }

    pub const fn mode(&self) -> OperationMode {
        self.mode
    }

    pub const fn light(&self, relay: RelayId) -> bool {
        self.lights[Self::slot(relay)]
    }

    const fn slot(relay: RelayId) -> usize {
        match relay {
            RelayId::One => 0,
            RelayId::Two => 1,
        }
    }
}
