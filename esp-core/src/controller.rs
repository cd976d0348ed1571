//! Controller - einziger Schreiber für Scheduler, Relais und Betriebsmodus
//!
//! Alle Transporte schicken ihre Kommandos an den Task, der den Controller
//! besitzt. Dadurch ist jedes Kommando vollständig angewendet, bevor der
//! nächste `tick()` den Zustand sieht.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::command::{ChannelMask, CommandError, CommandRecord, ValidCommand};
use crate::interpreter;
use crate::relay::{RelayBank, RelayId};
use crate::scheduler::MotionScheduler;
use crate::sequence::SequencePlayer;
use crate::traits::{RelayOutput, ServoDriver};
use crate::types::{ChannelId, Millis};

/// Betriebsmodus des Geräts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OperationMode {
    /// Kanäle folgen den empfangenen Bitstrings
    #[default]
    Manual,
    /// Auto-Sequenz steuert die Kanäle, Bitstrings werden abgelehnt
    Sequence,
}

impl OperationMode {
    /// Numerischer Modus wie ihn `/togglemode` meldet (0 = manuell, 1 = Sequenz)
    pub const fn number(self) -> u8 {
        match self {
            OperationMode::Manual => 0,
            OperationMode::Sequence => 1,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            OperationMode::Manual => OperationMode::Sequence,
            OperationMode::Sequence => OperationMode::Manual,
        }
    }
}

/// Kommando an den Controller-Task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceCommand {
    Apply(ValidCommand),
    /// Nur Kanäle setzen, Relais bleiben wie sie sind (`/setcmd/<bits>`)
    SetChannels(ChannelMask),
    ToggleMode,
    ToggleRelay(RelayId),
    StopAll,
}

impl DeviceCommand {
    /// Bitstring-Kommandos gelten nur im manuellen Modus
    pub const fn requires_manual(&self) -> bool {
        matches!(self, DeviceCommand::Apply(_) | DeviceCommand::SetChannels(_))
    }
}

/// Momentaufnahme des Gerätezustands für Status-Broadcasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceStatus {
    pub active: ChannelMask,
    pub light1: bool,
    pub light2: bool,
    pub mode: OperationMode,
}

impl DeviceStatus {
    pub const fn light(&self, relay: RelayId) -> bool {
        match relay {
            RelayId::One => self.light1,
            RelayId::Two => self.light2,
        }
    }
}

pub struct Controller<S: ServoDriver, R: RelayOutput> {
    scheduler: MotionScheduler<S>,
    relays: RelayBank<R>,
    mode: OperationMode,
    sequence: SequencePlayer,
}

impl<S: ServoDriver, R: RelayOutput> Controller<S, R> {
    /// Servos in die Mitte, Relais aus, manueller Modus
    pub fn new(servos: S, relay_output: R) -> Self {
        Self {
            scheduler: MotionScheduler::new(servos),
            relays: RelayBank::new(relay_output),
            mode: OperationMode::Manual,
            sequence: SequencePlayer::new(),
        }
    }

    /// Validiert und wendet einen Record an (Command Interpreter)
    pub fn apply(
        &mut self,
        record: &CommandRecord<'_>,
        now: Millis,
    ) -> Result<ValidCommand, CommandError> {
        self.ensure_manual()?;
        interpreter::apply(&mut self.scheduler, &mut self.relays, record, now)
    }

    /// Wendet ein am Transport bereits validiertes Kommando an
    pub fn execute(&mut self, command: &ValidCommand, now: Millis) -> Result<(), CommandError> {
        self.ensure_manual()?;
        interpreter::execute(&mut self.scheduler, &mut self.relays, command, now);
        Ok(())
    }

    /// Setzt nur die Kanäle, die Relais bleiben unverändert
    pub fn set_channels(&mut self, channels: ChannelMask, now: Millis) -> Result<(), CommandError> {
        self.ensure_manual()?;
        interpreter::set_channels(&mut self.scheduler, channels, now);
        Ok(())
    }

    pub fn handle(&mut self, command: DeviceCommand, now: Millis) -> Result<(), CommandError> {
        match command {
            DeviceCommand::Apply(valid) => self.execute(&valid, now)?,
            DeviceCommand::SetChannels(channels) => self.set_channels(channels, now)?,
            DeviceCommand::ToggleMode => {
                self.toggle_mode();
            }
            DeviceCommand::ToggleRelay(relay) => {
                self.toggle_relay(relay);
            }
            DeviceCommand::StopAll => self.scheduler.stop_all(),
        }
        Ok(())
    }

    /// Wechselt Manuell ↔ Sequenz und stoppt dabei alle Kanäle
    pub fn toggle_mode(&mut self) -> OperationMode {
        self.mode = self.mode.toggled();
        self.sequence.reset();
        self.scheduler.stop_all();
        self.mode
    }

    pub fn toggle_relay(&mut self, relay: RelayId) -> bool {
        self.relays.toggle(relay)
    }

    /// Ein Schleifen-Durchlauf: erst Sequenz-Schritt, dann Bewegung
    ///
    /// Liefert die Kanäle, deren Laufzeit in diesem Schritt abgelaufen ist.
    pub fn tick(&mut self, now: Millis) -> ChannelMask {
        if self.mode == OperationMode::Sequence {
            if let Some(step) = self.sequence.poll(now) {
                self.scheduler.stop_all();
                for channel in ChannelId::all().filter(|&channel| step.contains(channel)) {
                    self.scheduler.start(channel, now);
                }
            }
        }
        self.scheduler.tick(now)
    }

    pub fn status(&self) -> DeviceStatus {
        DeviceStatus {
            active: self.scheduler.active_mask(),
            light1: self.relays.is_on(RelayId::One),
            light2: self.relays.is_on(RelayId::Two),
            mode: self.mode,
        }
    }

    pub fn mode(&self) -> OperationMode {
        self.mode
    }

    pub fn scheduler(&self) -> &MotionScheduler<S> {
        &self.scheduler
    }

    pub fn relays(&self) -> &RelayBank<R> {
        &self.relays
    }

    fn ensure_manual(&self) -> Result<(), CommandError> {
        match self.mode {
            OperationMode::Manual => Ok(()),
            OperationMode::Sequence => Err(CommandError::SequenceActive),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceStatus {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "DeviceStatus {{ active: {}, light1: {}, light2: {}, mode: {} }}",
            self.active,
            self.light1,
            self.light2,
            self.mode
        )
    }
}
