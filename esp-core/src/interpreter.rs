//! Command Interpreter - übersetzt Kommandos in Scheduler- und Relais-Aufrufe
//!
//! Alles-oder-nichts: ein fehlerhafter Bitstring ändert weder Kanäle noch
//! Relais. Erst nach erfolgreicher Validierung wird irgendetwas geschrieben.

use crate::command::{ChannelMask, CommandError, CommandRecord, ValidCommand};
use crate::relay::{RelayBank, RelayId};
use crate::scheduler::MotionScheduler;
use crate::traits::{RelayOutput, ServoDriver};
use crate::types::{ChannelId, Millis};

/// Validiert und wendet einen Record an
pub fn apply<S: ServoDriver, R: RelayOutput>(
    scheduler: &mut MotionScheduler<S>,
    relays: &mut RelayBank<R>,
    record: &CommandRecord<'_>,
    now: Millis,
) -> Result<ValidCommand, CommandError> {
    let command = record.validate()?;
    execute(scheduler, relays, &command, now);
    Ok(command)
}

/// Wendet ein bereits validiertes Kommando an
///
/// Relais zuerst, dann Kanal 0..9: '1' startet, '0' stoppt.
pub fn execute<S: ServoDriver, R: RelayOutput>(
    scheduler: &mut MotionScheduler<S>,
    relays: &mut RelayBank<R>,
    command: &ValidCommand,
    now: Millis,
) {
    relays.set_state(RelayId::One, command.light1);
    relays.set_state(RelayId::Two, command.light2);
    set_channels(scheduler, command.channels, now);
}

/// Kanal 0..9 nach Maske starten bzw. stoppen, Relais bleiben unberührt
pub fn set_channels<S: ServoDriver>(
    scheduler: &mut MotionScheduler<S>,
    channels: ChannelMask,
    now: Millis,
) {
    for channel in ChannelId::all() {
        if channels.contains(channel) {
            scheduler.start(channel, now);
        } else {
            scheduler.stop(channel);
        }
    }
}
