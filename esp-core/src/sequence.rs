//! Auto-Sequenz: spielt eine feste Folge von Kanal-Gruppen ab

use crate::command::ChannelMask;
use crate::logic::elapsed;
use crate::types::Millis;

/// Abstand zwischen zwei Sequenz-Schritten
pub const SEQUENCE_STEP_MS: Millis = 2_000;

const GROUP_A: ChannelMask = ChannelMask::from_raw(0b00_0000_1111); // Kanal 0-3
const GROUP_B: ChannelMask = ChannelMask::from_raw(0b00_1111_0000); // Kanal 4-7
const GROUP_C: ChannelMask = ChannelMask::from_raw(0b11_0000_0000); // Kanal 8-9
const EVERYONE: ChannelMask = ChannelMask::all();

/// Schritt-Tabelle, wird zyklisch wiederholt
pub const SEQUENCE_STEPS: [ChannelMask; 10] = [
    GROUP_A, GROUP_B, GROUP_C, EVERYONE, GROUP_A, EVERYONE, GROUP_B, EVERYONE, GROUP_C, EVERYONE,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequencePlayer {
    next_step: usize,
    last_step: Option<Millis>,
}

impl SequencePlayer {
    pub const fn new() -> Self {
        Self {
            next_step: 0,
            last_step: None,
        }
    }

    /// Zurück auf Schritt 0, nächster `poll()` feuert sofort
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Liefert die Kanäle des nächsten Schritts, wenn er fällig ist
    pub fn poll(&mut self, now: Millis) -> Option<ChannelMask> {
        if let Some(last) = self.last_step {
            if elapsed(now, last) < SEQUENCE_STEP_MS {
                return None;
            }
        }

        let step = SEQUENCE_STEPS[self.next_step];
        self.last_step = Some(now);
        self.next_step = (self.next_step + 1) % SEQUENCE_STEPS.len();
        Some(step)
    }
}
