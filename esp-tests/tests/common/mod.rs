//! Gemeinsame Mocks für die Integration Tests
//!
//! Zeichnen jeden Hardware-Zugriff auf, damit Tests Reihenfolge und
//! Werte der Ausgaben prüfen können.

#![allow(dead_code)]

use esp_core::{Angle, CHANNEL_COUNT, ChannelId, PinLevel, RelayId, RelayOutput, ServoDriver};

// ============================================================================
// Mock Servo Driver
// ============================================================================

#[derive(Default)]
pub struct MockServoDriver {
    /// Zuletzt geschriebener Winkel je Kanal
    pub last_angle: [Option<Angle>; CHANNEL_COUNT],
    /// Alle Schreibzugriffe in Reihenfolge
    pub writes: Vec<(usize, Angle)>,
}

impl MockServoDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self, channel: usize) -> Option<Angle> {
        self.last_angle[channel]
    }
}

impl ServoDriver for MockServoDriver {
    fn set_angle(&mut self, channel: ChannelId, angle: Angle) {
        self.last_angle[channel.index()] = Some(angle);
        self.writes.push((channel.index(), angle));
    }
}

// ============================================================================
// Mock Relay Output
// ============================================================================

#[derive(Default)]
pub struct MockRelayOutput {
    pub relay1: Option<PinLevel>,
    pub relay2: Option<PinLevel>,
    pub write_count: usize,
}

impl MockRelayOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, relay: RelayId) -> Option<PinLevel> {
        match relay {
            RelayId::One => self.relay1,
            RelayId::Two => self.relay2,
        }
    }
}

impl RelayOutput for MockRelayOutput {
    fn write_level(&mut self, relay: RelayId, level: PinLevel) {
        match relay {
            RelayId::One => self.relay1 = Some(level),
            RelayId::Two => self.relay2 = Some(level),
        }
        self.write_count += 1;
    }
}

pub fn ch(index: usize) -> ChannelId {
    ChannelId::new(index).unwrap()
}
