//! Relais-Bank für die zwei Licht-Ausgänge
//!
//! Die Relais-Module sind active-low verdrahtet: logisch EIN → LOW,
//! logisch AUS → HIGH. Diese Zuordnung ist fest und nicht konfigurierbar.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::traits::RelayOutput;

/// Identifiziert eines der beiden Relais (`light1`, `light2`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RelayId {
    #[cfg_attr(feature = "serde", serde(rename = "light1"))]
    One,
    #[cfg_attr(feature = "serde", serde(rename = "light2"))]
    Two,
}

impl RelayId {
    pub const ALL: [RelayId; 2] = [RelayId::One, RelayId::Two];

    const fn slot(self) -> usize {
        match self {
            RelayId::One => 0,
            RelayId::Two => 1,
        }
    }
}

impl TryFrom<u8> for RelayId {
    type Error = ();

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        match number {
            1 => Ok(RelayId::One),
            2 => Ok(RelayId::Two),
            _ => Err(()),
        }
    }
}

/// Physischer Pegel eines Ausgangs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinLevel {
    High,
    Low,
}

impl PinLevel {
    /// Active-low Zuordnung: EIN → LOW, AUS → HIGH
    pub const fn for_relay(on: bool) -> Self {
        if on { PinLevel::Low } else { PinLevel::High }
    }
}

/// Logischer Zustand beider Relais plus Hardware-Ausgang
pub struct RelayBank<R: RelayOutput> {
    states: [bool; 2],
    output: R,
}

impl<R: RelayOutput> RelayBank<R> {
    /// Erstellt die Bank und schaltet beide Relais AUS
    pub fn new(mut output: R) -> Self {
        for relay in RelayId::ALL {
            output.write_level(relay, PinLevel::for_relay(false));
        }
        Self {
            states: [false; 2],
            output,
        }
    }

    /// Setzt den logischen Zustand und schreibt sofort den Pin
    ///
    /// Gleicher Zustand zweimal gesetzt schreibt den Pin trotzdem erneut.
    pub fn set_state(&mut self, relay: RelayId, on: bool) {
        self.states[relay.slot()] = on;
        self.output.write_level(relay, PinLevel::for_relay(on));
    }

    /// Schaltet ein Relais um und liefert den neuen Zustand
    pub fn toggle(&mut self, relay: RelayId) -> bool {
        let on = !self.is_on(relay);
        self.set_state(relay, on);
        on
    }

    pub fn is_on(&self, relay: RelayId) -> bool {
        self.states[relay.slot()]
    }

    pub fn output(&self) -> &R {
        &self.output
    }
}
