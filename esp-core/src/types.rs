//! Core Types für die Servo-Steuerung
//!
//! Datenstrukturen ohne Hardware-Dependencies: Kanal-Adressierung,
//! Bewegungs-Konstanten und der Zustand eines einzelnen Servo-Kanals.

/// Zeitstempel in Millisekunden seit Boot
///
/// `u32` läuft nach ~49.7 Tagen über. Alle Differenzen werden mit
/// `wrapping_sub` gebildet, damit der Überlauf keine Sprünge erzeugt.
pub type Millis = u32;

/// Servo-Winkel in Grad (0..=180)
pub type Angle = u8;

/// Anzahl der Servo-Kanäle (fest verdrahtet)
pub const CHANNEL_COUNT: usize = 10;

/// Ruhe-Position: jeder inaktive Kanal steht hier
pub const CENTER: Angle = 90;

/// Rechter Umkehrpunkt der Pendelbewegung
pub const RIGHT: Angle = 170;

/// Linker Umkehrpunkt der Pendelbewegung
pub const LEFT: Angle = 10;

/// Maximale Laufzeit eines Kanals bis zum automatischen Stopp
pub const RUN_DURATION_MS: Millis = 30_000;

/// Dauer eines Bewegungs-Abschnitts (z.B. Rechts → Links)
pub const LEG_DURATION_MS: Millis = 2_000;

/// Index eines Servo-Kanals (0..CHANNEL_COUNT)
///
/// Kann nur mit gültigem Index erzeugt werden. Dadurch ist ein
/// Kanal außerhalb des Bereichs im Scheduler nicht darstellbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId(u8);

impl ChannelId {
    /// Erstellt eine ChannelId, `None` wenn `index >= CHANNEL_COUNT`
    pub const fn new(index: usize) -> Option<Self> {
        if index < CHANNEL_COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Alle Kanäle in Index-Reihenfolge
    pub fn all() -> impl Iterator<Item = ChannelId> {
        (0..CHANNEL_COUNT as u8).map(ChannelId)
    }
}

/// Ein Interpolations-Abschnitt zwischen zwei Winkeln
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Leg {
    /// Startzeit des Abschnitts
    pub started: Millis,
    pub from: Angle,
    pub to: Angle,
}

impl Leg {
    /// Folge-Abschnitt: startet am aktuellen Ziel und läuft zum
    /// gegenüberliegenden Umkehrpunkt (Rechts ↔ Links, nie über die Mitte)
    pub fn reversed(self, now: Millis) -> Self {
        let next = if self.to == RIGHT { LEFT } else { RIGHT };
        Self {
            started: now,
            from: self.to,
            to: next,
        }
    }
}

/// Zustand eines Kanals
///
/// Ein inaktiver Kanal trägt keinen Abschnitt mit sich, es gibt also
/// keinen Rest-Zustand der nach einem Stopp weiter interpoliert wird.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    Idle,
    Oscillating { run_started: Millis, leg: Leg },
}

/// Bewegungs-Zustand eines physischen Servos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorChannel {
    pub(crate) state: ChannelState,
    pub(crate) angle: Angle,
}

impl ActuatorChannel {
    /// Inaktiver Kanal in Ruhe-Position
    pub const fn new() -> Self {
        Self {
            state: ChannelState::Idle,
            angle: CENTER,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ChannelState::Oscillating { .. })
    }

    /// Zuletzt kommandierter Winkel
    pub fn angle(&self) -> Angle {
        self.angle
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Aktueller Abschnitt (nur wenn aktiv)
    pub fn leg(&self) -> Option<Leg> {
        match self.state {
            ChannelState::Oscillating { leg, .. } => Some(leg),
            ChannelState::Idle => None,
        }
    }

    /// Zeitpunkt des automatischen Stopps (nur wenn aktiv)
    pub fn run_deadline(&self) -> Option<Millis> {
        match self.state {
            ChannelState::Oscillating { run_started, .. } => {
                Some(run_started.wrapping_add(RUN_DURATION_MS))
            }
            ChannelState::Idle => None,
        }
    }
}

impl Default for ActuatorChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_id_range() {
        assert_eq!(ChannelId::new(0).map(ChannelId::index), Some(0));
        assert_eq!(ChannelId::new(9).map(ChannelId::index), Some(9));
        assert_eq!(ChannelId::new(10), None);
        assert_eq!(ChannelId::all().count(), CHANNEL_COUNT);
    }

    #[test]
    fn test_leg_ping_pong() {
        let first = Leg {
            started: 0,
            from: CENTER,
            to: RIGHT,
        };
        let second = first.reversed(2_000);
        assert_eq!((second.from, second.to, second.started), (RIGHT, LEFT, 2_000));
        let third = second.reversed(4_000);
        assert_eq!((third.from, third.to), (LEFT, RIGHT));
    }

    #[test]
    fn test_new_channel_is_idle_at_center() {
        let channel = ActuatorChannel::new();
        assert!(!channel.is_active());
        assert_eq!(channel.angle(), CENTER);
        assert_eq!(channel.leg(), None);
        assert_eq!(channel.run_deadline(), None);
    }
}
