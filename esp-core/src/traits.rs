//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Hardware-Zugriff
//! ohne konkrete Implementierung.

use crate::relay::{PinLevel, RelayId};
use crate::types::{Angle, ChannelId};

/// Trait für Servo-Ausgänge
///
/// Abstrahiert den PWM-Treiber für alle Servo-Kanäle.
///
/// # Implementierungen
/// - **Production:** Pca9685ServoDriver (PCA9685 über I2C)
/// - **Testing:** MockServoDriver (in-memory Mock)
///
/// # Fehlerbehandlung
/// Der Aufruf ist aus Sicht des Schedulers unfehlbar. Hardware-Fehler
/// werden von der Implementierung selbst geloggt.
pub trait ServoDriver {
    /// Setzt den Kanal auf einen Winkel (0..=180 Grad), blockiert nicht
    fn set_angle(&mut self, channel: ChannelId, angle: Angle);
}

/// Trait für die Relais-Ausgänge
///
/// # Implementierungen
/// - **Production:** GpioRelayOutputs (zwei GPIO Push-Pull Ausgänge)
/// - **Testing:** MockRelayOutput
pub trait RelayOutput {
    /// Schreibt den physischen Pegel für ein Relais
    fn write_level(&mut self, relay: RelayId, level: PinLevel);
}
