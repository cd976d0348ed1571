//! Pure Business Logic Functions
//!
//! Funktionen ohne Hardware-Dependencies (testbar!)

use crate::types::{Angle, Millis};

/// Vergangene Zeit seit `since`, überlauf-sicher
pub fn elapsed(now: Millis, since: Millis) -> Millis {
    now.wrapping_sub(since)
}

/// Lineare Interpolation zwischen zwei Winkeln
///
/// `elapsed` wird auf `[0, duration]` begrenzt: nach Ablauf der Dauer
/// liefert die Funktion exakt `to`, ein Überschwingen gibt es nicht.
/// Zwischenwerte werden Richtung `from` abgeschnitten (Integer-Division).
///
/// # Beispiele
///
/// ```
/// # use esp_core::lerp_angle;
/// assert_eq!(lerp_angle(90, 170, 0, 2000), 90);
/// assert_eq!(lerp_angle(90, 170, 1000, 2000), 130);
/// assert_eq!(lerp_angle(90, 170, 5000, 2000), 170);
/// ```
pub fn lerp_angle(from: Angle, to: Angle, elapsed: Millis, duration: Millis) -> Angle {
    if duration == 0 || elapsed >= duration {
        return to;
    }
    let delta = i64::from(to) - i64::from(from);
    let offset = delta * i64::from(elapsed) / i64::from(duration);
    (i64::from(from) + offset) as Angle
}

/// Servo-Pulsbreite für einen Winkel, in Zählschritten eines PWM-Frames
///
/// Winkel 0..=180 werden linear auf `min_pulse_us..=max_pulse_us` abgebildet
/// und dann auf die Auflösung `counts` des Frames (`frame_us`) umgerechnet.
/// Winkel über 180 werden auf 180 begrenzt.
///
/// # Beispiele
///
/// ```
/// # use esp_core::logic::pulse_counts;
/// // 50 Hz Frame, 12 Bit, 520..2380 µs
/// assert_eq!(pulse_counts(0, 520, 2380, 20_000, 4096), 106);
/// assert_eq!(pulse_counts(180, 520, 2380, 20_000, 4096), 487);
/// ```
pub fn pulse_counts(
    angle: Angle,
    min_pulse_us: u32,
    max_pulse_us: u32,
    frame_us: u32,
    counts: u32,
) -> u16 {
    let angle = u32::from(angle.min(180));
    let pulse_us = min_pulse_us + (max_pulse_us - min_pulse_us) * angle / 180;
    (pulse_us * counts / frame_us) as u16
}
