//! Motion Scheduler - Nicht-blockierende Pendelbewegung für alle Servos
//!
//! Jeder aktive Kanal pendelt zwischen `RIGHT` und `LEFT`. Ein Abschnitt
//! dauert `LEG_DURATION_MS`, nach `RUN_DURATION_MS` stoppt der Kanal
//! automatisch. Es gibt keine Delays: `tick()` vergleicht nur Zeitstempel
//! und läuft in O(CHANNEL_COUNT).
//!
//! Zustandsautomat pro Kanal:
//!
//! ```text
//! Idle --start()--> Leg(Center→Right) --2s--> Leg(Right→Left) --2s--> Leg(Left→Right) ...
//!   ^                                                                       |
//!   +-------------------- stop() oder Laufzeit abgelaufen ------------------+
//! ```

use crate::command::ChannelMask;
use crate::logic::{elapsed, lerp_angle};
use crate::traits::ServoDriver;
use crate::types::{
    ActuatorChannel, Angle, CENTER, CHANNEL_COUNT, ChannelId, ChannelState, LEG_DURATION_MS, Leg,
    Millis, RIGHT, RUN_DURATION_MS,
};

/// Besitzt alle Kanäle und den Servo-Treiber
pub struct MotionScheduler<S: ServoDriver> {
    channels: [ActuatorChannel; CHANNEL_COUNT],
    servos: S,
}

impl<S: ServoDriver> MotionScheduler<S> {
    /// Erstellt den Scheduler und fährt alle Servos in die Mitte
    pub fn new(mut servos: S) -> Self {
        for channel in ChannelId::all() {
            servos.set_angle(channel, CENTER);
        }
        Self {
            channels: [ActuatorChannel::new(); CHANNEL_COUNT],
            servos,
        }
    }

    /// Startet die Pendelbewegung eines Kanals
    ///
    /// Ein bereits aktiver Kanal startet neu: Laufzeit und Abschnitt
    /// beginnen wieder bei Center → Right.
    pub fn start(&mut self, channel: ChannelId, now: Millis) {
        let leg = Leg {
            started: now,
            from: CENTER,
            to: RIGHT,
        };
        self.channels[channel.index()].state = ChannelState::Oscillating {
            run_started: now,
            leg,
        };
        self.emit(channel, leg.from);
    }

    /// Stoppt einen Kanal und fährt ihn sofort in die Mitte
    pub fn stop(&mut self, channel: ChannelId) {
        self.channels[channel.index()].state = ChannelState::Idle;
        self.emit(channel, CENTER);
    }

    pub fn stop_all(&mut self) {
        for channel in ChannelId::all() {
            self.stop(channel);
        }
    }

    /// Ein Scheduler-Schritt: aktualisiert alle aktiven Kanäle
    ///
    /// Gibt die Kanäle zurück, die in diesem Schritt wegen abgelaufener
    /// Laufzeit gestoppt wurden.
    pub fn tick(&mut self, now: Millis) -> ChannelMask {
        let mut expired = ChannelMask::empty();

        for channel in ChannelId::all() {
            let ChannelState::Oscillating { run_started, leg } =
                self.channels[channel.index()].state
            else {
                continue;
            };

            if elapsed(now, run_started) >= RUN_DURATION_MS {
                self.stop(channel);
                expired.insert(channel);
                continue;
            }

            let leg_elapsed = elapsed(now, leg.started);
            if leg_elapsed >= LEG_DURATION_MS {
                // Abschnitt beendet: exakt am Ziel einrasten und umkehren
                self.channels[channel.index()].state = ChannelState::Oscillating {
                    run_started,
                    leg: leg.reversed(now),
                };
                self.emit(channel, leg.to);
            } else {
                let angle = lerp_angle(leg.from, leg.to, leg_elapsed, LEG_DURATION_MS);
                self.emit(channel, angle);
            }
        }

        expired
    }

    pub fn is_active(&self, channel: ChannelId) -> bool {
        self.channels[channel.index()].is_active()
    }

    /// Zuletzt kommandierter Winkel eines Kanals
    pub fn angle(&self, channel: ChannelId) -> Angle {
        self.channels[channel.index()].angle()
    }

    pub fn channel(&self, channel: ChannelId) -> &ActuatorChannel {
        &self.channels[channel.index()]
    }

    /// Maske aller aktiven Kanäle
    pub fn active_mask(&self) -> ChannelMask {
        ChannelId::all()
            .filter(|&channel| self.is_active(channel))
            .collect()
    }

    pub fn servos(&self) -> &S {
        &self.servos
    }

    pub fn servos_mut(&mut self) -> &mut S {
        &mut self.servos
    }

    fn emit(&mut self, channel: ChannelId, angle: Angle) {
        self.channels[channel.index()].angle = angle;
        self.servos.set_angle(channel, angle);
    }
}
