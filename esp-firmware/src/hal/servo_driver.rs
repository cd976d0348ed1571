// Servo-Treiber: PCA9685 16-Kanal PWM-Expander über I2C
//
// Kanal 0..9 des Schedulers liegt auf PCA9685-Ausgang C0..C9.
// Der Expander erzeugt das 50 Hz Signal selbst und hält die zuletzt
// geschriebene Pulsbreite. Der Scheduler schreibt aktive Kanäle bei jedem
// Tick, einen gestoppten Kanal nur beim Stoppen.

use defmt::{Debug2Format, error};
use esp_core::{Angle, ChannelId, ServoDriver, pulse_counts};
use esp_hal::Blocking;
use esp_hal::i2c::master::{Error as I2cError, I2c};
use pwm_pca9685::{Address, Channel, Error as PcaError, Pca9685};

use crate::config::{
    PCA9685_COUNTS, PCA9685_PRESCALE, SERVO_FRAME_US, SERVO_MAX_PULSE_US, SERVO_MIN_PULSE_US,
};

/// PCA9685-Ausgänge in Scheduler-Reihenfolge
const OUTPUTS: [Channel; 10] = [
    Channel::C0,
    Channel::C1,
    Channel::C2,
    Channel::C3,
    Channel::C4,
    Channel::C5,
    Channel::C6,
    Channel::C7,
    Channel::C8,
    Channel::C9,
];

pub struct Pca9685ServoDriver {
    pwm: Pca9685<I2c<'static, Blocking>>,
}

impl Pca9685ServoDriver {
    /// Initialisiert den PCA9685 auf Adresse 0x40 mit 50 Hz Frame
    pub fn new(i2c: I2c<'static, Blocking>) -> Result<Self, PcaError<I2cError>> {
        let mut pwm = Pca9685::new(i2c, Address::default())?;
        pwm.set_prescale(PCA9685_PRESCALE)?;
        pwm.enable()?;
        Ok(Self { pwm })
    }
}

impl ServoDriver for Pca9685ServoDriver {
    fn set_angle(&mut self, channel: ChannelId, angle: Angle) {
        let off = pulse_counts(
            angle,
            SERVO_MIN_PULSE_US,
            SERVO_MAX_PULSE_US,
            SERVO_FRAME_US,
            PCA9685_COUNTS,
        );
        let output = OUTPUTS[channel.index()];
        // Fehler nur loggen. Aktive Kanäle schreibt der nächste Tick neu, ein
        // gestoppter Kanal bekommt die Mitte erst mit dem nächsten Kommando,
        // das ihn erneut stoppt.
        if let Err(e) = self.pwm.set_channel_on_off(output, 0, off) {
            error!(
                "Servo: Failed to write channel {}: {}",
                channel.index(),
                Debug2Format(&e)
            );
        }
    }
}
