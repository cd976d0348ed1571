// Relais-Ausgänge über zwei GPIO-Pins (active-low Relaismodul)

use esp_core::{PinLevel, RelayId, RelayOutput};
use esp_hal::gpio::{Level, Output};

pub struct GpioRelayOutputs {
    relay1: Output<'static>,
    relay2: Output<'static>,
}

impl GpioRelayOutputs {
    /// Pins müssen bereits mit `Level::High` (Relais aus) konfiguriert sein
    pub fn new(relay1: Output<'static>, relay2: Output<'static>) -> Self {
        Self { relay1, relay2 }
    }
}

impl RelayOutput for GpioRelayOutputs {
    fn write_level(&mut self, relay: RelayId, level: PinLevel) {
        let level = match level {
            PinLevel::High => Level::High,
            PinLevel::Low => Level::Low,
        };
        match relay {
            RelayId::One => self.relay1.set_level(level),
            RelayId::Two => self.relay2.set_level(level),
        }
    }
}
