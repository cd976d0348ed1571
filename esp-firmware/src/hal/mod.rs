// Hardware Abstraction Layer (HAL) Module
//
// Implementiert die Traits aus esp-core (ServoDriver, RelayOutput)
// für die echte Hardware. Mocks für Tests liegen in esp-tests.

pub mod relay_pins;
pub mod servo_driver;

pub use relay_pins::GpioRelayOutputs;
pub use servo_driver::Pca9685ServoDriver;
