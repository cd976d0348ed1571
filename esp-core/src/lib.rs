//! ESP Core - Platform-agnostic Motion Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Traits für Servo- und Relais-Ausgänge sowie den
//! nicht-blockierenden Bewegungs-Scheduler und den Kommando-Interpreter.

#![no_std]

pub mod command;
pub mod controller;
pub mod gate;
pub mod interpreter;
pub mod logic;
pub mod relay;
pub mod scheduler;
pub mod sequence;
pub mod traits;
pub mod transport;
pub mod types;

// Re-exports für einfachen Zugriff
pub use command::{BitString, ChannelMask, CommandError, CommandRecord, ValidCommand};
pub use controller::{Controller, DeviceCommand, DeviceStatus, OperationMode};
pub use gate::CommandGate;
pub use logic::{elapsed, lerp_angle, pulse_counts};
pub use relay::{PinLevel, RelayBank, RelayId};
pub use scheduler::MotionScheduler;
pub use sequence::{SEQUENCE_STEP_MS, SequencePlayer};
pub use traits::{RelayOutput, ServoDriver};
pub use transport::{Dispatch, TransportEvent};
pub use types::{
    ActuatorChannel, Angle, CENTER, CHANNEL_COUNT, ChannelId, ChannelState, LEFT, LEG_DURATION_MS,
    Leg, Millis, RIGHT, RUN_DURATION_MS,
};
