//! Integration Tests für den Controller (Modus, Auto-Sequenz, Status)
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen die Mocks aus `common`

mod common;

use common::{MockRelayOutput, MockServoDriver, ch};
use esp_core::sequence::SEQUENCE_STEPS;
use esp_core::{
    CENTER, CHANNEL_COUNT, ChannelMask, CommandError, CommandGate, CommandRecord, Controller,
    DeviceCommand, OperationMode, PinLevel, RUN_DURATION_MS, RelayId, SEQUENCE_STEP_MS,
};

type TestController = Controller<MockServoDriver, MockRelayOutput>;

fn controller() -> TestController {
    Controller::new(MockServoDriver::new(), MockRelayOutput::new())
}

fn valid(bits: &str, light1: bool, light2: bool) -> esp_core::ValidCommand {
    CommandRecord::new(bits, light1, light2).validate().unwrap()
}

// ============================================================================
// Tests: Initialzustand und Status
// ============================================================================

#[test]
fn test_initial_status() {
    let controller = controller();
    let status = controller.status();

    assert!(status.active.is_empty());
    assert!(!status.light1);
    assert!(!status.light2);
    assert_eq!(status.mode, OperationMode::Manual);
}

#[test]
fn test_status_reflects_apply() {
    let mut controller = controller();

    controller
        .apply(&CommandRecord::new("0010000001", false, true), 0)
        .unwrap();

    let status = controller.status();
    assert_eq!(status.active.to_bits().as_str(), "0010000001");
    assert!(!status.light1);
    assert!(status.light2);
}

// ============================================================================
// Tests: handle(DeviceCommand)
// ============================================================================

#[test]
fn test_handle_apply_and_stop_all() {
    let mut controller = controller();

    controller
        .handle(DeviceCommand::Apply(valid("1111100000", true, true)), 0)
        .unwrap();
    assert_eq!(controller.status().active.count(), 5);

    controller.handle(DeviceCommand::StopAll, 10).unwrap();
    assert!(controller.status().active.is_empty());
    // StopAll lässt die Relais unverändert
    assert!(controller.status().light1);
}

#[test]
fn test_handle_toggle_relay() {
    let mut controller = controller();

    controller
        .handle(DeviceCommand::ToggleRelay(RelayId::Two), 0)
        .unwrap();

    assert!(controller.status().light2);
    assert!(controller.status().light(RelayId::Two));
    assert!(!controller.status().light(RelayId::One));
    assert_eq!(
        controller.relays().output().level(RelayId::Two),
        Some(PinLevel::Low)
    );
}

#[test]
fn test_operation_mode_numbers() {
    assert_eq!(OperationMode::Manual.number(), 0);
    assert_eq!(OperationMode::Sequence.number(), 1);
    assert_eq!(OperationMode::Manual.toggled(), OperationMode::Sequence);
    assert_eq!(OperationMode::Sequence.toggled(), OperationMode::Manual);
}

#[test]
fn test_tick_reports_expired_channels() {
    let mut controller = controller();
    controller
        .apply(&CommandRecord::new("1000000000", false, false), 0)
        .unwrap();

    assert!(controller.tick(RUN_DURATION_MS - 1).is_empty());
    let expired = controller.tick(RUN_DURATION_MS);

    assert!(expired.contains(ch(0)));
    assert!(controller.status().active.is_empty());
}

#[test]
fn test_motion_continues_without_commands() {
    // Transport-Verlust: keine Kommandos mehr, Bewegung läuft weiter bis zur Laufzeit
    let mut controller = controller();
    controller
        .apply(&CommandRecord::new("0000011111", false, false), 0)
        .unwrap();

    for now in (0..RUN_DURATION_MS).step_by(20) {
        controller.tick(now);
    }
    assert_eq!(controller.status().active.count(), 5);

    controller.tick(RUN_DURATION_MS);
    assert!(controller.status().active.is_empty());
}

// ============================================================================
// Tests: Betriebsmodus und Auto-Sequenz
// ============================================================================

#[test]
fn test_toggle_mode_stops_all_channels() {
    let mut controller = controller();
    controller
        .apply(&CommandRecord::new("1111111111", false, false), 0)
        .unwrap();

    assert_eq!(controller.toggle_mode(), OperationMode::Sequence);

    assert!(controller.status().active.is_empty());
    for index in 0..CHANNEL_COUNT {
        assert_eq!(controller.scheduler().angle(ch(index)), CENTER);
    }
    assert_eq!(controller.toggle_mode(), OperationMode::Manual);
}

#[test]
fn test_sequence_mode_rejects_commands_without_mutation() {
    let mut controller = controller();
    controller.handle(DeviceCommand::ToggleMode, 0).unwrap();
    controller.tick(0);
    let before = controller.status();

    let result = controller.apply(&CommandRecord::new("0000000001", true, true), 10);
    assert_eq!(result, Err(CommandError::SequenceActive));

    let result = controller.handle(DeviceCommand::Apply(valid("0000000001", true, true)), 10);
    assert_eq!(result, Err(CommandError::SequenceActive));

    assert_eq!(controller.status(), before);
}

#[test]
fn test_sequence_steps_through_groups() {
    let mut controller = controller();
    controller.toggle_mode();

    let start = 1_000;
    for (step, expected) in SEQUENCE_STEPS.iter().enumerate() {
        let now = start + step as u32 * SEQUENCE_STEP_MS;
        controller.tick(now);
        assert_eq!(controller.status().active, *expected, "step {step}");
    }

    // Nach dem letzten Schritt beginnt die Tabelle von vorn
    controller.tick(start + SEQUENCE_STEPS.len() as u32 * SEQUENCE_STEP_MS);
    assert_eq!(controller.status().active, SEQUENCE_STEPS[0]);
}

#[test]
fn test_sequence_holds_between_steps() {
    let mut controller = controller();
    controller.toggle_mode();

    controller.tick(0);
    let first = controller.status().active;
    controller.tick(SEQUENCE_STEP_MS - 1);

    assert_eq!(controller.status().active, first);
    assert_eq!(first, ChannelMask::from_raw(0b1111));
}

#[test]
fn test_leaving_sequence_accepts_commands_again() {
    let mut controller = controller();
    controller.toggle_mode();
    controller.tick(0);

    controller.toggle_mode();

    assert!(controller.status().active.is_empty());
    assert!(
        controller
            .apply(&CommandRecord::new("0000000001", false, false), 100)
            .is_ok()
    );
    assert!(controller.scheduler().is_active(ch(9)));
}

// ============================================================================
// Tests: Warteschlangen-Reihenfolge (CommandGate + Controller)
// ============================================================================

#[test]
fn test_set_channels_keeps_queued_relay_toggle() {
    let mut controller = controller();

    // /light1 und danach /setcmd landen im selben Drain
    controller
        .handle(DeviceCommand::ToggleRelay(RelayId::One), 0)
        .unwrap();
    let mask = ChannelMask::parse("1000000001").unwrap();
    controller.handle(DeviceCommand::SetChannels(mask), 0).unwrap();

    let status = controller.status();
    assert!(status.light1);
    assert!(!status.light2);
    assert_eq!(
        controller.relays().output().level(RelayId::One),
        Some(PinLevel::Low)
    );
    assert_eq!(status.active, mask);
}

#[test]
fn test_set_channels_rejected_in_sequence_mode() {
    let mut controller = controller();
    controller.toggle_mode();
    let before = controller.status();

    let result = controller.handle(DeviceCommand::SetChannels(ChannelMask::all()), 0);

    assert_eq!(result, Err(CommandError::SequenceActive));
    assert_eq!(controller.status(), before);
}

#[test]
fn test_gate_rejects_bitstring_queued_after_mode_toggle() {
    let mut gate = CommandGate::new();

    // /togglemode ist eingereiht, der Controller hat es noch nicht gesehen
    gate.admit(DeviceCommand::ToggleMode).unwrap();
    let controller = controller();
    assert_eq!(controller.mode(), OperationMode::Manual);

    let setcmd = DeviceCommand::SetChannels(ChannelMask::parse("1000000000").unwrap());
    assert_eq!(gate.admit(setcmd), Err(CommandError::SequenceActive));
    assert_eq!(
        gate.admit(DeviceCommand::Apply(valid("1000000000", true, false))),
        Err(CommandError::SequenceActive)
    );
    assert_eq!(CommandError::SequenceActive.http_status(), 409);
}

#[test]
fn test_gate_agrees_with_controller_over_command_stream() {
    let commands = [
        DeviceCommand::ToggleRelay(RelayId::One),
        DeviceCommand::SetChannels(ChannelMask::parse("1100000000").unwrap()),
        DeviceCommand::Apply(valid("0000000011", false, true)),
        DeviceCommand::ToggleMode,
        DeviceCommand::SetChannels(ChannelMask::all()),
        DeviceCommand::ToggleRelay(RelayId::Two),
        DeviceCommand::Apply(valid("1111111111", true, true)),
        DeviceCommand::StopAll,
        DeviceCommand::ToggleMode,
        DeviceCommand::Apply(valid("0000000001", true, false)),
        DeviceCommand::ToggleRelay(RelayId::One),
    ];

    let mut gate = CommandGate::new();
    let mut controller = controller();

    for (step, command) in commands.into_iter().enumerate() {
        // Was das Gate annimmt, darf der Controller nicht mehr ablehnen
        if gate.admit(command).is_ok() {
            assert_eq!(controller.handle(command, step as u32 * 20), Ok(()));
        }

        let status = controller.status();
        assert_eq!(gate.mode(), status.mode);
        assert_eq!(gate.light(RelayId::One), status.light1);
        assert_eq!(gate.light(RelayId::Two), status.light2);
    }
}

#[test]
fn test_set_channels_rewrites_center_for_idle_channels() {
    let mut controller = controller();
    controller
        .handle(DeviceCommand::SetChannels(ChannelMask::all()), 0)
        .unwrap();
    controller.handle(DeviceCommand::StopAll, 20).unwrap();
    let writes = controller.scheduler().servos().writes.len();

    // Idle-Ticks schreiben nichts, erst das nächste Kommando stoppt erneut
    controller.tick(40);
    assert_eq!(controller.scheduler().servos().writes.len(), writes);

    controller
        .handle(DeviceCommand::SetChannels(ChannelMask::empty()), 60)
        .unwrap();
    let rewrites = &controller.scheduler().servos().writes[writes..];
    assert_eq!(rewrites.len(), CHANNEL_COUNT);
    assert!(rewrites.iter().all(|&(_, angle)| angle == CENTER));
}
