//! Integration Tests für Command Interpreter, Relais-Bank und Transport-Events
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen die Mocks aus `common`

mod common;

use common::{MockRelayOutput, MockServoDriver, ch};
use esp_core::interpreter;
use esp_core::{
    CENTER, CHANNEL_COUNT, ChannelMask, CommandError, CommandRecord, Dispatch, MotionScheduler,
    PinLevel, RIGHT, RelayBank, RelayId, TransportEvent,
};

fn setup() -> (MotionScheduler<MockServoDriver>, RelayBank<MockRelayOutput>) {
    (
        MotionScheduler::new(MockServoDriver::new()),
        RelayBank::new(MockRelayOutput::new()),
    )
}

// ============================================================================
// Tests: RelayBank
// ============================================================================

#[test]
fn test_relays_start_off_with_high_level() {
    let (_, relays) = setup();

    assert!(!relays.is_on(RelayId::One));
    assert!(!relays.is_on(RelayId::Two));
    assert_eq!(relays.output().level(RelayId::One), Some(PinLevel::High));
    assert_eq!(relays.output().level(RelayId::Two), Some(PinLevel::High));
}

#[test]
fn test_relay_on_drives_pin_low() {
    let (_, mut relays) = setup();

    relays.set_state(RelayId::Two, true);

    assert!(relays.is_on(RelayId::Two));
    assert_eq!(relays.output().level(RelayId::Two), Some(PinLevel::Low));
    assert_eq!(relays.output().level(RelayId::One), Some(PinLevel::High));
}

#[test]
fn test_relay_set_same_state_reasserts_pin() {
    let (_, mut relays) = setup();
    relays.set_state(RelayId::One, true);
    let writes = relays.output().write_count;

    relays.set_state(RelayId::One, true);

    assert_eq!(relays.output().write_count, writes + 1);
    assert_eq!(relays.output().level(RelayId::One), Some(PinLevel::Low));
}

#[test]
fn test_relay_toggle() {
    let (_, mut relays) = setup();

    assert!(relays.toggle(RelayId::One));
    assert_eq!(relays.output().level(RelayId::One), Some(PinLevel::Low));
    assert!(!relays.toggle(RelayId::One));
    assert_eq!(relays.output().level(RelayId::One), Some(PinLevel::High));
}

#[test]
fn test_relay_id_from_number() {
    assert_eq!(RelayId::try_from(1), Ok(RelayId::One));
    assert_eq!(RelayId::try_from(2), Ok(RelayId::Two));
    assert!(RelayId::try_from(3).is_err());
    assert!(RelayId::try_from(0).is_err());
}

// ============================================================================
// Tests: interpreter::apply()
// ============================================================================

#[test]
fn test_apply_first_channel_and_light1() {
    let (mut scheduler, mut relays) = setup();
    let record = CommandRecord::new("1000000000", true, false);

    let command = interpreter::apply(&mut scheduler, &mut relays, &record, 0).unwrap();

    assert_eq!(command.channels, ChannelMask::from_raw(1));
    assert!(scheduler.is_active(ch(0)));
    for index in 1..CHANNEL_COUNT {
        assert!(!scheduler.is_active(ch(index)));
    }
    let leg = scheduler.channel(ch(0)).leg().unwrap();
    assert_eq!((leg.from, leg.to), (CENTER, RIGHT));

    assert_eq!(relays.output().level(RelayId::One), Some(PinLevel::Low));
    assert_eq!(relays.output().level(RelayId::Two), Some(PinLevel::High));
}

#[test]
fn test_apply_active_iff_bit_set() {
    let patterns = [
        "0000000000",
        "1111111111",
        "1010101010",
        "0101010101",
        "0000000001",
        "1100110011",
    ];

    for bits in patterns {
        let (mut scheduler, mut relays) = setup();
        // Vorher alles an, damit auch Stopps geprüft werden
        interpreter::apply(
            &mut scheduler,
            &mut relays,
            &CommandRecord::new("1111111111", false, false),
            0,
        )
        .unwrap();

        interpreter::apply(
            &mut scheduler,
            &mut relays,
            &CommandRecord::new(bits, false, false),
            100,
        )
        .unwrap();

        for (index, bit) in bits.chars().enumerate() {
            assert_eq!(
                scheduler.is_active(ch(index)),
                bit == '1',
                "pattern {bits}, channel {index}"
            );
        }
    }
}

#[test]
fn test_apply_all_then_leg_end_hits_right_bound() {
    let (mut scheduler, mut relays) = setup();
    let record = CommandRecord::new("1111111111", false, false);
    interpreter::apply(&mut scheduler, &mut relays, &record, 10_000).unwrap();

    scheduler.tick(12_000);

    for index in 0..CHANNEL_COUNT {
        assert_eq!(scheduler.servos().last(index), Some(RIGHT));
        let leg = scheduler.channel(ch(index)).leg().unwrap();
        assert_eq!(leg.from, RIGHT);
        assert_eq!(leg.started, 12_000);
    }
}

#[test]
fn test_apply_malformed_mutates_nothing() {
    let malformed = [
        ("000000000", CommandError::WrongLength { len: 9 }),
        ("00000000000", CommandError::WrongLength { len: 11 }),
        ("", CommandError::WrongLength { len: 0 }),
        ("10000000a0", CommandError::InvalidCharacter { index: 8 }),
        ("2000000000", CommandError::InvalidCharacter { index: 0 }),
    ];

    for (bits, expected) in malformed {
        let (mut scheduler, mut relays) = setup();
        interpreter::apply(
            &mut scheduler,
            &mut relays,
            &CommandRecord::new("0110000000", false, true),
            0,
        )
        .unwrap();
        let servo_writes = scheduler.servos().writes.len();
        let relay_writes = relays.output().write_count;
        let mask_before = scheduler.active_mask();

        // Relais-Flags dürfen bei ungültigem Bitstring nicht greifen
        let result = interpreter::apply(
            &mut scheduler,
            &mut relays,
            &CommandRecord::new(bits, true, false),
            500,
        );

        assert_eq!(result, Err(expected), "bits {bits:?}");
        assert_eq!(scheduler.active_mask(), mask_before);
        assert_eq!(scheduler.servos().writes.len(), servo_writes);
        assert_eq!(relays.output().write_count, relay_writes);
        assert!(!relays.is_on(RelayId::One));
        assert!(relays.is_on(RelayId::Two));
    }
}

#[test]
fn test_apply_non_ascii_is_rejected() {
    let (mut scheduler, mut relays) = setup();

    let result = interpreter::apply(
        &mut scheduler,
        &mut relays,
        &CommandRecord::new("100000000ü", false, false),
        0,
    );

    assert_eq!(result, Err(CommandError::InvalidCharacter { index: 9 }));
    assert!(scheduler.active_mask().is_empty());
}

// ============================================================================
// Tests: TransportEvent::dispatch()
// ============================================================================

#[test]
fn test_dispatch_message_validates() {
    let event = TransportEvent::Message(CommandRecord::new("0000000011", false, true));

    match event.dispatch() {
        Dispatch::Command(command) => {
            assert_eq!(command.channels.to_bits().as_str(), "0000000011");
            assert!(!command.light1);
            assert!(command.light2);
        }
        other => panic!("Expected Command, got {other:?}"),
    }
}

#[test]
fn test_dispatch_message_rejects_malformed() {
    let event = TransportEvent::Message(CommandRecord::new("01", true, true));
    assert_eq!(
        event.dispatch(),
        Dispatch::Rejected(CommandError::WrongLength { len: 2 })
    );
}

#[test]
fn test_dispatch_lifecycle_events_are_ignored() {
    for event in [
        TransportEvent::Connected,
        TransportEvent::Disconnected,
        TransportEvent::Error,
    ] {
        assert_eq!(event.dispatch(), Dispatch::Ignored);
    }
}

// ============================================================================
// Tests: /setcmd Pfad-Bitstring
// ============================================================================

#[test]
fn test_empty_path_bitstring_is_bad_request() {
    let error = ChannelMask::parse("").unwrap_err();

    assert_eq!(error, CommandError::WrongLength { len: 0 });
    assert_eq!(error.http_status(), 400);
    assert_eq!(error.message(), "Bitstring must be length 10");
}

#[test]
fn test_set_channels_leaves_relays_alone() {
    let (mut scheduler, mut relays) = setup();
    relays.set_state(RelayId::One, true);
    let relay_writes = relays.output().write_count;

    interpreter::set_channels(&mut scheduler, ChannelMask::parse("0100000001").unwrap(), 0);

    assert_eq!(relays.output().write_count, relay_writes);
    assert!(relays.is_on(RelayId::One));
    assert!(scheduler.is_active(ch(1)));
    assert!(scheduler.is_active(ch(9)));
    assert_eq!(scheduler.active_mask().count(), 2);
}
