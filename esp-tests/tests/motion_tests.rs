//! Integration Tests für den Motion Scheduler
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen MockServoDriver

mod common;

use common::{MockServoDriver, ch};
use esp_core::{
    CENTER, CHANNEL_COUNT, ChannelState, LEFT, LEG_DURATION_MS, Leg, MotionScheduler, RIGHT,
    RUN_DURATION_MS,
};

fn scheduler() -> MotionScheduler<MockServoDriver> {
    MotionScheduler::new(MockServoDriver::new())
}

// ============================================================================
// Tests: Initialzustand
// ============================================================================

#[test]
fn test_new_homes_every_channel_to_center() {
    let scheduler = scheduler();

    assert_eq!(scheduler.servos().writes.len(), CHANNEL_COUNT);
    for index in 0..CHANNEL_COUNT {
        assert_eq!(scheduler.servos().last(index), Some(CENTER));
        assert!(!scheduler.is_active(ch(index)));
    }
    assert!(scheduler.active_mask().is_empty());
}

#[test]
fn test_tick_without_active_channels_writes_nothing() {
    let mut scheduler = scheduler();
    let before = scheduler.servos().writes.len();

    let expired = scheduler.tick(5_000);

    assert!(expired.is_empty());
    assert_eq!(scheduler.servos().writes.len(), before);
}

// ============================================================================
// Tests: start()
// ============================================================================

#[test]
fn test_start_begins_leg_center_to_right() {
    let mut scheduler = scheduler();

    scheduler.start(ch(3), 1_000);

    let channel = scheduler.channel(ch(3));
    assert!(channel.is_active());
    assert_eq!(
        channel.leg(),
        Some(Leg {
            started: 1_000,
            from: CENTER,
            to: RIGHT
        })
    );
    assert_eq!(channel.run_deadline(), Some(1_000 + RUN_DURATION_MS));
    assert_eq!(scheduler.servos().writes.last(), Some(&(3, CENTER)));
}

#[test]
fn test_restart_resets_run_timer_and_leg() {
    let mut scheduler = scheduler();
    scheduler.start(ch(0), 0);
    scheduler.tick(3_000); // mitten im Abschnitt Right → Left

    scheduler.start(ch(0), 20_000);

    assert_eq!(
        scheduler.channel(ch(0)).state(),
        ChannelState::Oscillating {
            run_started: 20_000,
            leg: Leg {
                started: 20_000,
                from: CENTER,
                to: RIGHT
            }
        }
    );

    // Alte Laufzeit wäre bei 30s abgelaufen, neue läuft bis 50s
    assert!(scheduler.tick(30_000).is_empty());
    assert!(scheduler.is_active(ch(0)));
    assert!(scheduler.tick(50_000).contains(ch(0)));
}

// ============================================================================
// Tests: Interpolation
// ============================================================================

#[test]
fn test_leg_start_midpoint_and_end() {
    let mut scheduler = scheduler();
    scheduler.start(ch(5), 1_000);

    scheduler.tick(1_000);
    assert_eq!(scheduler.angle(ch(5)), CENTER);

    scheduler.tick(1_000 + LEG_DURATION_MS / 2);
    assert_eq!(scheduler.angle(ch(5)), 130);

    scheduler.tick(1_000 + LEG_DURATION_MS);
    assert_eq!(scheduler.angle(ch(5)), RIGHT);
    assert_eq!(
        scheduler.channel(ch(5)).leg(),
        Some(Leg {
            started: 3_000,
            from: RIGHT,
            to: LEFT
        })
    );
}

#[test]
fn test_ping_pong_never_returns_through_center_leg() {
    let mut scheduler = scheduler();
    scheduler.start(ch(1), 0);

    scheduler.tick(2_000); // Ziel RIGHT erreicht
    scheduler.tick(3_000);
    assert_eq!(scheduler.angle(ch(1)), 90); // Mitte von 170 → 10
    scheduler.tick(4_000);
    assert_eq!(scheduler.angle(ch(1)), LEFT);
    scheduler.tick(6_000);
    assert_eq!(scheduler.angle(ch(1)), RIGHT);

    let leg = scheduler.channel(ch(1)).leg().unwrap();
    assert_eq!((leg.from, leg.to), (RIGHT, LEFT));
}

#[test]
fn test_interpolation_is_monotonic_within_leg() {
    let mut scheduler = scheduler();
    scheduler.start(ch(2), 0);

    let mut last = CENTER;
    for now in (0..=2_000).step_by(20) {
        scheduler.tick(now);
        let angle = scheduler.angle(ch(2));
        assert!(angle >= last, "angle went backwards at {now}ms");
        assert!(angle <= RIGHT);
        last = angle;
    }
    assert_eq!(last, RIGHT);
}

#[test]
fn test_late_tick_snaps_to_target_without_overshoot() {
    let mut scheduler = scheduler();
    scheduler.start(ch(4), 0);

    // Schleife hing 3.5s: Abschnitt endet exakt am Ziel
    scheduler.tick(3_500);

    assert_eq!(scheduler.angle(ch(4)), RIGHT);
    assert_eq!(scheduler.channel(ch(4)).leg().unwrap().started, 3_500);
}

// ============================================================================
// Tests: stop() und Laufzeit
// ============================================================================

#[test]
fn test_stop_returns_to_center_and_drops_leg() {
    let mut scheduler = scheduler();
    scheduler.start(ch(7), 0);
    scheduler.tick(1_000);

    scheduler.stop(ch(7));

    assert!(!scheduler.is_active(ch(7)));
    assert_eq!(scheduler.angle(ch(7)), CENTER);
    assert_eq!(scheduler.channel(ch(7)).leg(), None);
    assert_eq!(scheduler.servos().writes.last(), Some(&(7, CENTER)));

    // Kein Rest-Abschnitt wird weiter interpoliert
    let before = scheduler.servos().writes.len();
    scheduler.tick(1_500);
    assert_eq!(scheduler.servos().writes.len(), before);
}

#[test]
fn test_stop_on_idle_channel_is_noop() {
    let mut scheduler = scheduler();

    scheduler.stop(ch(9));
    scheduler.stop(ch(9));

    assert!(!scheduler.is_active(ch(9)));
    assert_eq!(scheduler.angle(ch(9)), CENTER);
    assert_eq!(scheduler.servos().last(9), Some(CENTER));
}

#[test]
fn test_run_duration_forces_stop() {
    let mut scheduler = scheduler();
    scheduler.start(ch(0), 500);

    assert!(scheduler.tick(500 + RUN_DURATION_MS - 1).is_empty());
    assert!(scheduler.is_active(ch(0)));

    let expired = scheduler.tick(500 + RUN_DURATION_MS);
    assert!(expired.contains(ch(0)));
    assert_eq!(expired.count(), 1);
    assert!(!scheduler.is_active(ch(0)));
    assert_eq!(scheduler.angle(ch(0)), CENTER);
}

#[test]
fn test_run_duration_expires_with_sparse_ticks() {
    let mut scheduler = scheduler();
    scheduler.start(ch(6), 0);

    for now in (0..RUN_DURATION_MS).step_by(700) {
        scheduler.tick(now);
        assert!(scheduler.is_active(ch(6)));
    }
    scheduler.tick(RUN_DURATION_MS + 10);
    assert!(!scheduler.is_active(ch(6)));
}

#[test]
fn test_stop_all() {
    let mut scheduler = scheduler();
    for index in 0..CHANNEL_COUNT {
        scheduler.start(ch(index), 0);
    }
    assert_eq!(scheduler.active_mask().count(), CHANNEL_COUNT as u32);

    scheduler.stop_all();

    assert!(scheduler.active_mask().is_empty());
    for index in 0..CHANNEL_COUNT {
        assert_eq!(scheduler.servos().last(index), Some(CENTER));
    }
}

#[test]
fn test_timestamps_wrap_around() {
    let mut scheduler = scheduler();
    let start = u32::MAX - 499;
    scheduler.start(ch(8), start);

    scheduler.tick(start.wrapping_add(LEG_DURATION_MS));
    assert_eq!(scheduler.angle(ch(8)), RIGHT);
    assert!(scheduler.is_active(ch(8)));

    assert!(
        scheduler
            .tick(start.wrapping_add(RUN_DURATION_MS))
            .contains(ch(8))
    );
}
