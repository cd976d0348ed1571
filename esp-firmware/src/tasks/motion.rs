// Motion Task - einziger Besitzer von Scheduler, Relais und Modus
use defmt::{info, warn};
use embassy_time::{Duration, Instant, Ticker};
use esp_core::{Millis, RelayOutput, ServoDriver};

use crate::config::MOTION_TICK_MS;
use crate::hal::{GpioRelayOutputs, Pca9685ServoDriver};
use crate::{Controller, DeviceCommandReceiver, DeviceStatusPublisher, StatusCell};

/// Millisekunden seit Boot, läuft nach ~49 Tagen über
fn now_millis() -> Millis {
    Instant::now().as_millis() as Millis
}

/// Motion Logic - Testbare Schleife ohne Hardware-Abhängigkeit
///
/// Pro Durchlauf (alle `MOTION_TICK_MS`):
/// 1. Alle wartenden Kommandos anwenden
/// 2. `Controller::tick()` - Sequenz-Schritt, Interpolation, Laufzeit-Ende
/// 3. Bei Zustandsänderung Status-Zelle aktualisieren und broadcasten
///
/// Der generische Controller erlaubt Hardware-Treiber oder Mocks.
pub async fn motion_logic<S: ServoDriver, R: RelayOutput>(
    mut controller: Controller<S, R>,
    command_receiver: DeviceCommandReceiver,
    status_publisher: DeviceStatusPublisher,
    status_cell: &'static StatusCell,
) -> ! {
    let mut last_status = controller.status();
    status_cell.lock(|cell| cell.set(last_status));
    status_publisher.publish_immediate(last_status);
    info!("Motion: Ready, all channels centered");

    let mut ticker = Ticker::every(Duration::from_millis(MOTION_TICK_MS));

    loop {
        let now = now_millis();

        // Kommandos non-blocking abholen, vollständig vor dem Tick anwenden
        while let Ok(command) = command_receiver.try_receive() {
            match controller.handle(command, now) {
                Ok(()) => info!("Motion: Applied {}", command),
                Err(e) => warn!("Motion: Rejected {}: {}", command, e),
            }
        }

        let expired = controller.tick(now);
        if !expired.is_empty() {
            info!("Motion: Run time elapsed, stopped {}", expired);
        }

        let status = controller.status();
        if status != last_status {
            status_cell.lock(|cell| cell.set(status));
            status_publisher.publish_immediate(status);
            last_status = status;
        }

        ticker.next().await;
    }
}

/// Motion Task - Embassy Task für parallele Ausführung
///
/// Baut den Controller aus den in `main()` initialisierten Treibern.
/// Dabei werden alle Servos auf 90° gestellt und beide Relais ausgeschaltet.
#[embassy_executor::task]
pub async fn motion_task(
    servos: Pca9685ServoDriver,
    relays: GpioRelayOutputs,
    command_receiver: DeviceCommandReceiver,
    status_publisher: DeviceStatusPublisher,
    status_cell: &'static StatusCell,
) {
    let controller = Controller::new(servos, relays);
    motion_logic(controller, command_receiver, status_publisher, status_cell).await
}
