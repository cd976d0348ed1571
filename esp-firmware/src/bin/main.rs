// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi benötigt dynamischen Speicher)
extern crate alloc;

use core::cell::Cell;

// Embassy Async Runtime
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Timer};

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::rng::Rng;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use esp_puppen_steuerung::config::{
    EXTRA_HEAP_SIZE, HTTP_TASK_POOL_SIZE, I2C_FREQUENCY_KHZ, WIFI_HEAP_SIZE,
};
use esp_puppen_steuerung::hal::{GpioRelayOutputs, Pca9685ServoDriver};
use esp_puppen_steuerung::link::CommandLink;
use esp_puppen_steuerung::tasks::{
    connection_task, dhcp_task, http_server_task, mdns_responder_task, motion_task, mqtt_task,
    net_task,
};
use esp_puppen_steuerung::{
    CommandGate, CommandGateLock, DeviceCommandChannel, DeviceStatus, DeviceStatusChannel,
    StatusCell,
};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Schaltet zuerst die Relais aus und initialisiert den Servo-Expander,
/// danach WiFi und Netzwerk. Alle Arbeit läuft anschließend in Tasks.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Relais sind active-low: HIGH = aus, so früh wie möglich setzen
    let relay1 = Output::new(peripherals.GPIO2, Level::High, OutputConfig::default());
    let relay2 = Output::new(peripherals.GPIO3, Level::High, OutputConfig::default());
    let relays = GpioRelayOutputs::new(relay1, relay2);

    // PCA9685 Servo-Expander über I2C (SDA = GPIO6, SCL = GPIO7)
    let i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQUENCY_KHZ)),
    )
    .expect("Failed to configure I2C")
    .with_sda(peripherals.GPIO6)
    .with_scl(peripherals.GPIO7);
    let servos = Pca9685ServoDriver::new(i2c).expect("PCA9685 not responding on I2C");

    // Heap Allocator initialisieren (WiFi braucht dynamischen Speicher!)
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    // WiFi Hardware initialisieren
    static RADIO_INIT: static_cell::StaticCell<esp_radio::Controller> =
        static_cell::StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interface) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // 12 Sockets: MQTT + DNS + mDNS + HTTP_TASK_POOL_SIZE HTTP/WebSocket + Reserve
    static RESOURCES: static_cell::StaticCell<StackResources<12>> = static_cell::StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    let (stack, runner) = embassy_net::new(
        wifi_interface.sta,
        NetConfig::dhcpv4(Default::default()),
        resources,
        seed,
    );

    static STACK: static_cell::StaticCell<Stack<'static>> = static_cell::StaticCell::new();
    let stack = &*STACK.init(stack);

    // Status-Broadcast: Motion Task → MQTT + WebSockets
    static STATUS_CHANNEL: static_cell::StaticCell<DeviceStatusChannel> =
        static_cell::StaticCell::new();
    let status_channel = &*STATUS_CHANNEL.init(DeviceStatusChannel::new());
    let status_publisher = status_channel
        .publisher()
        .expect("Status channel has no publisher slot");

    // Letzter Status für synchrone Abfragen (/status, WebSocket-Start)
    static STATUS_CELL: static_cell::StaticCell<StatusCell> = static_cell::StaticCell::new();
    let status_cell = &*STATUS_CELL.init(Mutex::new(Cell::new(DeviceStatus::default())));

    // Kommandos: HTTP/WebSocket/MQTT → Motion Task
    static COMMAND_CHANNEL: static_cell::StaticCell<DeviceCommandChannel> =
        static_cell::StaticCell::new();
    let command_channel = COMMAND_CHANNEL.init(DeviceCommandChannel::new());

    // Modus und Relais in Warteschlangen-Reihenfolge (409 ohne Verzögerung)
    static COMMAND_GATE: static_cell::StaticCell<CommandGateLock> = static_cell::StaticCell::new();
    let command_gate = &*COMMAND_GATE.init(CommandGateLock::new(CommandGate::new()));
    let link = CommandLink::new(command_channel.sender(), command_gate, status_cell);

    // Motion Task zuerst: Servos fahren sofort auf 90°
    spawner
        .spawn(motion_task(
            servos,
            relays,
            command_channel.receiver(),
            status_publisher,
            status_cell,
        ))
        .unwrap();

    // Spawn WiFi Tasks
    spawner.spawn(connection_task(wifi_controller)).unwrap();
    spawner.spawn(net_task(runner)).unwrap();
    spawner.spawn(dhcp_task(stack)).unwrap();

    let mqtt_subscriber = status_channel
        .subscriber()
        .expect("Status channel has no subscriber slot");
    spawner.spawn(mqtt_task(stack, mqtt_subscriber, link)).unwrap();

    // Jede HTTP-Task-Instanz bedient eine Verbindung gleichzeitig
    for task_id in 0..HTTP_TASK_POOL_SIZE {
        spawner
            .spawn(http_server_task(task_id, stack, status_channel, link))
            .unwrap();
    }

    // mDNS Responder (puppen.local)
    spawner.spawn(mdns_responder_task(stack)).unwrap();

    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
