// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
#![allow(dead_code)]

// ============================================================================
// Servo Konfiguration (PCA9685 über I2C)
// ============================================================================

/// GPIO-Pin für I2C SDA (PCA9685)
pub const I2C_SDA_GPIO_PIN: u8 = 6;

/// GPIO-Pin für I2C SCL (PCA9685)
pub const I2C_SCL_GPIO_PIN: u8 = 7;

/// I2C Taktfrequenz in kHz
/// PCA9685 kann bis 1 MHz, 400 kHz reicht für 10 Kanäle alle 20 ms
pub const I2C_FREQUENCY_KHZ: u32 = 400;

/// PCA9685 Prescaler für 50 Hz Servo-Frame
/// round(25 MHz / (4096 * 50 Hz)) - 1 = 121
pub const PCA9685_PRESCALE: u8 = 121;

/// Länge eines Servo-Frames in Mikrosekunden (50 Hz)
pub const SERVO_FRAME_US: u32 = 20_000;

/// Auflösung des PCA9685 (12 Bit)
pub const PCA9685_COUNTS: u32 = 4096;

/// Pulsbreite für 0 Grad in Mikrosekunden
pub const SERVO_MIN_PULSE_US: u32 = 520;

/// Pulsbreite für 180 Grad in Mikrosekunden
pub const SERVO_MAX_PULSE_US: u32 = 2380;

/// Intervall der Scheduler-Schleife in Millisekunden
/// Ein Servo-Frame: schneller aktualisieren bringt nichts
pub const MOTION_TICK_MS: u64 = 20;

// ============================================================================
// Relais Konfiguration
// ============================================================================

/// GPIO-Pin für Relais 1 (`light1`, active-low)
pub const RELAY1_GPIO_PIN: u8 = 2;

/// GPIO-Pin für Relais 2 (`light2`, active-low)
pub const RELAY2_GPIO_PIN: u8 = 3;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Wartezeit nach fehlgeschlagenem Start/Connect in Sekunden
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Wartezeit nach Verbindungsabbruch in Sekunden
pub const WIFI_RECONNECT_DELAY_SECS: u64 = 2;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

/// Polling-Intervall beim Warten auf Link/DHCP in Millisekunden
pub const NETWORK_POLL_MS: u64 = 500;

// ============================================================================
// MQTT Konfiguration
// ============================================================================

/// MQTT Broker Hostname oder IP-Adresse
/// Wird zur Build-Zeit aus der Environment Variable MQTT_BROKER geladen
pub const MQTT_BROKER: &str = env!(
    "MQTT_BROKER",
    "MQTT Broker nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Broker Port
/// Standard: 1883 (unverschlüsselt), 8883 (TLS)
pub const MQTT_PORT: u16 = 1883;

/// MQTT Client ID
/// Eindeutige Kennung für diesen ESP32-C6
pub const MQTT_CLIENT_ID: &str = env!(
    "MQTT_CLIENT_ID",
    "MQTT Client ID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Subscribe Topic für Kommandos
/// Payload: {"type":"cmd","bitstring":"1000000000","light1":true,"light2":false}
pub const MQTT_TOPIC_COMMAND: &str = env!(
    "MQTT_TOPIC_COMMAND",
    "MQTT Topic Command nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Publish Topic für den Gerätestatus
pub const MQTT_TOPIC_STATUS: &str = env!(
    "MQTT_TOPIC_STATUS",
    "MQTT Topic Status nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Keep-Alive in Sekunden (Broker trennt nach 1.5x ohne Paket)
pub const MQTT_KEEP_ALIVE_SECS: u16 = 30;

/// Ping-Intervall, deutlich unter MQTT_KEEP_ALIVE_SECS
pub const MQTT_PING_INTERVAL_SECS: u64 = 20;

/// MQTT Reconnect Delay in Sekunden
/// Wartezeit nach Verbindungsfehler vor erneutem Versuch
pub const MQTT_RECONNECT_DELAY_SECS: u64 = 5;

/// MQTT Buffer-Größe in Bytes
pub const MQTT_BUFFER_SIZE: usize = 1024;

/// TCP Buffer-Größe für die MQTT-Verbindung in Bytes
pub const MQTT_TCP_BUFFER_SIZE: usize = 4096;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// mDNS-Konfiguration
// ============================================================================

/// mDNS Hostname (ohne .local suffix)
/// Der ESP32 wird erreichbar sein unter: <MDNS_HOSTNAME>.local
pub const MDNS_HOSTNAME: &str = "puppen";

/// mDNS TTL (Time To Live) in Sekunden
pub const MDNS_TTL_SECS: u32 = 120;

/// mDNS Reconnect Delay in Sekunden
pub const MDNS_RECONNECT_DELAY_SECS: u64 = 5;

/// mDNS Port (Standard: 5353, RFC 6762)
pub const MDNS_PORT: u16 = 5353;

/// mDNS IPv4 Multicast-Adresse (224.0.0.251)
pub const MDNS_MULTICAST_ADDR: [u8; 4] = [224, 0, 0, 251];

/// UDP Buffer-Größen für mDNS (TX, RX in Bytes)
pub const MDNS_UDP_BUFFER_SIZE: usize = 512;

/// mDNS Receive/Send Buffer-Größen in Bytes
/// 1500 Bytes = Standard MTU für Ethernet/WiFi
pub const MDNS_PACKET_BUFFER_SIZE: usize = 1500;

// ============================================================================
// HTTP Server Konfiguration
// ============================================================================

/// HTTP Port
pub const HTTP_PORT: u16 = 80;

/// Anzahl paralleler HTTP Server-Tasks
pub const HTTP_TASK_POOL_SIZE: usize = 4;

/// HTTP Buffer-Größe in Bytes
pub const HTTP_BUFFER_SIZE: usize = 1024;

/// TCP RX Buffer-Größe in Bytes
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
pub const TCP_TX_BUFFER_SIZE: usize = 1024;

/// WebSocket Message Buffer-Größe in Bytes
/// Kommando-JSON ist < 100 Bytes
pub const WEBSOCKET_BUFFER_SIZE: usize = 512;

/// JSON Serialisierungs-Buffer für alle ausgehenden Nachrichten
/// Für {"type":"status","bitstring":"...","light1":..,"light2":..,"mode":"...","uptime_ms":...}
pub const JSON_STATUS_BUFFER_SIZE: usize = 192;

// ============================================================================
// Channel-Kapazitäten
// ============================================================================

/// Queue-Tiefe für Kommandos an den Motion-Task
/// 4 HTTP-Tasks + MQTT können gleichzeitig senden
pub const COMMAND_QUEUE_DEPTH: usize = 4;

/// Maximale Status-Subscriber: 1 MQTT + bis zu 9 WebSockets
pub const STATUS_MAX_SUBSCRIBERS: usize = 10;
