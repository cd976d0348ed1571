// Task-Modul: Enthält alle Embassy Tasks
//
// Kommandos fließen über den CommandLink zum Motion Task,
// Statusänderungen per PubSubChannel zurück zu MQTT und WebSockets.

pub mod http;
pub mod mdns;
pub mod motion;
pub mod mqtt;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use http::http_server_task;
pub use mdns::mdns_responder_task;
pub use motion::motion_task;
pub use mqtt::mqtt_task;
pub use wifi::{connection_task, dhcp_task, net_task};
