// Wire-Protokoll: JSON-Nachrichten für WebSocket, MQTT und HTTP-Antworten

use serde::{Deserialize, Serialize};

use crate::{CommandRecord, DeviceStatus, OperationMode, RelayId};

/// Client → Server Nachricht (WebSocket und MQTT)
///
/// `{"type":"cmd","bitstring":"1000000000","light1":true,"light2":false}`
///
/// Fehlende Lichter gelten als aus, ein fehlender Bitstring wird von der
/// Validierung als falsche Länge abgelehnt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ClientMessage<'a> {
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    #[serde(default, borrow)]
    pub bitstring: Option<&'a str>,
    #[serde(default)]
    pub light1: bool,
    #[serde(default)]
    pub light2: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Cmd,
    ToggleMode,
    StopAll,
}

impl<'a> ClientMessage<'a> {
    pub fn record(&self) -> CommandRecord<'a> {
        CommandRecord::new(self.bitstring.unwrap_or(""), self.light1, self.light2)
    }
}

/// Server → Client Nachrichten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage<'a> {
    #[serde(rename = "hello")]
    Hello { device: &'static str },
    #[serde(rename = "status")]
    Status {
        bitstring: &'a str,
        light1: bool,
        light2: bool,
        mode: OperationMode,
        uptime_ms: u64,
    },
    #[serde(rename = "error")]
    Error { message: &'static str },
}

impl<'a> ServerMessage<'a> {
    pub const HELLO: ServerMessage<'static> = ServerMessage::Hello { device: "esp32" };

    pub fn status(status: &DeviceStatus, bitstring: &'a str, uptime_ms: u64) -> Self {
        ServerMessage::Status {
            bitstring,
            light1: status.light1,
            light2: status.light2,
            mode: status.mode,
            uptime_ms,
        }
    }
}

/// Antwort auf `/setcmd/<bits>`: `{"status":"ok","cmd":"1000000000"}`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CommandReply<'a> {
    pub status: &'static str,
    pub cmd: &'a str,
}

/// Antwort auf `/togglemode`: `{"mode":1}`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModeReply {
    pub mode: u8,
}

/// Antwort auf `/light1` bzw. `/light2`: `{"light1":"on"}`
#[derive(Debug, Clone, Copy, Serialize)]
pub enum LightReply {
    #[serde(rename = "light1")]
    Light1(&'static str),
    #[serde(rename = "light2")]
    Light2(&'static str),
}

impl LightReply {
    pub fn new(relay: RelayId, on: bool) -> Self {
        let state = if on { "on" } else { "off" };
        match relay {
            RelayId::One => LightReply::Light1(state),
            RelayId::Two => LightReply::Light2(state),
        }
    }
}

/// Serialisiert in `buffer`, `None` wenn der Buffer zu klein ist
pub fn encode<'b, T: Serialize>(message: &T, buffer: &'b mut [u8]) -> Option<&'b str> {
    let len = serde_json_core::to_slice(message, buffer).ok()?;
    core::str::from_utf8(&buffer[..len]).ok()
}
