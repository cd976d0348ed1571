// HTTP Server Task - Steuerseite, REST-Endpunkte und WebSocket
use alloc::string::String;
use core::future::pending;
use core::str::FromStr;

use defmt::{info, warn};
use embassy_futures::select::{Either, select};
use embassy_net::Stack;
use embassy_time::{Duration, Instant};
use picoserve::ResponseSent;
use picoserve::io::embedded_io_async;
use picoserve::response::{
    Connection, IntoResponse, Response, ResponseWriter, StatusCode, WebSocketUpgrade, ws,
};
use picoserve::routing::{get, parse_path_segment};
use serde::Serialize;

use crate::config::*;
use crate::link::CommandLink;
use crate::web::INDEX_HTML;
use crate::web::protocol::{
    ClientMessage, CommandReply, LightReply, MessageType, ModeReply, ServerMessage, encode,
};
use crate::{
    DeviceCommand, DeviceStatus, DeviceStatusChannel, DeviceStatusSubscriber, RelayId,
    TransportEvent,
};

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Bitstring aus dem Pfad `/setcmd/<bits>`
///
/// Nimmt jedes Segment an, die Prüfung auf 10 × `0`/`1` passiert erst im
/// Link, damit falsche Eingaben 400 statt 404 liefern.
struct BitsParam(String);

impl FromStr for BitsParam {
    type Err = core::convert::Infallible;

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        Ok(BitsParam(String::from(segment)))
    }
}

/// Einheitliche Antwort für alle REST-Endpunkte
struct Reply {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

impl Reply {
    fn text(code: u16, body: &str) -> Self {
        Self {
            status: StatusCode::new(code),
            content_type: CONTENT_TYPE_TEXT,
            body: String::from(body),
        }
    }

    fn json<T: Serialize>(message: &T) -> Self {
        let mut buffer = [0u8; JSON_STATUS_BUFFER_SIZE];
        match encode(message, &mut buffer) {
            Some(json) => Self {
                status: StatusCode::OK,
                content_type: CONTENT_TYPE_JSON,
                body: String::from(json),
            },
            None => Self::text(500, "JSON encode error"),
        }
    }
}

impl IntoResponse for Reply {
    async fn write_to<R: embedded_io_async::Read, W: ResponseWriter<Error = R::Error>>(
        self,
        connection: Connection<'_, R>,
        response_writer: W,
    ) -> Result<ResponseSent, W::Error> {
        Response::new(self.status, self.body)
            .with_header("Content-Type", self.content_type)
            .write_to(connection, response_writer)
            .await
    }
}

/// Response-Enum für WebSocket-Endpoint
/// Ermöglicht Rückgabe von entweder WebSocket-Upgrade oder HTTP-Fehler
enum WebSocketResponse {
    Upgrade(
        ws::UpgradedWebSocket<ws::UnspecifiedProtocol, ws::CallbackNotUsingState<WebSocketHandler>>,
    ),
    ServiceUnavailable,
}

impl IntoResponse for WebSocketResponse {
    async fn write_to<R: embedded_io_async::Read, W: ResponseWriter<Error = R::Error>>(
        self,
        connection: Connection<'_, R>,
        response_writer: W,
    ) -> Result<ResponseSent, W::Error> {
        match self {
            WebSocketResponse::Upgrade(ws) => ws.write_to(connection, response_writer).await,
            WebSocketResponse::ServiceUnavailable => {
                Response::new(
                    StatusCode::new(503),
                    "Service Unavailable: Too many WebSocket connections",
                )
                .with_header("Retry-After", "5")
                .write_to(connection, response_writer)
                .await
            }
        }
    }
}

/// HTTP Server Task - läuft parallel zu anderen Tasks
///
/// Routen:
/// - `GET /` Steuerseite
/// - `GET /esp` Erreichbarkeits-Check, antwortet `yes i am`
/// - `GET /setcmd/<bits>` Kanäle setzen (200, 400 oder 409)
/// - `GET /togglemode` Manuell ↔ Sequenz
/// - `GET /light1`, `GET /light2` Relais umschalten
/// - `GET /status` aktueller Gerätezustand als JSON
/// - `/ws` WebSocket für Kommandos und Status-Push
///
/// **Task Pool:** wird `HTTP_TASK_POOL_SIZE`-mal gespawnt, jede Instanz
/// bedient eine Verbindung.
#[embassy_executor::task(pool_size = HTTP_TASK_POOL_SIZE)]
pub async fn http_server_task(
    task_id: usize,
    stack: &'static Stack<'static>,
    status_channel: &'static DeviceStatusChannel,
    link: CommandLink,
) {
    info!("HTTP: Server task {} starting on port {}...", task_id, HTTP_PORT);

    let app = picoserve::Router::new()
        .route("/", get(serve_html))
        .route("/esp", get(|| async { Reply::text(200, "yes i am") }))
        .route(
            ("/setcmd", parse_path_segment::<BitsParam>()),
            get(move |bits: BitsParam| async move { set_command(link, bits.0.as_str()).await }),
        )
        // Leerer Bitstring: 400 wie jede andere falsche Länge, nicht 404
        .route("/setcmd", get(move || set_command(link, "")))
        .route("/setcmd/", get(move || set_command(link, "")))
        .route("/togglemode", get(move || toggle_mode(link)))
        .route("/light1", get(move || toggle_light(link, RelayId::One)))
        .route("/light2", get(move || toggle_light(link, RelayId::Two)))
        .route(
            "/status",
            get(move || async move {
                let status = link.status();
                let bits = status.active.to_bits();
                Reply::json(&status_message(&status, bits.as_str()))
            }),
        )
        .route(
            "/ws",
            get(move |upgrade: WebSocketUpgrade| async move {
                // Bei mehr Clients als Subscriber-Slots: 503 statt Panic
                match status_channel.subscriber() {
                    Ok(status_subscriber) => {
                        let handler = WebSocketHandler {
                            link,
                            status_subscriber,
                        };
                        WebSocketResponse::Upgrade(upgrade.on_upgrade(handler))
                    }
                    Err(_) => {
                        warn!("HTTP: No status subscriber slot free, sending 503");
                        WebSocketResponse::ServiceUnavailable
                    }
                }
            }),
        );

    let config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(1)),
        write: Some(Duration::from_secs(1)),
        persistent_start_read_request: Some(Duration::from_secs(5)),
    })
    .keep_connection_alive();

    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    let server = picoserve::Server::new(&app, &config, &mut http_buffer);

    let _ = server
        .listen_and_serve(task_id, *stack, HTTP_PORT, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Server task {} ended", task_id);
}

async fn serve_html() -> impl IntoResponse {
    Response::new(StatusCode::OK, INDEX_HTML).with_header("Content-Type", "text/html; charset=utf-8")
}

/// `/setcmd/<bits>` - der Pfad trägt keine Lichter, die Relais bleiben unberührt
async fn set_command(link: CommandLink, bits: &str) -> Reply {
    match link.submit_channels("HTTP", bits).await {
        Ok(_) => Reply::json(&CommandReply { status: "ok", cmd: bits }),
        Err(error) => Reply::text(error.http_status(), error.message()),
    }
}

/// Antwortet mit dem Modus nach dem Umschalten
async fn toggle_mode(link: CommandLink) -> Reply {
    match link.send("HTTP", DeviceCommand::ToggleMode).await {
        Ok(gate) => Reply::json(&ModeReply {
            mode: gate.mode().number(),
        }),
        Err(error) => Reply::text(error.http_status(), error.message()),
    }
}

/// Antwortet mit dem Relais-Zustand nach dem Umschalten
async fn toggle_light(link: CommandLink, relay: RelayId) -> Reply {
    match link.send("HTTP", DeviceCommand::ToggleRelay(relay)).await {
        Ok(gate) => Reply::json(&LightReply::new(relay, gate.light(relay))),
        Err(error) => Reply::text(error.http_status(), error.message()),
    }
}

fn status_message<'a>(status: &DeviceStatus, bits: &'a str) -> ServerMessage<'a> {
    ServerMessage::status(status, bits, Instant::now().as_millis())
}

/// WebSocket-Handler State
struct WebSocketHandler {
    link: CommandLink,
    status_subscriber: DeviceStatusSubscriber,
}

impl ws::WebSocketCallback for WebSocketHandler {
    async fn run<R: embedded_io_async::Read, W: embedded_io_async::Write<Error = R::Error>>(
        mut self,
        mut rx: ws::SocketRx<R>,
        mut tx: ws::SocketTx<W>,
    ) -> Result<(), W::Error> {
        self.link.submit("WS", TransportEvent::Connected).await;

        let mut buffer = [0u8; WEBSOCKET_BUFFER_SIZE];

        Self::send(&mut tx, &ServerMessage::HELLO).await?;
        Self::send_status(&mut tx, &self.link.status()).await?;

        let close_reason = loop {
            match select(
                rx.next_message(&mut buffer, pending()),
                self.status_subscriber.next_message_pure(),
            )
            .await
            {
                Either::First(ws_result) => match ws_result?.ignore_never_b() {
                    Ok(ws::Message::Text(data)) => {
                        self.handle_text(&mut tx, data).await?;
                    }
                    Ok(ws::Message::Binary(data)) => {
                        info!("WS: Binary message ignored ({} bytes)", data.len());
                    }
                    Ok(ws::Message::Ping(data)) => {
                        tx.send_pong(data).await?;
                    }
                    Ok(ws::Message::Pong(_)) => {}
                    Ok(ws::Message::Close(_reason)) => {
                        break None;
                    }
                    Err(error) => {
                        self.link.submit("WS", TransportEvent::Error).await;
                        break Some((error.code(), "WebSocket Error"));
                    }
                },
                Either::Second(status) => {
                    Self::send_status(&mut tx, &status).await?;
                }
            }
        };

        self.link.submit("WS", TransportEvent::Disconnected).await;
        tx.close(close_reason).await
    }
}

impl WebSocketHandler {
    async fn handle_text<W: embedded_io_async::Write>(
        &self,
        tx: &mut ws::SocketTx<W>,
        data: &str,
    ) -> Result<(), W::Error> {
        let message = match serde_json_core::from_slice::<ClientMessage>(data.as_bytes()) {
            Ok((message, _)) => message,
            Err(_) => {
                warn!("WS: JSON parse error ({} bytes)", data.len());
                let error = ServerMessage::Error {
                    message: "JSON parse error",
                };
                return Self::send(tx, &error).await;
            }
        };

        match message.msg_type {
            MessageType::Cmd => {
                let event = TransportEvent::Message(message.record());
                if let Some(Err(error)) = self.link.submit("WS", event).await {
                    let reply = ServerMessage::Error {
                        message: error.message(),
                    };
                    Self::send(tx, &reply).await?;
                }
            }
            MessageType::ToggleMode => self.send_command(tx, DeviceCommand::ToggleMode).await?,
            MessageType::StopAll => self.send_command(tx, DeviceCommand::StopAll).await?,
        }
        Ok(())
    }

    async fn send_command<W: embedded_io_async::Write>(
        &self,
        tx: &mut ws::SocketTx<W>,
        command: DeviceCommand,
    ) -> Result<(), W::Error> {
        match self.link.send("WS", command).await {
            Ok(_) => Ok(()),
            Err(error) => {
                let reply = ServerMessage::Error {
                    message: error.message(),
                };
                Self::send(tx, &reply).await
            }
        }
    }

    async fn send_status<W: embedded_io_async::Write>(
        tx: &mut ws::SocketTx<W>,
        status: &DeviceStatus,
    ) -> Result<(), W::Error> {
        let bits = status.active.to_bits();
        Self::send(tx, &status_message(status, bits.as_str())).await
    }

    async fn send<W: embedded_io_async::Write, T: Serialize>(
        tx: &mut ws::SocketTx<W>,
        message: &T,
    ) -> Result<(), W::Error> {
        let mut json_buffer = [0u8; JSON_STATUS_BUFFER_SIZE];
        match encode(message, &mut json_buffer) {
            Some(json) => tx.send_text(json).await,
            None => {
                warn!("WS: Message too large for JSON buffer");
                Ok(())
            }
        }
    }
}
