// MQTT Task - Kommandos empfangen, Gerätestatus publishen
use defmt::{Debug2Format, error, info, warn};
use embassy_futures::select::{Either3, select3};
use embassy_net::{IpAddress, Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::{Duration, Instant, Ticker, Timer, with_timeout};

use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::packet::v5::reason_codes::ReasonCode;
use rust_mqtt::utils::rng_generator::CountingRng;
use rust_mqtt::utils::types::EncodedString;

use super::wifi::wait_for_network;
use crate::config::*;
use crate::link::CommandLink;
use crate::web::protocol::{ClientMessage, MessageType, ServerMessage, encode};
use crate::{DeviceCommand, DeviceStatus, DeviceStatusSubscriber, TransportEvent};

/// MQTT Task - läuft parallel zu anderen Tasks
///
/// - Verbindet sich mit `MQTT_BROKER` und abonniert `MQTT_TOPIC_COMMAND`
/// - Kommandos laufen über denselben `CommandLink` wie WebSocket-Kommandos
/// - Jede Statusänderung wird auf `MQTT_TOPIC_STATUS` gepublisht
/// - Automatisches Reconnect bei Fehlern
#[embassy_executor::task]
pub async fn mqtt_task(
    stack: &'static Stack<'static>,
    mut status_subscriber: DeviceStatusSubscriber,
    link: CommandLink,
) {
    info!("MQTT: Task started, waiting for network...");

    loop {
        wait_for_network(stack).await;

        match mqtt_session(stack, &mut status_subscriber, link).await {
            Ok(_) => warn!("MQTT: Connection closed normally"),
            Err(e) => error!("MQTT: Error: {}", e),
        }

        info!("MQTT: Reconnecting in {}s...", MQTT_RECONNECT_DELAY_SECS);
        Timer::after(Duration::from_secs(MQTT_RECONNECT_DELAY_SECS)).await;
    }
}

/// Eine Broker-Session: DNS, TCP, CONNECT, SUBSCRIBE, dann Event-Loop
///
/// Kehrt beim ersten Fehler zurück, der Aufrufer verbindet neu.
async fn mqtt_session(
    stack: &'static Stack<'static>,
    status_subscriber: &mut DeviceStatusSubscriber,
    link: CommandLink,
) -> Result<(), MqttError> {
    info!("MQTT: Resolving '{}'...", MQTT_BROKER);
    let broker_ip = resolve_hostname(stack, MQTT_BROKER).await?;
    info!("MQTT: Resolved to {}", Debug2Format(&broker_ip));

    let mut rx_buffer = [0u8; MQTT_TCP_BUFFER_SIZE];
    let mut tx_buffer = [0u8; MQTT_TCP_BUFFER_SIZE];
    let mut socket = TcpSocket::new(*stack, &mut rx_buffer, &mut tx_buffer);
    // Länger als das Ping-Intervall, sonst schließt der Timeout die ruhige Verbindung
    socket.set_timeout(Some(Duration::from_secs(u64::from(MQTT_KEEP_ALIVE_SECS) * 2)));

    socket
        .connect((broker_ip, MQTT_PORT))
        .await
        .map_err(|_| MqttError::ConnectionFailed)?;
    info!("MQTT: TCP connected");

    let mut config = ClientConfig::<5, _>::new(MqttVersion::MQTTv5, CountingRng(20000));
    config.client_id = EncodedString {
        string: MQTT_CLIENT_ID,
        len: MQTT_CLIENT_ID.len() as u16,
    };
    config.keep_alive = MQTT_KEEP_ALIVE_SECS;
    config.max_packet_size = MQTT_BUFFER_SIZE as u32;

    let mut send_buffer = [0u8; MQTT_BUFFER_SIZE];
    let mut recv_buffer = [0u8; MQTT_BUFFER_SIZE];

    let mut client: Client<'_> = MqttClient::new(
        socket,
        &mut send_buffer,
        MQTT_BUFFER_SIZE,
        &mut recv_buffer,
        MQTT_BUFFER_SIZE,
        config,
    );

    client
        .connect_to_broker()
        .await
        .map_err(MqttError::Protocol)?;
    client
        .subscribe_to_topic(MQTT_TOPIC_COMMAND)
        .await
        .map_err(MqttError::SubscribeFailed)?;
    info!("MQTT: Connected, subscribed to '{}'", MQTT_TOPIC_COMMAND);

    link.submit("MQTT", TransportEvent::Connected).await;
    let result = session_loop(&mut client, status_subscriber, link).await;
    if result.is_err() {
        link.submit("MQTT", TransportEvent::Error).await;
    }
    link.submit("MQTT", TransportEvent::Disconnected).await;
    result
}

/// Event-Loop einer verbundenen Session: Kommandos, Status, Pings
async fn session_loop(
    client: &mut Client<'_>,
    status_subscriber: &mut DeviceStatusSubscriber,
    link: CommandLink,
) -> Result<(), MqttError> {
    // Broker-Sicht sofort aktualisieren, nicht erst bei der nächsten Änderung
    publish_status(client, &link.status()).await?;

    let mut ping = Ticker::every(Duration::from_secs(MQTT_PING_INTERVAL_SECS));

    loop {
        // receive_message() wird abgebrochen, sobald Status oder Ping gewinnt.
        // Sicher ist das nur, solange noch kein Byte des Pakets gelesen ist:
        // ein Paket, das über mehrere TCP-Segmente ankommt, kann halb gelesen
        // verworfen werden. Der Stream ist dann aus dem Takt, das nächste
        // Dekodieren schlägt in der Regel fehl und mqtt_task verbindet neu.
        let event = select3(
            client.receive_message(),
            status_subscriber.next_message_pure(),
            ping.next(),
        )
        .await;

        match event {
            Either3::First(Ok((topic, payload))) => {
                if topic == MQTT_TOPIC_COMMAND {
                    handle_command(link, payload).await;
                }
            }
            Either3::First(Err(code)) => return Err(MqttError::ReceiveFailed(code)),
            Either3::Second(status) => publish_status(client, &status).await?,
            Either3::Third(()) => client.send_ping().await.map_err(MqttError::PingFailed)?,
        }
    }
}

async fn handle_command(link: CommandLink, payload: &[u8]) {
    let message = match serde_json_core::from_slice::<ClientMessage>(payload) {
        Ok((message, _)) => message,
        Err(_) => {
            warn!("MQTT: JSON parse error ({} bytes)", payload.len());
            return;
        }
    };

    match message.msg_type {
        MessageType::Cmd => {
            // Ablehnungen loggt der Link, MQTT hat keinen Antwortkanal
            let event = TransportEvent::Message(message.record());
            link.submit("MQTT", event).await;
        }
        MessageType::ToggleMode => {
            let _ = link.send("MQTT", DeviceCommand::ToggleMode).await;
        }
        MessageType::StopAll => {
            let _ = link.send("MQTT", DeviceCommand::StopAll).await;
        }
    }
}

type Client<'a> = MqttClient<'a, TcpSocket<'a>, 5, CountingRng>;

/// Status als retained Message, neue Subscriber sehen sofort den letzten Stand
async fn publish_status(client: &mut Client<'_>, status: &DeviceStatus) -> Result<(), MqttError> {
    let bits = status.active.to_bits();
    let message = ServerMessage::status(status, bits.as_str(), Instant::now().as_millis());
    let mut json_buffer = [0u8; JSON_STATUS_BUFFER_SIZE];
    let json = encode(&message, &mut json_buffer).ok_or(MqttError::EncodeFailed)?;

    client
        .send_message(
            MQTT_TOPIC_STATUS,
            json.as_bytes(),
            QualityOfService::QoS0,
            true,
        )
        .await
        .map_err(MqttError::PublishFailed)?;

    info!("MQTT: Published status {}", status);
    Ok(())
}

async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<embassy_net::Ipv4Address, MqttError> {
    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => {
            for addr in addrs {
                if let IpAddress::Ipv4(ipv4) = addr {
                    return Ok(ipv4);
                }
            }
            Err(MqttError::DnsResolutionFailed)
        }
        Ok(Err(_)) => Err(MqttError::DnsResolutionFailed),
        Err(_) => Err(MqttError::DnsTimeout),
    }
}

#[derive(Debug)]
enum MqttError {
    DnsResolutionFailed,
    DnsTimeout,
    ConnectionFailed,
    Protocol(ReasonCode),
    SubscribeFailed(ReasonCode),
    ReceiveFailed(ReasonCode),
    PublishFailed(ReasonCode),
    PingFailed(ReasonCode),
    EncodeFailed,
}

impl defmt::Format for MqttError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MqttError::DnsResolutionFailed => defmt::write!(fmt, "DNS failed"),
            MqttError::DnsTimeout => defmt::write!(fmt, "DNS timeout"),
            MqttError::ConnectionFailed => defmt::write!(fmt, "Connection failed"),
            MqttError::Protocol(code) => {
                defmt::write!(fmt, "Protocol error: {}", Debug2Format(code))
            }
            MqttError::SubscribeFailed(code) => {
                defmt::write!(fmt, "Subscribe failed: {}", Debug2Format(code))
            }
            MqttError::ReceiveFailed(code) => {
                defmt::write!(fmt, "Receive failed: {}", Debug2Format(code))
            }
            MqttError::PublishFailed(code) => {
                defmt::write!(fmt, "Publish failed: {}", Debug2Format(code))
            }
            MqttError::PingFailed(code) => {
                defmt::write!(fmt, "Ping failed: {}", Debug2Format(code))
            }
            MqttError::EncodeFailed => defmt::write!(fmt, "Status JSON encode failed"),
        }
    }
}
