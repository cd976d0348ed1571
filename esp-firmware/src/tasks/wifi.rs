// WiFi Tasks - Station-Verbindung, Netzwerk-Stack und DHCP
use defmt::{Debug2Format, error, info, warn};
use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{
    ClientConfig, ModeConfig, ScanConfig, WifiController, WifiDevice, WifiError, WifiEvent,
};

use crate::config::{
    NETWORK_POLL_MS, WIFI_PASSWORD, WIFI_RECONNECT_DELAY_SECS, WIFI_RETRY_DELAY_SECS, WIFI_SSID,
};

/// WiFi Connection Task
///
/// Startet den Station-Modus, verbindet mit `WIFI_SSID` und verbindet nach
/// jedem `StaDisconnected` neu. Servos und Relais laufen unabhängig davon
/// weiter.
#[embassy_executor::task]
pub async fn connection_task(mut controller: WifiController<'static>) {
    info!("WiFi: Starting connection task");

    loop {
        if matches!(controller.is_started(), Ok(false)) {
            if let Err(e) = start_station(&mut controller).await {
                error!("WiFi: Failed to start: {}", Debug2Format(&e));
                Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
                continue;
            }
            info!("WiFi: Started");
        }

        log_target_signal(&mut controller).await;

        info!("WiFi: Connecting to '{}'...", WIFI_SSID);
        if let Err(e) = controller.connect_async().await {
            error!("WiFi: Connection failed: {}", Debug2Format(&e));
            Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
            continue;
        }
        info!("WiFi: Connected");

        controller.wait_for_event(WifiEvent::StaDisconnected).await;
        warn!("WiFi: Disconnected from AP, will retry...");

        Timer::after(Duration::from_secs(WIFI_RECONNECT_DELAY_SECS)).await;
    }
}

async fn start_station(controller: &mut WifiController<'static>) -> Result<(), WifiError> {
    let client_config = ModeConfig::Client(
        ClientConfig::default()
            .with_ssid(WIFI_SSID.into())
            .with_password(WIFI_PASSWORD.into()),
    );
    controller.set_config(&client_config)?;
    controller.start_async().await
}

/// Scan nur fürs Log: Signalstärke des Ziel-APs
async fn log_target_signal(controller: &mut WifiController<'static>) {
    match controller.scan_with_config_async(ScanConfig::default()).await {
        Ok(ap_infos) => {
            match ap_infos.iter().find(|ap| ap.ssid.as_str() == WIFI_SSID) {
                Some(ap) => info!("WiFi: '{}' visible at {} dBm", WIFI_SSID, ap.signal_strength),
                None => warn!("WiFi: '{}' not in scan ({} APs)", WIFI_SSID, ap_infos.len()),
            }
        }
        Err(e) => warn!("WiFi: Scan failed: {}", Debug2Format(&e)),
    }
}

/// Network Task - treibt den embassy-net Stack
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// DHCP Monitor Task - loggt die Netzwerk-Konfiguration nach dem ersten Lease
#[embassy_executor::task]
pub async fn dhcp_task(stack: &'static Stack<'static>) {
    wait_for_network(stack).await;

    if let Some(config) = stack.config_v4() {
        info!("WiFi: Got IP address!");
        info!("  IP:      {}", Debug2Format(&config.address.address()));
        info!("  Gateway: {}", Debug2Format(&config.gateway));
        info!("  DNS:     {}", Debug2Format(&config.dns_servers));
        info!("  Control page: http://{}.local/", crate::config::MDNS_HOSTNAME);
    }
}

/// Wartet bis Link steht und DHCP eine IPv4-Adresse geliefert hat
pub async fn wait_for_network(stack: &'static Stack<'static>) {
    while !(stack.is_link_up() && stack.config_v4().is_some()) {
        Timer::after(Duration::from_millis(NETWORK_POLL_MS)).await;
    }
}
