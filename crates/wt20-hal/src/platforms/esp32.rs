// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! ESP32 platform implementation
//!
//! Supports ESP32, ESP32-S3, ESP32-C3 (RISC-V) variants. Wi-Fi (station
//! mode) and NVS must be brought up by the application before the radio.

use parking_lot::Mutex;

use esp_idf_hal::gpio::{AnyOutputPin, Output, Pin, PinDriver};
use esp_idf_svc::espnow::{EspNow, PeerInfo, ReceiveInfo, SendStatus as EspSendStatus};
use esp_idf_svc::sys::{self as esp_idf_sys, EspError};

use wt20_link::{
    Address, LinkQuality, RadioTransport, ReceiveCallback, RxMetadata, SendCompleteCallback,
    SendStatus, TransportError, TransportResult, DEFAULT_MAX_PEERS,
};

use crate::gpio::{DigitalOutput, EmbeddedOutput, PinError};

/// On-board LED on most ESP32 dev kits
pub const DEFAULT_LED_PIN: u32 = 2;

/// Route `log` records to the ESP log sink
///
/// With the `esp32` feature `tracing` falls back to `log`, so link and
/// protocol events land there too.
pub fn init_esp_logging() {
    esp_idf_svc::log::EspLogger::initialize_default();
}

/// LED driven through esp-idf-hal
pub type Esp32Led = EmbeddedOutput<PinDriver<'static, AnyOutputPin, Output>>;

/// Take `pin` as a push-pull output, driven low
pub fn esp32_led(pin: AnyOutputPin) -> Result<Esp32Led, PinError> {
    let number = pin.pin() as u32;
    let driver = PinDriver::output(pin).map_err(|e| PinError::Hardware(e.to_string()))?;
    let mut led = EmbeddedOutput::new(number, driver);
    led.configure_output(number)?;
    log::info!("GPIO{} configured as LED output", number);
    Ok(led)
}

/// ESP-NOW radio
pub struct EspNowRadio {
    espnow: Mutex<Option<EspNow<'static>>>,
    channel: u8,
}

impl EspNowRadio {
    /// Radio on Wi-Fi channel `channel` (0 follows the station's current channel)
    pub fn new(channel: u8) -> Self {
        Self {
            espnow: Mutex::new(None),
            channel,
        }
    }

    /// Get ESP32 chip model
    pub fn chip_model(&self) -> &'static str {
        #[cfg(feature = "esp32-s3")]
        {
            return "ESP32-S3";
        }
        #[cfg(feature = "esp32-c3")]
        {
            return "ESP32-C3";
        }
        "ESP32"
    }

    fn with_espnow<R>(
        &self,
        f: impl FnOnce(&EspNow<'static>) -> TransportResult<R>,
    ) -> TransportResult<R> {
        match self.espnow.lock().as_ref() {
            Some(espnow) => f(espnow),
            None => Err(TransportError::NotStarted),
        }
    }
}

fn esp_err(e: EspError) -> TransportError {
    TransportError::Other(e.to_string())
}

impl RadioTransport for EspNowRadio {
    fn bring_up(&self) -> TransportResult<()> {
        let mut slot = self.espnow.lock();
        if slot.is_none() {
            let espnow = EspNow::take().map_err(|e| TransportError::BringUpFailed(e.to_string()))?;
            *slot = Some(espnow);
            log::info!("ESP-NOW initialized on {}", self.chip_model());
        }
        Ok(())
    }

    fn local_address(&self) -> TransportResult<Address> {
        self.with_espnow(|_| {
            let mut mac = [0u8; 6];
            esp_idf_sys::esp!(unsafe {
                esp_idf_sys::esp_wifi_get_mac(
                    esp_idf_sys::wifi_interface_t_WIFI_IF_STA,
                    mac.as_mut_ptr(),
                )
            })
            .map_err(esp_err)?;
            Ok(Address::new(mac))
        })
    }

    fn on_send_complete(&self, callback: SendCompleteCallback) -> TransportResult<()> {
        self.with_espnow(|espnow| {
            espnow
                .register_send_cb(move |mac: &[u8], status: EspSendStatus| {
                    if let Ok(peer) = Address::try_from(mac) {
                        let status = match status {
                            EspSendStatus::SUCCESS => SendStatus::Success,
                            _ => SendStatus::Fail,
                        };
                        callback(peer, status);
                    }
                })
                .map_err(esp_err)
        })
    }

    fn on_receive(&self, callback: ReceiveCallback) -> TransportResult<()> {
        self.with_espnow(|espnow| {
            espnow
                .register_recv_cb(move |info: &ReceiveInfo, data: &[u8]| {
                    let meta = RxMetadata::new(Address::new(*info.src_addr), Address::new(*info.dst_addr))
                        .with_quality(LinkQuality::default());
                    callback(meta, data);
                })
                .map_err(esp_err)
        })
    }

    fn clear_callbacks(&self) -> TransportResult<()> {
        self.with_espnow(|espnow| {
            espnow.unregister_send_cb().map_err(esp_err)?;
            espnow.unregister_recv_cb().map_err(esp_err)
        })
    }

    fn add_peer(&self, peer: Address) -> TransportResult<()> {
        self.with_espnow(|espnow| {
            let info = PeerInfo {
                peer_addr: *peer.as_bytes(),
                channel: self.channel,
                ifidx: esp_idf_sys::wifi_interface_t_WIFI_IF_STA,
                encrypt: false,
                ..Default::default()
            };
            espnow.add_peer(info).map_err(|e| match e.code() as u32 {
                esp_idf_sys::ESP_ERR_ESPNOW_EXIST => TransportError::PeerExists(peer),
                esp_idf_sys::ESP_ERR_ESPNOW_FULL => TransportError::PeerTableFull {
                    capacity: DEFAULT_MAX_PEERS,
                },
                _ => esp_err(e),
            })
        })
    }

    fn transmit(&self, peer: Address, data: &[u8]) -> TransportResult<()> {
        self.with_espnow(|espnow| {
            espnow
                .send(*peer.as_bytes(), data)
                .map_err(|e| match e.code() as u32 {
                    esp_idf_sys::ESP_ERR_ESPNOW_NOT_FOUND => TransportError::UnknownPeer(peer),
                    _ => TransportError::TransmitRejected(e.to_string()),
                })
        })
    }

    fn shutdown(&self) -> TransportResult<()> {
        // Dropping the handle deinitializes ESP-NOW and its peer table
        if self.espnow.lock().take().is_some() {
            log::info!("ESP-NOW deinitialized");
        }
        Ok(())
    }

    fn transport_type(&self) -> &str {
        "esp-now"
    }
}
