// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # wt20-hal
//!
//! Hardware abstraction for WT20 devices: digital outputs driven by decoded
//! commands and, on ESP32, the ESP-NOW radio behind
//! [`wt20_link::RadioTransport`].
//!
//! ## Feature Flags
//!
//! - `embedded`: [`gpio::EmbeddedOutput`] over any embedded-hal 1.0 output pin
//! - `esp32` / `esp32-s3` / `esp32-c3`: `EspNowRadio` and the LED pin

pub mod gpio;
pub mod platforms;

pub use gpio::{DigitalOutput, MemoryPins, PinDirection, PinError, PinLevel};

#[cfg(feature = "embedded")]
pub use gpio::EmbeddedOutput;

#[cfg(feature = "esp32")]
pub use platforms::esp32::{esp32_led, init_esp_logging, Esp32Led, EspNowRadio, DEFAULT_LED_PIN};
