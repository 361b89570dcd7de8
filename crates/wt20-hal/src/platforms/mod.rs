// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Platform implementations

#[cfg(feature = "esp32")]
pub mod esp32;

#[cfg(feature = "esp32")]
pub use esp32::{esp32_led, init_esp_logging, Esp32Led, EspNowRadio, DEFAULT_LED_PIN};
