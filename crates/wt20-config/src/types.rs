// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `wt20.toml`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use wt20_link::{Address, AddressParseError, LinkConfig, OverflowPolicy, DEFAULT_MAX_PEERS};

use crate::{ConfigError, ConfigResult};

/// Addresses of the two reference boards
pub const DEFAULT_KNOWN_DEVICES: [&str; 2] = ["40:4c:ca:4d:df:80", "40:4c:ca:4d:67:ec"];

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Wt20Config {
    pub link: LinkSection,
    pub node: NodeSection,
    pub logging: LoggingSection,
}

/// Link layer settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LinkSection {
    /// Upper bound for a confirmed send
    pub send_timeout_ms: u64,
    /// "drop_oldest" or "drop_newest"
    pub overflow_policy: String,
    /// Peer table size of the radio
    pub max_peers: usize,
}

impl Default for LinkSection {
    fn default() -> Self {
        Self {
            send_timeout_ms: 500,
            overflow_policy: OverflowPolicy::default().as_str().to_string(),
            max_peers: DEFAULT_MAX_PEERS,
        }
    }
}

impl LinkSection {
    /// Link session configuration described by this section
    pub fn to_link_config(&self) -> ConfigResult<LinkConfig> {
        let policy = self
            .overflow_policy
            .parse::<OverflowPolicy>()
            .map_err(ConfigError::InvalidValue)?;
        Ok(LinkConfig::new()
            .with_send_timeout(Duration::from_millis(self.send_timeout_ms))
            .with_overflow_policy(policy))
    }
}

/// Node (demo application) settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeSection {
    /// Devices taking part in the exchange; a node talks to the first one that is not itself
    pub known_devices: Vec<String>,
    /// GPIO driving the LED
    pub led_pin: u32,
    /// Pause between rounds
    pub message_interval_ms: u64,
    /// Rounds before the node stops
    pub message_count: u32,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            known_devices: DEFAULT_KNOWN_DEVICES.iter().map(|s| s.to_string()).collect(),
            led_pin: 2,
            message_interval_ms: 100,
            message_count: 2000,
        }
    }
}

impl NodeSection {
    pub fn known_addresses(&self) -> Result<Vec<Address>, AddressParseError> {
        self.known_devices.iter().map(|s| s.parse()).collect()
    }

    pub fn message_interval(&self) -> Duration {
        Duration::from_millis(self.message_interval_ms)
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default level for every crate ("error" .. "trace")
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_boards() {
        let config = Wt20Config::default();
        assert_eq!(config.link.send_timeout_ms, 500);
        assert_eq!(config.link.overflow_policy, "drop_oldest");
        assert_eq!(config.link.max_peers, 20);
        assert_eq!(config.node.led_pin, 2);
        assert_eq!(config.node.message_count, 2000);

        let known = config.node.known_addresses().unwrap();
        assert_eq!(known[0], Address::new([0x40, 0x4C, 0xCA, 0x4D, 0xDF, 0x80]));
        assert_eq!(known[1], Address::new([0x40, 0x4C, 0xCA, 0x4D, 0x67, 0xEC]));
    }

    #[test]
    fn test_link_config_conversion() {
        let section = LinkSection {
            send_timeout_ms: 250,
            overflow_policy: "drop_newest".to_string(),
            max_peers: 4,
        };
        let link = section.to_link_config().unwrap();
        assert_eq!(link.send_timeout, Duration::from_millis(250));
        assert_eq!(link.overflow_policy, OverflowPolicy::DropNewest);

        let bad = LinkSection {
            overflow_policy: "keep_all".to_string(),
            ..LinkSection::default()
        };
        assert!(matches!(bad.to_link_config(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_json_roundtrip_of_defaults() {
        let config = Wt20Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Wt20Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
