// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Collects every problem in one pass so a bad file is fixed in one edit.

use wt20_link::{Address, OverflowPolicy};

use crate::{ConfigError, ConfigResult, Wt20Config};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigValidationError {
    ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &Wt20Config) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");
    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Every validation problem in `config`
pub fn collect_errors(config: &Wt20Config) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_link(config, &mut errors);
    validate_node(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn validate_link(config: &Wt20Config, errors: &mut Vec<ConfigValidationError>) {
    if config.link.send_timeout_ms == 0 {
        errors.push(invalid("link.send_timeout_ms", "must be greater than 0"));
    }
    if let Err(reason) = config.link.overflow_policy.parse::<OverflowPolicy>() {
        errors.push(invalid("link.overflow_policy", reason));
    }
    if config.link.max_peers == 0 {
        errors.push(invalid("link.max_peers", "must be greater than 0"));
    }
}

fn validate_node(config: &Wt20Config, errors: &mut Vec<ConfigValidationError>) {
    if config.node.known_devices.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "node.known_devices".to_string(),
        });
    }
    for (i, device) in config.node.known_devices.iter().enumerate() {
        if let Err(e) = device.parse::<Address>() {
            errors.push(invalid(&format!("node.known_devices[{}]", i), e.to_string()));
        }
    }
    if config.node.known_devices.len() > config.link.max_peers {
        errors.push(invalid(
            "node.known_devices",
            format!(
                "{} devices exceed the peer table ({})",
                config.node.known_devices.len(),
                config.link.max_peers
            ),
        ));
    }
}

fn validate_logging(config: &Wt20Config, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(invalid(
            "logging.level",
            format!("'{}' is not one of {:?}", config.logging.level, LOG_LEVELS),
        ));
    }
    let format = config.logging.format.to_lowercase();
    if !LOG_FORMATS.contains(&format.as_str()) {
        errors.push(invalid(
            "logging.format",
            format!("'{}' is not one of {:?}", config.logging.format, LOG_FORMATS),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Wt20Config::default()).is_ok());
    }

    #[test]
    fn test_link_problems() {
        let mut config = Wt20Config::default();
        config.link.send_timeout_ms = 0;
        config.link.overflow_policy = "drop_random".to_string();
        config.link.max_peers = 0;

        let errors = collect_errors(&config);
        let fields: Vec<String> = errors
            .iter()
            .filter_map(|e| match e {
                ConfigValidationError::InvalidValue { field, .. } => Some(field.clone()),
                _ => None,
            })
            .collect();
        assert!(fields.contains(&"link.send_timeout_ms".to_string()));
        assert!(fields.contains(&"link.overflow_policy".to_string()));
        assert!(fields.contains(&"link.max_peers".to_string()));
    }

    #[test]
    fn test_malformed_mac_is_reported_with_index() {
        let mut config = Wt20Config::default();
        config.node.known_devices.push("40:4c:ca:zz:00:01".to_string());

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("node.known_devices[2]"));
    }

    #[test]
    fn test_empty_device_list_is_missing() {
        let mut config = Wt20Config::default();
        config.node.known_devices.clear();
        assert_eq!(
            collect_errors(&config),
            vec![ConfigValidationError::MissingRequired {
                field: "node.known_devices".to_string()
            }]
        );
    }

    #[test]
    fn test_logging_values() {
        let mut config = Wt20Config::default();
        config.logging.level = "DEBUG".to_string();
        config.logging.format = "json".to_string();
        assert!(validate_config(&config).is_ok());

        config.logging.format = "xml".to_string();
        assert!(validate_config(&config).is_err());
    }
}
