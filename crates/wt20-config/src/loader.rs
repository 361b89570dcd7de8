// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones winning:
//! 1. TOML file
//! 2. Environment variables
//! 3. CLI arguments

use crate::{ConfigError, ConfigResult, Wt20Config};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "wt20.toml";

/// Find the WT20 configuration file
///
/// Search order:
/// 1. `WT20_CONFIG_PATH` environment variable
/// 2. Current working directory: `./wt20.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("WT20_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by WT20_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|path| path.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "WT20 configuration file '{}' not found in any of these locations:\n{}\n\nSet WT20_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Values are not validated here; call [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<Wt20Config> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: Wt20Config = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn split_devices(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `WT20_SEND_TIMEOUT_MS` -> `link.send_timeout_ms`
/// - `WT20_OVERFLOW_POLICY` -> `link.overflow_policy`
/// - `WT20_LED_PIN` -> `node.led_pin`
/// - `WT20_KNOWN_DEVICES` -> `node.known_devices` (comma separated)
/// - `WT20_LOG_LEVEL` -> `logging.level`
///
/// Values that do not parse are ignored.
pub fn apply_environment_overrides(config: &mut Wt20Config) {
    if let Ok(value) = env::var("WT20_SEND_TIMEOUT_MS") {
        if let Ok(ms) = value.parse::<u64>() {
            config.link.send_timeout_ms = ms;
        }
    }
    if let Ok(value) = env::var("WT20_OVERFLOW_POLICY") {
        config.link.overflow_policy = value;
    }
    if let Ok(value) = env::var("WT20_LED_PIN") {
        if let Ok(pin) = value.parse::<u32>() {
            config.node.led_pin = pin;
        }
    }
    if let Ok(value) = env::var("WT20_KNOWN_DEVICES") {
        config.node.known_devices = split_devices(&value);
    }
    if let Ok(value) = env::var("WT20_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// Keys are the environment names without the prefix, lower-case
/// (e.g. `{"send_timeout_ms": "250", "log_level": "debug"}`).
pub fn apply_cli_overrides(config: &mut Wt20Config, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("send_timeout_ms") {
        if let Ok(ms) = value.parse::<u64>() {
            config.link.send_timeout_ms = ms;
        }
    }
    if let Some(value) = cli_args.get("overflow_policy") {
        config.link.overflow_policy = value.clone();
    }
    if let Some(value) = cli_args.get("led_pin") {
        if let Ok(pin) = value.parse::<u32>() {
            config.node.led_pin = pin;
        }
    }
    if let Some(value) = cli_args.get("known_devices") {
        config.node.known_devices = split_devices(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("log_format") {
        config.logging.format = value.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: [&str; 5] = [
        "WT20_SEND_TIMEOUT_MS",
        "WT20_OVERFLOW_POLICY",
        "WT20_LED_PIN",
        "WT20_KNOWN_DEVICES",
        "WT20_LOG_LEVEL",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom.toml");
        File::create(&config_path).unwrap();

        env::set_var("WT20_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("WT20_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();

        env::set_var("WT20_CONFIG_PATH", dir.path().join("nope.toml"));
        let result = find_config_file();
        env::remove_var("WT20_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_partial_config_keeps_defaults() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[link]").unwrap();
        writeln!(file, "send_timeout_ms = 750").unwrap();
        writeln!(file, "[node]").unwrap();
        writeln!(file, "led_pin = 5").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();
        assert_eq!(config.link.send_timeout_ms, 750);
        assert_eq!(config.link.overflow_policy, "drop_oldest");
        assert_eq!(config.node.led_pin, 5);
        assert_eq!(config.node.known_devices.len(), 2);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[link\nsend_timeout_ms = ").unwrap();

        assert!(matches!(
            load_config(Some(&config_path), None),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = Wt20Config::default();

        env::set_var("WT20_SEND_TIMEOUT_MS", "1200");
        env::set_var("WT20_LED_PIN", "not-a-pin");
        env::set_var("WT20_KNOWN_DEVICES", "aa:bb:cc:dd:ee:ff, 11:22:33:44:55:66");
        apply_environment_overrides(&mut config);
        clear_env();

        assert_eq!(config.link.send_timeout_ms, 1200);
        assert_eq!(config.node.led_pin, 2);
        assert_eq!(
            config.node.known_devices,
            vec!["aa:bb:cc:dd:ee:ff".to_string(), "11:22:33:44:55:66".to_string()]
        );
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[link]").unwrap();
        writeln!(file, "send_timeout_ms = 100").unwrap();
        writeln!(file, "overflow_policy = \"drop_oldest\"").unwrap();

        env::set_var("WT20_SEND_TIMEOUT_MS", "200");
        env::set_var("WT20_OVERFLOW_POLICY", "drop_newest");

        let mut cli_args = HashMap::new();
        cli_args.insert("send_timeout_ms".to_string(), "300".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();
        clear_env();

        // CLI wins for the timeout, env wins for the policy (no CLI override)
        assert_eq!(config.link.send_timeout_ms, 300);
        assert_eq!(config.link.overflow_policy, "drop_newest");
    }
}
