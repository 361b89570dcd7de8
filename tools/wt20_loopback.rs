// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Host-side WT20 demo over paired loopback radios.
//!
//! Runs two nodes in one process. Every round each node sends its peer a
//! `ToggleLed` and a numbered `SendPayload`, then both service their
//! mailboxes and print what they dispatched.

use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;

use anyhow::{bail, Context, Result};

use wt20::config::{self, ConfigError, Wt20Config};
use wt20::hal::MemoryPins;
use wt20::link::loopback::LoopbackRadio;
use wt20::link::RadioTransport;
use wt20::observability::{debug_flags_help, init_logging, parse_debug_flags, LoggingConfig};
use wt20::protocol::ProtocolEngine;
use wt20::{Dispatch, Node};

struct Args {
    config: Option<PathBuf>,
    rounds: Option<u32>,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: wt20_loopback [--config <path>] [--rounds <n>] [--debug-<crate>...]\n\n\
         Defaults:\n\
         - config: WT20_CONFIG_PATH, then ./wt20.toml and parents, then built-in defaults\n\
         - rounds: node.message_count\n\n{}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> Args {
    let mut parsed = Args {
        config: None,
        rounds: None,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.config = Some(PathBuf::from(v));
            }
            "--rounds" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.rounds = Some(v.parse().unwrap_or_else(|_| usage_and_exit()));
            }
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }
    parsed
}

fn load(args: &Args) -> Result<Wt20Config> {
    let config = match config::load_config(args.config.as_deref(), None) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(_)) if args.config.is_none() => {
            let mut config = Wt20Config::default();
            config::apply_environment_overrides(&mut config);
            config
        }
        Err(e) => return Err(e).context("Failed to load configuration"),
    };
    config::validate_config(&config)?;
    Ok(config)
}

fn print_dispatches<T: RadioTransport>(name: &str, node: &mut Node<T, MemoryPins>) -> Result<()> {
    for dispatch in node.service_all()? {
        match dispatch {
            Dispatch::LedToggled(level) => println!("[{name}] LED {level}"),
            Dispatch::Payload { source, text, .. } => println!("[{name}] {source}: {text}"),
            Dispatch::Ignored { source } => println!("[{name}] ignored command from {source}"),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = parse_args();
    let config = load(&args)?;

    let logging = LoggingConfig::from_parts(&config.logging.level, &config.logging.format)?;
    init_logging(&parse_debug_flags(), &logging)?;

    let known = config.node.known_addresses()?;
    if known.len() < 2 {
        bail!("node.known_devices needs two addresses, found {}", known.len());
    }
    let link = config.link.to_link_config()?;

    let radio_a = Arc::new(LoopbackRadio::new(known[0]).with_max_peers(config.link.max_peers));
    let radio_b = Arc::new(LoopbackRadio::new(known[1]).with_max_peers(config.link.max_peers));
    radio_a.link(&radio_b);
    radio_b.link(&radio_a);

    let led_pin = config.node.led_pin;
    let mut node_a = Node::new(ProtocolEngine::new(radio_a, link.clone()), MemoryPins::new(), led_pin)?;
    let mut node_b = Node::new(ProtocolEngine::new(radio_b, link), MemoryPins::new(), led_pin)?;
    node_a.start(&known)?;
    node_b.start(&known)?;

    let rounds = args.rounds.unwrap_or(config.node.message_count);
    for round in 0..rounds {
        node_a.send_round(round)?;
        node_b.send_round(round)?;
        print_dispatches("A", &mut node_a)?;
        print_dispatches("B", &mut node_b)?;
        thread::sleep(config.node.message_interval());
    }

    for (name, node) in [("A", &node_a), ("B", &node_b)] {
        let stats = node.stats();
        println!(
            "[{name}] delivered {} / failed {} / timed out {} sent; received {} / dropped {}",
            stats.gate.delivered,
            stats.gate.failed,
            stats.gate.timed_out,
            stats.mailbox.received,
            stats.mailbox.dropped
        );
    }

    node_a.stop()?;
    node_b.stop()?;
    Ok(())
}
