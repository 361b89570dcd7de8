// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # WT20 - command messaging between radio-connected devices
//!
//! WT20 lets two devices exchange small command messages over a
//! connectionless point-to-point radio (ESP-NOW on ESP32 boards). This crate
//! re-exports the workspace members and adds the command dispatch [`Node`].
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! wt20 = "0.1"                                       # hosts: loopback radio
//! wt20 = { version = "0.1", features = ["esp32"] }   # ESP32 boards
//! ```
//!
//! ```rust
//! use std::sync::Arc;
//! use wt20::prelude::*;
//! use wt20::link::loopback::LoopbackRadio;
//!
//! let a: Address = "40:4c:ca:4d:df:80".parse()?;
//! let b: Address = "40:4c:ca:4d:67:ec".parse()?;
//! let (radio_a, radio_b) = LoopbackRadio::pair(a, b);
//!
//! let mut node_a = Node::new(ProtocolEngine::new(radio_a, LinkConfig::default()), MemoryPins::new(), 2)?;
//! let mut node_b = Node::new(ProtocolEngine::new(radio_b, LinkConfig::default()), MemoryPins::new(), 2)?;
//! node_a.start(&[a, b])?;
//! node_b.start(&[a, b])?;
//!
//! node_a.send_round(0)?;
//! for dispatch in node_b.service_all()? {
//!     println!("{:?}", dispatch);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application: Node (dispatch ToggleLed / SendPayload)   │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Protocol: wt20-protocol                                │
//! │  (command framing, Uninitialized/Ready state machine)   │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Link: wt20-link                                        │
//! │  (mailbox, transmit gate, session)                      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Radio: wt20-hal (ESP-NOW) or the loopback radio        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub mod node;

pub use wt20_config as config;
pub use wt20_hal as hal;
pub use wt20_link as link;
pub use wt20_observability as observability;
pub use wt20_protocol as protocol;

pub use node::{payload_text, select_peer, Dispatch, Node, NodeError, NodeResult};

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::node::{Dispatch, Node, NodeError};
    pub use wt20_hal::{DigitalOutput, MemoryPins, PinLevel};
    pub use wt20_link::{Address, LinkConfig, OverflowPolicy, RadioTransport};
    pub use wt20_protocol::{Command, EngineState, Message, ProtocolEngine, ProtocolError};
}
