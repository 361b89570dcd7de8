// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # wt20-protocol
//!
//! The WT20 command protocol on top of [`wt20_link`].
//!
//! Each radio datagram carries one command: a tag byte followed by an
//! opaque payload of up to 249 bytes. The [`ProtocolEngine`] gates every
//! operation on its `Uninitialized` / `Ready` state, encodes outbound
//! commands and decodes inbound frames into [`Message`]s.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use wt20_link::loopback::LoopbackRadio;
//! use wt20_link::{Address, LinkConfig};
//! use wt20_protocol::{Command, ProtocolEngine};
//!
//! let device: Address = "40:4c:ca:4d:df:80".parse()?;
//! let peer: Address = "40:4c:ca:4d:67:ec".parse()?;
//!
//! let engine = ProtocolEngine::new(Arc::new(LoopbackRadio::new(device)), LinkConfig::default());
//! engine.init()?;
//! engine.add_contact(peer)?;
//! engine.send_command(peer, Command::SendPayload, b"Example Text")?;
//!
//! while let Some(message) = engine.poll_once()? {
//!     println!("{} from {}", message.command, message.source);
//! }
//! engine.deinit()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod command;
pub mod engine;
pub mod error;

pub use codec::{decode, decode_frame, encode_frame, FrameBytes, Message, Payload, MAX_COMMAND_PAYLOAD};
pub use command::Command;
pub use engine::{EngineState, ProtocolEngine};
pub use error::{ProtocolError, ProtocolResult};
