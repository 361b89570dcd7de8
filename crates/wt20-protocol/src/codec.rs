// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! WT20 frame encoding
//!
//! ```text
//! ┌──────────┬──────────────────────────────┐
//! │ Command  │ Payload                      │
//! │ (1 byte) │ (0..=249 bytes, opaque)      │
//! └──────────┴──────────────────────────────┘
//! ```
//!
//! No length prefix, version or checksum: the payload length is the
//! datagram length minus one. Both directions are pure functions so a
//! versioned format can replace them without touching the engine.

use heapless::Vec;
use wt20_link::{Address, Frame, MAX_PAYLOAD};

use crate::command::Command;
use crate::error::{ProtocolError, ProtocolResult};

/// Largest command payload (one byte goes to the tag)
pub const MAX_COMMAND_PAYLOAD: usize = MAX_PAYLOAD - 1;

/// Encoded frame body, ready for the radio
pub type FrameBytes = Vec<u8, MAX_PAYLOAD>;

/// Decoded command payload
pub type Payload = Vec<u8, MAX_COMMAND_PAYLOAD>;

/// A decoded WT20 message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Sender, as recorded by the radio
    pub source: Address,
    pub command: Command,
    pub payload: Payload,
}

impl Message {
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Build a frame body: tag byte followed by `payload`
pub fn encode_frame(command: Command, payload: &[u8]) -> ProtocolResult<FrameBytes> {
    let too_large = || ProtocolError::PayloadTooLarge {
        size: payload.len(),
        max: MAX_COMMAND_PAYLOAD,
    };

    let mut body = FrameBytes::new();
    body.push(command.tag()).map_err(|_| too_large())?;
    body.extend_from_slice(payload).map_err(|_| too_large())?;
    Ok(body)
}

/// Split a frame body into command and payload
///
/// Unknown tags decode to [`Command::None`]; an empty body decodes to
/// `None` with no payload.
pub fn decode_frame(source: Address, body: &[u8]) -> ProtocolResult<Message> {
    let (command, payload) = match body.split_first() {
        Some((&tag, rest)) => (Command::from(tag), rest),
        None => (Command::None, &[][..]),
    };

    let payload = Payload::from_slice(payload).map_err(|_| ProtocolError::PayloadTooLarge {
        size: payload.len(),
        max: MAX_COMMAND_PAYLOAD,
    })?;

    Ok(Message {
        source,
        command,
        payload,
    })
}

/// Decode a received frame
pub fn decode(frame: &Frame) -> ProtocolResult<Message> {
    decode_frame(frame.source(), frame.data())
}
