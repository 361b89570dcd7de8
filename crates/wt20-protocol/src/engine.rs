// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Protocol engine: the `Uninitialized` / `Ready` state machine over a link session
//!
//! ```text
//!                 init() ok
//!  Uninitialized ───────────▶ Ready
//!        ▲                      │
//!        └──────────────────────┘
//!          deinit() (always, even when teardown fails)
//! ```
//!
//! Every operation other than `init` is rejected with `NotInitialized`
//! while uninitialized, before any radio call.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};
use wt20_link::{
    Address, LinkConfig, LinkSession, LinkStats, RadioTransport, MAX_PAYLOAD,
};

use crate::codec::{self, Message};
use crate::command::Command;
use crate::error::{ProtocolError, ProtocolResult};

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Ready,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Uninitialized => f.write_str("uninitialized"),
            EngineState::Ready => f.write_str("ready"),
        }
    }
}

/// WT20 protocol engine over one radio
///
/// The engine's state is the session's open flag; there is no separate copy
/// to drift out of sync.
pub struct ProtocolEngine<T: RadioTransport> {
    session: LinkSession<T>,
}

impl<T: RadioTransport> ProtocolEngine<T> {
    pub fn new(transport: Arc<T>, config: LinkConfig) -> Self {
        Self {
            session: LinkSession::new(transport, config),
        }
    }

    /// Bring up the link: `Uninitialized -> Ready`
    pub fn init(&self) -> ProtocolResult<()> {
        if self.is_ready() {
            return Err(ProtocolError::AlreadyInitialized);
        }
        self.session.init().map_err(|e| {
            warn!("[PROTOCOL] Initialization failed: {}", e);
            ProtocolError::InitializationFailed(e)
        })?;
        info!("[PROTOCOL] Ready");
        Ok(())
    }

    /// Tear down the link: `Ready -> Uninitialized`
    ///
    /// The engine is uninitialized afterwards even when this returns
    /// `DeinitFailed`.
    pub fn deinit(&self) -> ProtocolResult<()> {
        if !self.is_ready() {
            return Err(ProtocolError::NotInitialized);
        }
        let result = self.session.close().map_err(ProtocolError::DeinitFailed);
        info!("[PROTOCOL] Uninitialized");
        result
    }

    pub fn state(&self) -> EngineState {
        if self.session.is_open() {
            EngineState::Ready
        } else {
            EngineState::Uninitialized
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == EngineState::Ready
    }

    /// Send `command` with `payload` to `peer` and wait for the radio's confirmation
    pub fn send_command(&self, peer: Address, command: Command, payload: &[u8]) -> ProtocolResult<()> {
        self.ensure_ready()?;

        let max = self.max_command_payload();
        if payload.len() > max {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload.len(),
                max,
            });
        }

        let body = codec::encode_frame(command, payload)?;
        self.session.write(peer, &body)?;
        info!(
            "[PROTOCOL] Sent {} ({} payload bytes) to {}",
            command,
            payload.len(),
            peer
        );
        Ok(())
    }

    /// Decode the next received message, if any
    ///
    /// Never blocks. An empty mailbox is `Ok(None)`.
    pub fn poll_once(&self) -> ProtocolResult<Option<Message>> {
        self.ensure_ready()?;
        let Some(frame) = self.session.read()? else {
            return Ok(None);
        };

        let message = codec::decode(&frame)?;
        debug!(
            "[PROTOCOL] Received {} ({} payload bytes) from {}",
            message.command,
            message.payload.len(),
            message.source
        );
        Ok(Some(message))
    }

    /// Whether `poll_once` would return a message
    pub fn messages_available(&self) -> bool {
        self.session.messages_available()
    }

    /// Register `peer` as a send destination
    pub fn add_contact(&self, peer: Address) -> ProtocolResult<()> {
        self.ensure_ready()?;
        self.session.register_peer(peer)?;
        Ok(())
    }

    /// This device's hardware address
    pub fn device_address(&self) -> ProtocolResult<Address> {
        self.ensure_ready()?;
        Ok(self.session.local_address()?)
    }

    /// Largest payload `send_command` accepts on this radio
    pub fn max_command_payload(&self) -> usize {
        self.session
            .transport()
            .max_payload()
            .min(MAX_PAYLOAD)
            .saturating_sub(1)
    }

    pub fn stats(&self) -> LinkStats {
        self.session.stats()
    }

    pub fn session(&self) -> &LinkSession<T> {
        &self.session
    }

    fn ensure_ready(&self) -> ProtocolResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(ProtocolError::NotInitialized)
        }
    }
}
