// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Command dispatch node
//!
//! A [`Node`] is one WT20 device: a protocol engine plus the LED that
//! `ToggleLed` drives. It is serviced from a single loop that alternates
//! [`Node::send_round`] and [`Node::service_all`].

use tracing::{debug, info, warn};

use wt20_hal::{DigitalOutput, PinError, PinLevel};
use wt20_link::{Address, LinkStats, RadioTransport};
use wt20_protocol::{Command, EngineState, Message, ProtocolEngine, ProtocolError};

/// Errors raised by a node
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("LED output failed: {0}")]
    Pin(#[from] PinError),

    /// None of the known devices is a peer of this one
    #[error("no peer among the known devices")]
    NoPeer,
}

pub type NodeResult<T> = Result<T, NodeError>;

/// What handling one message did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// LED flipped to the given level
    LedToggled(PinLevel),
    /// Payload delivered to the application
    Payload {
        source: Address,
        /// Lossy UTF-8 rendering, trailing NULs removed
        text: String,
        bytes: Vec<u8>,
    },
    /// Unknown or `None` command
    Ignored { source: Address },
}

/// First known device that is not `local`
pub fn select_peer(local: Address, known: &[Address]) -> Option<Address> {
    known.iter().copied().find(|addr| *addr != local)
}

/// Text form of a payload as senders write it (C strings included)
pub fn payload_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_string()
}

/// One WT20 device
pub struct Node<T: RadioTransport, O: DigitalOutput> {
    engine: ProtocolEngine<T>,
    led: O,
    led_pin: u32,
    peer: Option<Address>,
}

impl<T: RadioTransport, O: DigitalOutput> Node<T, O> {
    /// Wrap `engine`, configuring `led_pin` on `led` as an output
    pub fn new(engine: ProtocolEngine<T>, mut led: O, led_pin: u32) -> NodeResult<Self> {
        led.configure_output(led_pin)?;
        Ok(Self {
            engine,
            led,
            led_pin,
            peer: None,
        })
    }

    /// Initialize the engine, register every other known device and pick the peer
    pub fn start(&mut self, known: &[Address]) -> NodeResult<Address> {
        self.engine.init()?;
        let local = self.engine.device_address()?;

        for device in known.iter().filter(|addr| **addr != local) {
            self.engine.add_contact(*device)?;
        }

        let peer = select_peer(local, known).ok_or(NodeError::NoPeer)?;
        self.peer = Some(peer);
        info!("[NODE] Device {} talking to {}", local, peer);
        Ok(peer)
    }

    /// Send one demo round to the peer: a `ToggleLed` then "Hello, message {round}"
    pub fn send_round(&self, round: u32) -> NodeResult<()> {
        let peer = self.peer.ok_or(NodeError::NoPeer)?;
        self.engine.send_command(peer, Command::ToggleLed, &[])?;

        let text = format!("Hello, message {}", round);
        self.engine
            .send_command(peer, Command::SendPayload, text.as_bytes())?;
        Ok(())
    }

    /// Handle at most one received message
    pub fn service_once(&mut self) -> NodeResult<Option<Dispatch>> {
        match self.engine.poll_once()? {
            Some(message) => self.dispatch(message).map(Some),
            None => Ok(None),
        }
    }

    /// Handle every message waiting in the mailbox
    pub fn service_all(&mut self) -> NodeResult<Vec<Dispatch>> {
        let mut handled = Vec::new();
        while let Some(dispatch) = self.service_once()? {
            handled.push(dispatch);
        }
        Ok(handled)
    }

    fn dispatch(&mut self, message: Message) -> NodeResult<Dispatch> {
        match message.command {
            Command::ToggleLed => {
                let level = self.led.toggle(self.led_pin)?;
                debug!("[NODE] LED on GPIO{} now {}", self.led_pin, level);
                Ok(Dispatch::LedToggled(level))
            }
            Command::SendPayload => {
                let text = payload_text(message.payload());
                info!("[NODE] Message from {}: {}", message.source, text);
                Ok(Dispatch::Payload {
                    source: message.source,
                    text,
                    bytes: message.payload().to_vec(),
                })
            }
            Command::None => {
                warn!("[NODE] Ignoring command with no action from {}", message.source);
                Ok(Dispatch::Ignored {
                    source: message.source,
                })
            }
        }
    }

    /// Deinitialize the engine
    pub fn stop(&mut self) -> NodeResult<()> {
        self.peer = None;
        self.engine.deinit()?;
        Ok(())
    }

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn peer(&self) -> Option<Address> {
        self.peer
    }

    pub fn led(&self) -> &O {
        &self.led
    }

    pub fn engine(&self) -> &ProtocolEngine<T> {
        &self.engine
    }

    pub fn stats(&self) -> LinkStats {
        self.engine.stats()
    }
}
