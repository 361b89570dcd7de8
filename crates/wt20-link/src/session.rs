// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Link session: device identity, peer registration and the mailbox/gate pair
//!
//! A [`LinkSession`] is the explicit handle that replaces process-wide link
//! state. It wires the radio's callbacks into its own [`Mailbox`] and
//! [`TransmitGate`] on `init` and removes them on `close`. Several sessions
//! over different radios can coexist in one process.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::address::Address;
use crate::config::LinkConfig;
use crate::error::{LinkError, LinkResult, TransportError};
use crate::frame::Frame;
use crate::gate::{GateStats, TransmitGate};
use crate::mailbox::{Mailbox, MailboxStats};
use crate::traits::RadioTransport;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    /// Radio up, callbacks registered; `local` captured at `init`
    Open { local: Address },
}

/// Combined link counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkStats {
    pub mailbox: MailboxStats,
    pub gate: GateStats,
}

/// Session over one radio transport
pub struct LinkSession<T: RadioTransport> {
    transport: Arc<T>,
    config: LinkConfig,
    mailbox: Arc<Mailbox>,
    gate: Arc<TransmitGate>,
    state: RwLock<SessionState>,
    /// Serializes writers; the gate holds one frame in flight
    writer: Mutex<()>,
}

impl<T: RadioTransport> LinkSession<T> {
    /// Create a closed session; call [`init`](Self::init) before use
    pub fn new(transport: Arc<T>, config: LinkConfig) -> Self {
        let mailbox = Arc::new(Mailbox::new(config.overflow_policy));
        Self {
            transport,
            config,
            mailbox,
            gate: Arc::new(TransmitGate::new()),
            state: RwLock::new(SessionState::Closed),
            writer: Mutex::new(()),
        }
    }

    /// Bring up the radio, capture the local address and register callbacks
    ///
    /// # Errors
    /// - `AlreadyOpen` if the session is open
    /// - `Transport` if bring-up or callback registration fails; the radio
    ///   is shut down again and the session stays closed
    pub fn init(&self) -> LinkResult<()> {
        let mut state = self.state.write();
        if let SessionState::Open { .. } = *state {
            return Err(LinkError::AlreadyOpen);
        }

        self.transport.bring_up()?;

        let local = match self.register_with_radio() {
            Ok(local) => local,
            Err(e) => {
                if let Err(shutdown_err) = self.transport.shutdown() {
                    warn!(
                        "[LINK] Shutdown after failed init also failed: {}",
                        shutdown_err
                    );
                }
                return Err(e.into());
            }
        };

        self.gate.reopen();
        *state = SessionState::Open { local };
        info!(
            "[LINK] Session open on {} (device {}, send timeout {:?}, overflow {})",
            self.transport.transport_type(),
            local,
            self.config.send_timeout,
            self.config.overflow_policy
        );
        Ok(())
    }

    fn register_with_radio(&self) -> Result<Address, TransportError> {
        let local = self.transport.local_address()?;

        let discarded = self.mailbox.clear();
        if discarded > 0 {
            debug!("[LINK] Discarded {} frames left from a previous session", discarded);
        }

        let gate = Arc::clone(&self.gate);
        self.transport
            .on_send_complete(Box::new(move |peer, status| gate.complete(peer, status)))?;

        let mailbox = Arc::clone(&self.mailbox);
        self.transport.on_receive(Box::new(move |meta, data| {
            match Frame::new(meta, data) {
                Ok(frame) => {
                    mailbox.enqueue(frame);
                }
                Err(e) => {
                    mailbox.record_drop();
                    warn!("[LINK] Dropped datagram from {}: {}", meta.source, e);
                }
            }
        }))?;

        Ok(local)
    }

    /// Add `peer` to the radio's peer table
    ///
    /// Registering a peer twice is not an error.
    pub fn register_peer(&self, peer: Address) -> LinkResult<()> {
        self.ensure_open()?;
        match self.transport.add_peer(peer) {
            Ok(()) => {
                info!("[LINK] Registered peer {}", peer);
                Ok(())
            }
            Err(TransportError::PeerExists(_)) => {
                debug!("[LINK] Peer {} already registered", peer);
                Ok(())
            }
            Err(e) => Err(LinkError::from_registration(e)),
        }
    }

    /// Send one datagram and wait for the radio's confirmation
    ///
    /// Blocks for at most the configured send timeout. Must not be called
    /// from a radio callback.
    pub fn write(&self, peer: Address, data: &[u8]) -> LinkResult<()> {
        self.ensure_open()?;
        let _writer = self.writer.lock();
        // The session may have closed while queued behind another writer
        self.ensure_open()?;

        debug!("[LINK] Writing {} bytes to {}", data.len(), peer);
        self.gate
            .send_and_wait(&*self.transport, peer, data, self.config.send_timeout)
    }

    /// Oldest received frame, or `None` when nothing is waiting
    pub fn read(&self) -> LinkResult<Option<Frame>> {
        self.ensure_open()?;
        Ok(self.mailbox.dequeue())
    }

    /// Whether `read` would return a frame
    pub fn messages_available(&self) -> bool {
        self.is_open() && self.mailbox.available()
    }

    /// Own hardware address, as captured by `init`
    pub fn local_address(&self) -> LinkResult<Address> {
        match *self.state.read() {
            SessionState::Open { local } => Ok(local),
            SessionState::Closed => Err(LinkError::NotReady),
        }
    }

    /// Mark the session closed, release any blocked writer, then tear down the radio
    ///
    /// The session is closed afterwards even if teardown fails; the
    /// teardown error is returned.
    pub fn close(&self) -> LinkResult<()> {
        let previous = std::mem::replace(&mut *self.state.write(), SessionState::Closed);
        if previous == SessionState::Closed {
            return Err(LinkError::NotReady);
        }

        self.gate.cancel();

        let callbacks = self.transport.clear_callbacks();
        let shutdown = self.transport.shutdown();
        let discarded = self.mailbox.clear();

        info!(
            "[LINK] Session closed on {} ({} unread frames discarded)",
            self.transport.transport_type(),
            discarded
        );

        match (callbacks, shutdown) {
            (Err(e), _) | (Ok(()), Err(e)) => {
                warn!("[LINK] Radio teardown failed: {}", e);
                Err(e.into())
            }
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.state.read(), SessionState::Open { .. })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn stats(&self) -> LinkStats {
        LinkStats {
            mailbox: self.mailbox.stats(),
            gate: self.gate.stats(),
        }
    }

    fn ensure_open(&self) -> LinkResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(LinkError::NotReady)
        }
    }
}

impl<T: RadioTransport> Drop for LinkSession<T> {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(e) = self.close() {
                warn!("[LINK] Close on drop failed: {}", e);
            }
        }
    }
}
