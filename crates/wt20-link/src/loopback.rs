// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-process radio for hosts and tests
//!
//! [`LoopbackRadio`] implements [`RadioTransport`] without hardware. Two
//! radios can be paired so that a transmission from one is delivered to the
//! other's reception callback. Send completions are reported according to a
//! [`CompletionMode`], and bring-up or shutdown failures can be injected.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::address::Address;
use crate::error::{TransportError, TransportResult};
use crate::frame::{LinkQuality, RxMetadata};
use crate::traits::{RadioTransport, ReceiveCallback, SendCompleteCallback, SendStatus};
use crate::{DEFAULT_MAX_PEERS, MAX_PAYLOAD};

/// Transmissions kept for inspection; older ones are forgotten
pub const TRANSMISSION_LOG_CAPACITY: usize = 256;

type SharedSendComplete = Arc<dyn Fn(Address, SendStatus) + Send + Sync + 'static>;
type SharedReceive = Arc<dyn Fn(RxMetadata, &[u8]) + Send + Sync + 'static>;

/// How the loopback radio reports send completions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionMode {
    /// Report success before `transmit` returns
    #[default]
    Immediate,
    /// Report success from another thread after a delay
    Deferred(Duration),
    /// Report failure before `transmit` returns
    Fail,
    /// Never report (the completion is lost)
    Never,
}

/// One datagram accepted by [`LoopbackRadio::transmit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    pub peer: Address,
    pub data: Vec<u8>,
}

#[derive(Default)]
struct Callbacks {
    send_complete: Option<SharedSendComplete>,
    receive: Option<SharedReceive>,
}

struct RadioState {
    started: bool,
    peers: Vec<Address>,
    sent: VecDeque<Transmission>,
    mode: CompletionMode,
    fail_bring_up: bool,
    fail_shutdown: bool,
}

/// Hardware-free radio
pub struct LoopbackRadio {
    local: Address,
    max_peers: usize,
    state: Mutex<RadioState>,
    callbacks: Mutex<Callbacks>,
    partner: Mutex<Weak<LoopbackRadio>>,
}

impl LoopbackRadio {
    pub fn new(local: Address) -> Self {
        Self {
            local,
            max_peers: DEFAULT_MAX_PEERS,
            state: Mutex::new(RadioState {
                started: false,
                peers: Vec::new(),
                sent: VecDeque::new(),
                mode: CompletionMode::default(),
                fail_bring_up: false,
                fail_shutdown: false,
            }),
            callbacks: Mutex::new(Callbacks::default()),
            partner: Mutex::new(Weak::new()),
        }
    }

    /// Limit the peer table size
    pub fn with_max_peers(mut self, max_peers: usize) -> Self {
        self.max_peers = max_peers;
        self
    }

    /// Two radios delivering to each other
    pub fn pair(a: Address, b: Address) -> (Arc<Self>, Arc<Self>) {
        let first = Arc::new(Self::new(a));
        let second = Arc::new(Self::new(b));
        first.link(&second);
        second.link(&first);
        (first, second)
    }

    /// Deliver transmissions addressed to `other` (or broadcast) to it
    pub fn link(&self, other: &Arc<LoopbackRadio>) {
        *self.partner.lock() = Arc::downgrade(other);
    }

    pub fn set_completion_mode(&self, mode: CompletionMode) {
        self.state.lock().mode = mode;
    }

    pub fn fail_bring_up(&self, fail: bool) {
        self.state.lock().fail_bring_up = fail;
    }

    pub fn fail_shutdown(&self, fail: bool) {
        self.state.lock().fail_shutdown = fail;
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().started
    }

    pub fn has_callbacks(&self) -> bool {
        let callbacks = self.callbacks.lock();
        callbacks.send_complete.is_some() || callbacks.receive.is_some()
    }

    pub fn peers(&self) -> Vec<Address> {
        self.state.lock().peers.clone()
    }

    /// Most recent accepted datagrams (up to [`TRANSMISSION_LOG_CAPACITY`]), oldest first
    pub fn transmissions(&self) -> Vec<Transmission> {
        self.state.lock().sent.iter().cloned().collect()
    }

    /// Drain the transmission log
    pub fn take_transmissions(&self) -> Vec<Transmission> {
        self.state.lock().sent.drain(..).collect()
    }

    /// Simulate a datagram from `source` addressed to this radio
    ///
    /// Returns whether a reception callback consumed it.
    pub fn inject(&self, source: Address, data: &[u8]) -> bool {
        self.deliver(RxMetadata::new(source, self.local), data)
    }

    fn deliver(&self, meta: RxMetadata, data: &[u8]) -> bool {
        if !self.is_started() {
            return false;
        }
        let receive = self.callbacks.lock().receive.clone();
        match receive {
            Some(callback) => {
                let meta = meta.with_quality(LinkQuality {
                    rssi_dbm: Some(-40),
                    channel: Some(1),
                    timestamp_us: None,
                });
                callback(meta, data);
                true
            }
            None => {
                trace!("[LOOPBACK] {} has no receive callback, dropping datagram", self.local);
                false
            }
        }
    }

    fn report(&self, peer: Address, mode: CompletionMode) {
        let send_complete = self.callbacks.lock().send_complete.clone();
        let Some(callback) = send_complete else {
            return;
        };
        match mode {
            CompletionMode::Immediate => callback(peer, SendStatus::Success),
            CompletionMode::Fail => callback(peer, SendStatus::Fail),
            CompletionMode::Deferred(delay) => {
                thread::spawn(move || {
                    thread::sleep(delay);
                    callback(peer, SendStatus::Success);
                });
            }
            CompletionMode::Never => {}
        }
    }
}

impl RadioTransport for LoopbackRadio {
    fn bring_up(&self) -> TransportResult<()> {
        let mut state = self.state.lock();
        if state.fail_bring_up {
            return Err(TransportError::BringUpFailed(
                "injected bring-up failure".to_string(),
            ));
        }
        state.started = true;
        debug!("[LOOPBACK] {} up", self.local);
        Ok(())
    }

    fn local_address(&self) -> TransportResult<Address> {
        if self.is_started() {
            Ok(self.local)
        } else {
            Err(TransportError::NotStarted)
        }
    }

    fn on_send_complete(&self, callback: SendCompleteCallback) -> TransportResult<()> {
        self.callbacks.lock().send_complete = Some(Arc::from(callback));
        Ok(())
    }

    fn on_receive(&self, callback: ReceiveCallback) -> TransportResult<()> {
        self.callbacks.lock().receive = Some(Arc::from(callback));
        Ok(())
    }

    fn clear_callbacks(&self) -> TransportResult<()> {
        *self.callbacks.lock() = Callbacks::default();
        Ok(())
    }

    fn add_peer(&self, peer: Address) -> TransportResult<()> {
        let mut state = self.state.lock();
        if !state.started {
            return Err(TransportError::NotStarted);
        }
        if state.peers.contains(&peer) {
            return Err(TransportError::PeerExists(peer));
        }
        if state.peers.len() >= self.max_peers {
            return Err(TransportError::PeerTableFull {
                capacity: self.max_peers,
            });
        }
        state.peers.push(peer);
        Ok(())
    }

    fn transmit(&self, peer: Address, data: &[u8]) -> TransportResult<()> {
        let mode = {
            let mut state = self.state.lock();
            if !state.started {
                return Err(TransportError::NotStarted);
            }
            if !peer.is_broadcast() && !state.peers.contains(&peer) {
                return Err(TransportError::UnknownPeer(peer));
            }
            if data.len() > MAX_PAYLOAD {
                return Err(TransportError::TransmitRejected(format!(
                    "{} bytes exceeds {}",
                    data.len(),
                    MAX_PAYLOAD
                )));
            }
            if state.sent.len() == TRANSMISSION_LOG_CAPACITY {
                state.sent.pop_front();
            }
            state.sent.push_back(Transmission {
                peer,
                data: data.to_vec(),
            });
            state.mode
        };

        let partner = self.partner.lock().upgrade();
        if let Some(partner) = partner {
            if peer.is_broadcast() || peer == partner.local {
                partner.deliver(RxMetadata::new(self.local, peer), data);
            }
        }

        self.report(peer, mode);
        Ok(())
    }

    fn shutdown(&self) -> TransportResult<()> {
        let mut state = self.state.lock();
        if state.fail_shutdown {
            return Err(TransportError::ShutdownFailed(
                "injected shutdown failure".to_string(),
            ));
        }
        state.started = false;
        state.peers.clear();
        debug!("[LOOPBACK] {} down", self.local);
        Ok(())
    }

    fn transport_type(&self) -> &str {
        "loopback"
    }
}
