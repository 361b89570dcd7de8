// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Confirmed transmission over a fire-and-forget radio
//!
//! The radio accepts a datagram immediately and reports the outcome later
//! from its own context. [`TransmitGate`] turns that into a blocking call:
//! the sender parks on a condition variable until the matching completion
//! arrives, the bound elapses, or the gate is cancelled by session teardown.
//!
//! One send is in flight at a time. The slot is re-armed at the start of
//! every send. A send that times out leaves an orphan for its peer: the
//! radio's late completion for it is absorbed there instead of confirming
//! the next send to that peer. Orphans expire one send timeout after they
//! are recorded, so a completion the radio really dropped costs at most one
//! extra `Timeout`.
//!
//! Cancellation is sticky: after [`TransmitGate::cancel`] every send fails
//! with `NotReady` before touching the radio until [`TransmitGate::reopen`].

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, warn};

use crate::address::Address;
use crate::error::{LinkError, LinkResult};
use crate::traits::{RadioTransport, SendStatus};
use crate::MAX_PAYLOAD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Idle,
    Pending { peer: Address },
    Completed { status: SendStatus },
    Cancelled,
}

/// Counters for transmit outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    pub delivered: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub cancelled: u64,
    /// Completions that matched no pending send
    pub stale_completions: u64,
}

/// Timed-out send whose completion may still arrive
#[derive(Debug, Clone, Copy)]
struct Orphan {
    peer: Address,
    expires: Instant,
}

struct GateState {
    slot: Slot,
    closed: bool,
    orphans: Vec<Orphan>,
    stats: GateStats,
}

impl GateState {
    fn purge_expired(&mut self, now: Instant) {
        self.orphans.retain(|orphan| orphan.expires > now);
    }

    /// Consume one live orphan for `peer`, if any
    fn adopt_orphan(&mut self, peer: Address) -> bool {
        self.purge_expired(Instant::now());
        match self.orphans.iter().position(|orphan| orphan.peer == peer) {
            Some(index) => {
                self.orphans.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Single-slot handoff between a blocked sender and the radio's completion callback
pub struct TransmitGate {
    state: Mutex<GateState>,
    signal: Condvar,
}

impl TransmitGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                slot: Slot::Idle,
                closed: false,
                orphans: Vec::new(),
                stats: GateStats::default(),
            }),
            signal: Condvar::new(),
        }
    }

    /// Transmit `data` to `peer` and block until the radio confirms it
    ///
    /// # Errors
    /// - `PayloadTooLarge` before any radio call if `data` does not fit
    /// - `SendFailed` if the radio rejects the frame or reports failure
    /// - `Timeout` if no completion arrives within `timeout`
    /// - `NotReady` if the gate is cancelled, before the radio is called
    ///   or while waiting
    ///
    /// Must not be called from the radio's callback context.
    pub fn send_and_wait<T>(
        &self,
        transport: &T,
        peer: Address,
        data: &[u8],
        timeout: Duration,
    ) -> LinkResult<()>
    where
        T: RadioTransport + ?Sized,
    {
        let max = transport.max_payload().min(MAX_PAYLOAD);
        if data.len() > max {
            return Err(LinkError::PayloadTooLarge {
                size: data.len(),
                max,
            });
        }

        {
            let mut state = self.state.lock();
            if state.closed {
                state.stats.cancelled += 1;
                debug!("[GATE] Gate closed, not sending to {}", peer);
                return Err(LinkError::NotReady);
            }
            state.slot = Slot::Pending { peer };
        }

        if let Err(e) = transport.transmit(peer, data) {
            let mut state = self.state.lock();
            state.slot = Slot::Idle;
            state.stats.failed += 1;
            error!("[GATE] {} rejected frame for {}: {}", transport.transport_type(), peer, e);
            return Err(LinkError::SendFailed(peer));
        }

        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            let slot = state.slot;
            match slot {
                Slot::Pending { .. } => {
                    let result = self.signal.wait_until(&mut state, deadline);
                    if result.timed_out() && matches!(state.slot, Slot::Pending { .. }) {
                        state.slot = Slot::Idle;
                        state.stats.timed_out += 1;
                        let now = Instant::now();
                        state.purge_expired(now);
                        state.orphans.push(Orphan {
                            peer,
                            expires: now + timeout,
                        });
                        warn!("[GATE] No completion from {} within {:?}", peer, timeout);
                        return Err(LinkError::Timeout {
                            peer,
                            waited: timeout,
                        });
                    }
                }
                Slot::Completed { status } => {
                    state.slot = Slot::Idle;
                    return if status.is_success() {
                        state.stats.delivered += 1;
                        debug!("[GATE] Delivered {} bytes to {}", data.len(), peer);
                        Ok(())
                    } else {
                        state.stats.failed += 1;
                        error!("[GATE] Send of {} bytes to {} failed", data.len(), peer);
                        Err(LinkError::SendFailed(peer))
                    };
                }
                Slot::Cancelled | Slot::Idle => {
                    state.slot = Slot::Idle;
                    state.stats.cancelled += 1;
                    debug!("[GATE] Send to {} cancelled", peer);
                    return Err(LinkError::NotReady);
                }
            }
        }
    }

    /// Deliver a completion (radio context)
    pub fn complete(&self, peer: Address, status: SendStatus) {
        let mut state = self.state.lock();
        if state.adopt_orphan(peer) {
            state.stats.stale_completions += 1;
            drop(state);
            debug!("[GATE] Late completion {:?} from {} for a timed-out send", status, peer);
            return;
        }
        let slot = state.slot;
        match slot {
            Slot::Pending { peer: pending } if pending == peer => {
                state.slot = Slot::Completed { status };
                drop(state);
                self.signal.notify_all();
            }
            _ => {
                state.stats.stale_completions += 1;
                drop(state);
                warn!(
                    "[GATE] Ignoring completion {:?} from {} (slot: {:?})",
                    status, peer, slot
                );
            }
        }
    }

    /// Close the gate, waking a blocked sender, which then returns `NotReady`
    ///
    /// Later sends fail with `NotReady` until [`TransmitGate::reopen`].
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        if matches!(state.slot, Slot::Pending { .. }) {
            state.slot = Slot::Cancelled;
            drop(state);
            self.signal.notify_all();
        }
    }

    /// Accept sends again, forgetting the slot and orphans of the previous session
    pub fn reopen(&self) {
        let mut state = self.state.lock();
        state.closed = false;
        state.slot = Slot::Idle;
        state.orphans.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Whether a send is waiting for its completion
    pub fn is_pending(&self) -> bool {
        matches!(self.state.lock().slot, Slot::Pending { .. })
    }

    pub fn stats(&self) -> GateStats {
        self.state.lock().stats
    }
}

impl Default for TransmitGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransportError, TransportResult};
    use crate::traits::{ReceiveCallback, SendCompleteCallback};
    use std::sync::Arc;
    use std::thread;

    const PEER: Address = Address::new([0x56, 0x78, 0x12, 0xFE, 0x4A, 0x5B]);

    /// Radio stub that hands every transmission to a closure
    struct StubRadio<F: Fn(Address, &[u8]) -> TransportResult<()> + Send + Sync> {
        on_transmit: F,
    }

    fn stub<F>(on_transmit: F) -> StubRadio<F>
    where
        F: Fn(Address, &[u8]) -> TransportResult<()> + Send + Sync,
    {
        StubRadio { on_transmit }
    }

    impl<F: Fn(Address, &[u8]) -> TransportResult<()> + Send + Sync> RadioTransport for StubRadio<F> {
        fn bring_up(&self) -> TransportResult<()> {
            Ok(())
        }
        fn local_address(&self) -> TransportResult<Address> {
            Ok(Address::default())
        }
        fn on_send_complete(&self, _callback: SendCompleteCallback) -> TransportResult<()> {
            Ok(())
        }
        fn on_receive(&self, _callback: ReceiveCallback) -> TransportResult<()> {
            Ok(())
        }
        fn clear_callbacks(&self) -> TransportResult<()> {
            Ok(())
        }
        fn add_peer(&self, _peer: Address) -> TransportResult<()> {
            Ok(())
        }
        fn transmit(&self, peer: Address, data: &[u8]) -> TransportResult<()> {
            (self.on_transmit)(peer, data)
        }
        fn shutdown(&self) -> TransportResult<()> {
            Ok(())
        }
        fn transport_type(&self) -> &str {
            "stub"
        }
    }

    #[test]
    fn test_completion_from_other_thread() {
        let gate = Arc::new(TransmitGate::new());
        let completer = Arc::clone(&gate);
        let radio = stub(move |peer, _data| {
            let completer = Arc::clone(&completer);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                completer.complete(peer, SendStatus::Success);
            });
            Ok(())
        });

        gate.send_and_wait(&radio, PEER, &[0], Duration::from_secs(2))
            .unwrap();
        assert_eq!(gate.stats().delivered, 1);
        assert!(!gate.is_pending());
    }

    #[test]
    fn test_failure_status() {
        let gate = Arc::new(TransmitGate::new());
        let completer = Arc::clone(&gate);
        let radio = stub(move |peer, _data| {
            completer.complete(peer, SendStatus::Fail);
            Ok(())
        });

        assert_eq!(
            gate.send_and_wait(&radio, PEER, &[0], Duration::from_secs(1)),
            Err(LinkError::SendFailed(PEER))
        );
        assert_eq!(gate.stats().failed, 1);
    }

    #[test]
    fn test_timeout_when_completion_dropped() {
        let gate = TransmitGate::new();
        let radio = stub(|_peer, _data| Ok(()));

        let started = Instant::now();
        let result = gate.send_and_wait(&radio, PEER, &[0], Duration::from_millis(50));
        assert_eq!(
            result,
            Err(LinkError::Timeout {
                peer: PEER,
                waited: Duration::from_millis(50)
            })
        );
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(gate.stats().timed_out, 1);
        assert!(!gate.is_pending());
    }

    #[test]
    fn test_oversized_payload_never_reaches_radio() {
        let gate = TransmitGate::new();
        let radio = stub(|_peer, _data| panic!("radio must not be called"));

        let data = [0u8; MAX_PAYLOAD + 1];
        assert_eq!(
            gate.send_and_wait(&radio, PEER, &data, Duration::from_millis(10)),
            Err(LinkError::PayloadTooLarge {
                size: MAX_PAYLOAD + 1,
                max: MAX_PAYLOAD
            })
        );
    }

    #[test]
    fn test_rejected_transmit_is_send_failure() {
        let gate = TransmitGate::new();
        let radio = stub(|peer, _data| Err(TransportError::UnknownPeer(peer)));

        assert_eq!(
            gate.send_and_wait(&radio, PEER, &[1], Duration::from_millis(10)),
            Err(LinkError::SendFailed(PEER))
        );
        assert!(!gate.is_pending());
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let gate = Arc::new(TransmitGate::new());

        // Nothing pending: counted and dropped
        gate.complete(PEER, SendStatus::Success);
        assert_eq!(gate.stats().stale_completions, 1);

        // Completion for another peer does not release the sender
        let completer = Arc::clone(&gate);
        let radio = stub(move |_peer, _data| {
            completer.complete(Address::BROADCAST, SendStatus::Success);
            Ok(())
        });
        let result = gate.send_and_wait(&radio, PEER, &[0], Duration::from_millis(30));
        assert!(matches!(result, Err(LinkError::Timeout { .. })));
        assert_eq!(gate.stats().stale_completions, 2);
    }

    #[test]
    fn test_late_completion_does_not_confirm_next_send() {
        let gate = Arc::new(TransmitGate::new());
        let quiet = stub(|_peer, _data| Ok(()));
        assert!(matches!(
            gate.send_and_wait(&quiet, PEER, &[0], Duration::from_millis(20)),
            Err(LinkError::Timeout { .. })
        ));

        // The first send's completion shows up while the second is pending
        let completer = Arc::clone(&gate);
        let late = stub(move |peer, _data| {
            completer.complete(peer, SendStatus::Success);
            Ok(())
        });
        assert!(matches!(
            gate.send_and_wait(&late, PEER, &[1], Duration::from_millis(20)),
            Err(LinkError::Timeout { .. })
        ));

        let stats = gate.stats();
        assert_eq!(stats.delivered, 0);
        assert_eq!(stats.timed_out, 2);
        assert_eq!(stats.stale_completions, 1);
    }

    #[test]
    fn test_orphan_expires() {
        let gate = Arc::new(TransmitGate::new());
        let quiet = stub(|_peer, _data| Ok(()));
        assert!(gate
            .send_and_wait(&quiet, PEER, &[0], Duration::from_millis(10))
            .is_err());

        thread::sleep(Duration::from_millis(30));
        let completer = Arc::clone(&gate);
        let prompt = stub(move |peer, _data| {
            completer.complete(peer, SendStatus::Success);
            Ok(())
        });
        gate.send_and_wait(&prompt, PEER, &[1], Duration::from_millis(10))
            .unwrap();
        assert_eq!(gate.stats().stale_completions, 0);
    }

    #[test]
    fn test_cancel_before_send_is_sticky() {
        let gate = Arc::new(TransmitGate::new());
        gate.cancel();
        assert!(gate.is_closed());

        let untouched = stub(|_peer, _data| panic!("radio must not be called"));
        let started = Instant::now();
        assert_eq!(
            gate.send_and_wait(&untouched, PEER, &[0], Duration::from_secs(10)),
            Err(LinkError::NotReady)
        );
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(gate.stats().cancelled, 1);

        gate.reopen();
        let completer = Arc::clone(&gate);
        let radio = stub(move |peer, _data| {
            completer.complete(peer, SendStatus::Success);
            Ok(())
        });
        gate.send_and_wait(&radio, PEER, &[0], Duration::from_secs(1))
            .unwrap();
    }

    #[test]
    fn test_cancel_unblocks_sender() {
        let gate = Arc::new(TransmitGate::new());
        let radio = stub(|_peer, _data| Ok(()));

        let canceller = Arc::clone(&gate);
        let handle = thread::spawn(move || {
            while !canceller.is_pending() {
                thread::yield_now();
            }
            canceller.cancel();
        });

        let started = Instant::now();
        let result = gate.send_and_wait(&radio, PEER, &[0], Duration::from_secs(10));
        handle.join().unwrap();

        assert_eq!(result, Err(LinkError::NotReady));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(gate.stats().cancelled, 1);
    }
}
