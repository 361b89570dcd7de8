// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Bounded receive queue between the radio callback and the consumer
//!
//! The reception callback enqueues, a single polling consumer dequeues. Both
//! sides run in different execution contexts, so the ring indices live
//! behind one short critical section. Delivery is FIFO; when the queue is
//! full the configured [`OverflowPolicy`] decides which frame is lost, and
//! every loss is counted.

use heapless::Deque;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::OverflowPolicy;
use crate::frame::Frame;

/// Number of frames a mailbox holds
pub const MAILBOX_CAPACITY: usize = 16;

/// Result of handing a frame to the mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Frame queued, nothing lost
    Stored,
    /// Frame queued after evicting the oldest unread frame
    DisplacedOldest,
    /// Mailbox full, arriving frame discarded
    Rejected,
}

/// Snapshot of mailbox counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxStats {
    pub capacity: usize,
    pub len: usize,
    /// Frames accepted into a slot
    pub received: u64,
    /// Frames handed to the consumer
    pub delivered: u64,
    /// Frames lost to overflow or oversize
    pub dropped: u64,
}

impl MailboxStats {
    /// Fill level (0.0 to 1.0)
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.len as f64 / self.capacity as f64
        }
    }
}

struct Slots<const N: usize> {
    frames: Deque<Frame, N>,
    received: u64,
    delivered: u64,
    dropped: u64,
}

/// Fixed-capacity FIFO of received frames
pub struct Mailbox<const N: usize = MAILBOX_CAPACITY> {
    slots: Mutex<Slots<N>>,
    policy: OverflowPolicy,
}

impl Mailbox<MAILBOX_CAPACITY> {
    /// Mailbox with the standard capacity
    pub fn new(policy: OverflowPolicy) -> Self {
        Self::with_policy(policy)
    }
}

impl<const N: usize> Mailbox<N> {
    /// Mailbox of capacity `N`
    pub fn with_policy(policy: OverflowPolicy) -> Self {
        Self {
            slots: Mutex::new(Slots {
                frames: Deque::new(),
                received: 0,
                delivered: 0,
                dropped: 0,
            }),
            policy,
        }
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Store a frame (reception context)
    pub fn enqueue(&self, frame: Frame) -> EnqueueOutcome {
        let source = frame.source();
        let len = frame.len();

        let mut slots = self.slots.lock();
        let outcome = if !slots.frames.is_full() {
            EnqueueOutcome::Stored
        } else {
            match self.policy {
                OverflowPolicy::DropOldest => {
                    slots.frames.pop_front();
                    EnqueueOutcome::DisplacedOldest
                }
                OverflowPolicy::DropNewest => EnqueueOutcome::Rejected,
            }
        };

        let outcome = match outcome {
            EnqueueOutcome::Rejected => outcome,
            accepted => match slots.frames.push_back(frame) {
                Ok(()) => {
                    slots.received += 1;
                    accepted
                }
                // Unreachable with a free slot; counted as a drop all the same
                Err(_) => EnqueueOutcome::Rejected,
            },
        };
        if outcome != EnqueueOutcome::Stored {
            slots.dropped += 1;
        }
        let dropped = slots.dropped;
        drop(slots);

        match outcome {
            EnqueueOutcome::Stored => {
                debug!("[MAILBOX] Queued {} bytes from {}", len, source);
            }
            EnqueueOutcome::DisplacedOldest => {
                warn!(
                    "[MAILBOX] Full ({} slots): evicted oldest frame for {} bytes from {} (dropped total: {})",
                    N, len, source, dropped
                );
            }
            EnqueueOutcome::Rejected => {
                warn!(
                    "[MAILBOX] Full ({} slots): discarded {} bytes from {} (dropped total: {})",
                    N, len, source, dropped
                );
            }
        }
        outcome
    }

    /// Take the oldest frame (consumer context)
    ///
    /// Returns `None` when empty.
    pub fn dequeue(&self) -> Option<Frame> {
        let mut slots = self.slots.lock();
        let frame = slots.frames.pop_front();
        if frame.is_some() {
            slots.delivered += 1;
        }
        frame
    }

    /// Whether at least one frame is waiting
    pub fn available(&self) -> bool {
        !self.slots.lock().frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.available()
    }

    /// Count a frame that never made it into a slot (e.g. oversized)
    pub fn record_drop(&self) {
        self.slots.lock().dropped += 1;
    }

    /// Discard every queued frame, returning how many were discarded
    pub fn clear(&self) -> usize {
        let mut slots = self.slots.lock();
        let discarded = slots.frames.len();
        slots.frames.clear();
        discarded
    }

    pub fn stats(&self) -> MailboxStats {
        let slots = self.slots.lock();
        MailboxStats {
            capacity: N,
            len: slots.frames.len(),
            received: slots.received,
            delivered: slots.delivered,
            dropped: slots.dropped,
        }
    }
}

impl Default for Mailbox<MAILBOX_CAPACITY> {
    fn default() -> Self {
        Self::new(OverflowPolicy::default())
    }
}
