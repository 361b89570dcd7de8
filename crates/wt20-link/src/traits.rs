// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Radio transport trait definitions
//!
//! This is the boundary between the link layer and the point-to-point radio
//! (ESP-NOW on the device, an in-process loopback on hosts). The radio owns
//! the peer table and invokes the registered callbacks from its own
//! execution context, which may run concurrently with the consumer.

use crate::address::Address;
use crate::error::TransportResult;
use crate::frame::RxMetadata;
use crate::MAX_PAYLOAD;

/// Outcome of one transmission, as reported by the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Success,
    Fail,
}

impl SendStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SendStatus::Success)
    }
}

/// Invoked by the radio once per transmission with the destination and outcome
pub type SendCompleteCallback = Box<dyn Fn(Address, SendStatus) + Send + Sync + 'static>;

/// Invoked by the radio for every received datagram
pub type ReceiveCallback = Box<dyn Fn(RxMetadata, &[u8]) + Send + Sync + 'static>;

/// Point-to-point radio primitive
///
/// All methods take `&self`: callbacks and transmissions happen from
/// different execution contexts, so implementations use interior mutability.
pub trait RadioTransport: Send + Sync {
    /// Bring up the radio stack
    fn bring_up(&self) -> TransportResult<()>;

    /// Own hardware address (valid after `bring_up`)
    fn local_address(&self) -> TransportResult<Address>;

    /// Register the send completion callback, replacing any previous one
    fn on_send_complete(&self, callback: SendCompleteCallback) -> TransportResult<()>;

    /// Register the reception callback, replacing any previous one
    fn on_receive(&self, callback: ReceiveCallback) -> TransportResult<()>;

    /// Drop both callbacks
    fn clear_callbacks(&self) -> TransportResult<()>;

    /// Add a destination to the radio's peer table
    fn add_peer(&self, peer: Address) -> TransportResult<()>;

    /// Queue a datagram; the outcome arrives later through the send completion callback
    fn transmit(&self, peer: Address, data: &[u8]) -> TransportResult<()>;

    /// Tear down the radio stack
    fn shutdown(&self) -> TransportResult<()>;

    /// Largest datagram the radio accepts
    fn max_payload(&self) -> usize {
        MAX_PAYLOAD
    }

    /// Transport name, for logs
    fn transport_type(&self) -> &str;
}
