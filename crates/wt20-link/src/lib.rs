// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # wt20-link
//!
//! Link layer for WT20 devices over a connectionless point-to-point radio
//! (ESP-NOW on the device).
//!
//! ## Features
//!
//! - **Mailbox**: bounded FIFO between the radio's reception callback and a
//!   polling consumer, with a counted overflow policy
//! - **Transmit gate**: turns fire-and-forget radio sends into confirmed
//!   sends with a bounded wait
//! - **Session**: device identity, peer registration and teardown, owned by
//!   an explicit handle instead of process-wide state
//!
//! ## Feature Flags
//!
//! - `loopback` (default): in-process [`loopback::LoopbackRadio`] for hosts
//!   and tests
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use wt20_link::prelude::*;
//! use wt20_link::loopback::LoopbackRadio;
//!
//! let me: Address = "40:4c:ca:4d:df:80".parse()?;
//! let peer: Address = "40:4c:ca:4d:67:ec".parse()?;
//!
//! let (radio, _other) = LoopbackRadio::pair(me, peer);
//! let session = LinkSession::new(radio, LinkConfig::default());
//! session.init()?;
//! session.register_peer(peer)?;
//! session.write(peer, &[0])?;
//! session.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! 1. **Types**: addresses, frames, errors, configuration
//! 2. **Traits**: the [`RadioTransport`] boundary
//! 3. **Primitives**: [`Mailbox`] and [`TransmitGate`]
//! 4. **Session**: [`LinkSession`] tying a radio to one mailbox and one gate

pub mod address;
pub mod config;
pub mod error;
pub mod frame;
pub mod gate;
pub mod mailbox;
pub mod session;
pub mod traits;

#[cfg(feature = "loopback")]
pub mod loopback;

/// Largest datagram the radio carries, in bytes
pub const MAX_PAYLOAD: usize = 250;

/// Peer table size of the ESP-NOW stack
pub const DEFAULT_MAX_PEERS: usize = 20;

// Re-export commonly used types
pub use address::{Address, AddressParseError, ADDRESS_LEN};
pub use config::{LinkConfig, OverflowPolicy, DEFAULT_SEND_TIMEOUT};
pub use error::{LinkError, LinkResult, TransportError, TransportResult};
pub use frame::{Frame, FrameBody, LinkQuality, RxMetadata};
pub use gate::{GateStats, TransmitGate};
pub use mailbox::{EnqueueOutcome, Mailbox, MailboxStats, MAILBOX_CAPACITY};
pub use session::{LinkSession, LinkStats, SessionState};
pub use traits::{RadioTransport, ReceiveCallback, SendCompleteCallback, SendStatus};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::address::*;
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::frame::*;
    pub use crate::session::*;
    pub use crate::traits::*;
}
