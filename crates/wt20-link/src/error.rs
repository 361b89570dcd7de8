// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the radio boundary and the link layer

use std::time::Duration;

use crate::address::Address;

/// Result type alias for radio transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type alias for link operations
pub type LinkResult<T> = Result<T, LinkError>;

/// Errors reported by a [`RadioTransport`](crate::traits::RadioTransport)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Radio stack could not be brought up
    #[error("radio bring-up failed: {0}")]
    BringUpFailed(String),

    /// Operation needs a running radio
    #[error("radio is not started")]
    NotStarted,

    /// No room left in the radio's peer table
    #[error("peer table full (capacity {capacity})")]
    PeerTableFull { capacity: usize },

    /// Peer is already registered
    #[error("peer {0} already registered")]
    PeerExists(Address),

    /// Destination was never registered
    #[error("peer {0} is not registered")]
    UnknownPeer(Address),

    /// Radio refused to queue the frame
    #[error("transmit rejected: {0}")]
    TransmitRejected(String),

    /// Radio stack could not be torn down
    #[error("radio shutdown failed: {0}")]
    ShutdownFailed(String),

    /// Platform specific failure
    #[error("radio error: {0}")]
    Other(String),
}

impl From<String> for TransportError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

impl From<&str> for TransportError {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}

/// Errors reported by the link layer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// Session is not open (before `init` or after `close`)
    #[error("link session is not open")]
    NotReady,

    /// `init` called on an open session
    #[error("link session is already open")]
    AlreadyOpen,

    /// Frame does not fit in a single radio datagram
    #[error("payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Radio reported that the frame was not delivered
    #[error("send to {0} failed")]
    SendFailed(Address),

    /// No completion arrived within the bound
    #[error("send to {peer} timed out after {waited:?}")]
    Timeout { peer: Address, waited: Duration },

    /// No room left in the radio's peer table
    #[error("peer table full (capacity {capacity})")]
    PeerTableFull { capacity: usize },

    /// Any other radio failure
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl LinkError {
    /// Map a peer registration failure onto the link taxonomy
    pub(crate) fn from_registration(err: TransportError) -> Self {
        match err {
            TransportError::PeerTableFull { capacity } => Self::PeerTableFull { capacity },
            other => Self::Transport(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = LinkError::PayloadTooLarge { size: 300, max: 250 };
        assert_eq!(err.to_string(), "payload too large: 300 bytes (max: 250)");

        let err = LinkError::from(TransportError::NotStarted);
        assert_eq!(err.to_string(), "radio is not started");
    }

    #[test]
    fn test_registration_mapping() {
        assert_eq!(
            LinkError::from_registration(TransportError::PeerTableFull { capacity: 20 }),
            LinkError::PeerTableFull { capacity: 20 }
        );
        assert_eq!(
            LinkError::from_registration(TransportError::NotStarted),
            LinkError::Transport(TransportError::NotStarted)
        );
    }
}
