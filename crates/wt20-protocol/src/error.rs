// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Protocol engine errors

use wt20_link::LinkError;

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors returned by the protocol engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Operation attempted before `init` or after `deinit`
    #[error("protocol engine is not initialized")]
    NotInitialized,

    #[error("protocol engine is already initialized")]
    AlreadyInitialized,

    /// Radio bring-up failed; the engine stays uninitialized
    #[error("initialization failed: {0}")]
    InitializationFailed(LinkError),

    /// Teardown failed; the engine is uninitialized regardless
    #[error("deinitialization failed: {0}")]
    DeinitFailed(LinkError),

    /// Command payload does not fit next to the tag byte
    #[error("command payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error(transparent)]
    Link(LinkError),
}

impl From<LinkError> for ProtocolError {
    fn from(err: LinkError) -> Self {
        match err {
            // The session closed underneath the caller
            LinkError::NotReady => ProtocolError::NotInitialized,
            other => ProtocolError::Link(other),
        }
    }
}
