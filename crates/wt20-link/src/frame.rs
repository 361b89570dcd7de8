// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Received radio datagrams
//!
//! A [`Frame`] is created by the reception callback and owned by a mailbox
//! slot until the consumer dequeues it. The body is stored inline so the
//! reception context never allocates.

use heapless::Vec;

use crate::address::Address;
use crate::error::LinkError;
use crate::MAX_PAYLOAD;

/// Inline storage for one datagram body
pub type FrameBody = Vec<u8, MAX_PAYLOAD>;

/// Reception-quality record supplied by the radio
///
/// The link layer does not interpret it; it is carried through to the
/// consumer for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkQuality {
    /// Received signal strength, if the radio reports it
    pub rssi_dbm: Option<i8>,
    /// Channel the frame arrived on
    pub channel: Option<u8>,
    /// Radio-local reception timestamp in microseconds
    pub timestamp_us: Option<u32>,
}

/// Addressing and quality data recorded when a datagram arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxMetadata {
    /// Sender
    pub source: Address,
    /// Receiver as seen on air (own address or broadcast)
    pub destination: Address,
    pub quality: LinkQuality,
}

impl RxMetadata {
    pub fn new(source: Address, destination: Address) -> Self {
        Self {
            source,
            destination,
            quality: LinkQuality::default(),
        }
    }

    pub fn with_quality(mut self, quality: LinkQuality) -> Self {
        self.quality = quality;
        self
    }
}

/// One received datagram plus its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub meta: RxMetadata,
    body: FrameBody,
}

impl Frame {
    /// Copy a datagram out of the radio's buffer
    ///
    /// # Errors
    /// `PayloadTooLarge` if `data` exceeds [`MAX_PAYLOAD`]
    pub fn new(meta: RxMetadata, data: &[u8]) -> Result<Self, LinkError> {
        let body = FrameBody::from_slice(data).map_err(|_| LinkError::PayloadTooLarge {
            size: data.len(),
            max: MAX_PAYLOAD,
        })?;
        Ok(Self { meta, body })
    }

    pub fn source(&self) -> Address {
        self.meta.source
    }

    pub fn destination(&self) -> Address {
        self.meta.destination
    }

    /// Datagram body exactly as received
    pub fn data(&self) -> &[u8] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
