// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Link layer configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default bound on how long a write waits for the radio's send completion
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(500);

/// What the mailbox does with a frame that arrives while it is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest unread frame to make room (newest commands win)
    #[default]
    DropOldest,
    /// Keep the queued frames and discard the arriving one
    DropNewest,
}

impl OverflowPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DropOldest => "drop_oldest",
            Self::DropNewest => "drop_newest",
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop_oldest" | "drop-oldest" => Ok(Self::DropOldest),
            "drop_newest" | "drop-newest" => Ok(Self::DropNewest),
            other => Err(format!("unknown overflow policy '{}'", other)),
        }
    }
}

/// Link session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Upper bound for a confirmed send
    pub send_timeout: Duration,

    /// Mailbox behaviour when full
    pub overflow_policy: OverflowPolicy,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            send_timeout: DEFAULT_SEND_TIMEOUT,
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

impl LinkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the send completion bound
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the mailbox overflow policy
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.send_timeout.is_zero() {
            return Err("Send timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}
