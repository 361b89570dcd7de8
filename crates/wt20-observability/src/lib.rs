// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # wt20-observability
//!
//! Logging setup shared by WT20 tools and host applications.
//!
//! Every WT20 crate logs through `tracing`; this crate decides where those
//! events go. Per-crate debug output is switched on with `--debug-<crate>`
//! flags or the `WT20_DEBUG` environment variable.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known WT20 crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "wt20",
    "wt20-link",
    "wt20-protocol",
    "wt20-hal",
    "wt20-config",
];
