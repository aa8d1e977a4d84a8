// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # uhtif
//!
//! Host side of the host-target interface (HTIF) for a remote RISC-V core
//! that is reachable only through a memory-mapped UIO window.
//!
//! The crate owns the window and remaps the target's scattered address
//! space (boot ROM, CLINT, DRAM) onto it. Loaders and syscall proxies talk
//! to the target exclusively through the [`ChunkedMemory`] interface.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Loader / syscall proxy / self test               │
//! └─────────────────────────────────────────────────────────┘
//!                           │  ChunkedMemory (via MemIf)
//!                           ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │   UioTransport: validate → translate → copy → barrier   │
//! └─────────────────────────────────────────────────────────┘
//!            │                              │
//!            ▼                              ▼
//! ┌─────────────────────┐      ┌─────────────────────────────┐
//! │   `MockWindow`      │      │     `MappedWindow`          │
//! │   (for testing)     │      │     (mmap of /dev/uioN)     │
//! └─────────────────────┘      └─────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod driver;
mod error;
pub mod logging;
pub mod memif;
pub mod selftest;
pub mod shutdown;
pub mod transport;
pub mod window;

pub use config::{ConfigError, ResolvedConfig, TransportConfig, UnmappedPolicy};
pub use error::{Error, Result};
pub use memif::{ChunkedMemory, MemIf};
pub use transport::{AddressTranslator, UioTransport};
pub use uhtif_abi::{LayoutError, RegionDescriptor, RegionKind, RegionMap, Taddr, WindowOffset};
pub use window::{MappedWindow, MockWindow, WindowError, WindowMemory};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
