// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Transport error type.

use uhtif_abi::Taddr;

use crate::config::ConfigError;
use crate::window::WindowError;

/// Errors raised by the transport and its window.
///
/// Every variant is fatal for the current session. Nothing is retried
/// inside the crate; the caller decides whether to abort.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Opening or mapping the device window failed, or the window rejected
    /// an access.
    #[error(transparent)]
    Window(#[from] WindowError),

    /// Size parameters or device path are unusable.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// The access leaves the window or spans more than one region.
    #[error("access of {len:#x} bytes at {addr} is out of bounds")]
    OutOfBounds {
        /// First target address of the access.
        addr: Taddr,
        /// Length of the access in bytes.
        len: u64,
    },

    /// The address belongs to no known region.
    #[error("target address {addr} is not mapped by any region")]
    UnmappedAddress {
        /// The offending target address.
        addr: Taddr,
    },

    /// `reset` may be issued only once per session.
    #[error("reset was already issued for this session")]
    ResetAlreadyIssued,
}

/// Result alias for transport operations.
pub type Result<T> = core::result::Result<T, Error>;
