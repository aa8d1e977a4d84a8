// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Host window abstraction.
//!
//! The transport never touches raw pointers. It goes through
//! [`WindowMemory`], which exposes offset-addressed copy, zero and barrier
//! operations over one contiguous window. [`MappedWindow`] implements it
//! over an `mmap` of a UIO device; [`MockWindow`] over a heap buffer so the
//! transport can be tested on any host.


mod mapped;
mod mock;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{Ordering, fence};

use uhtif_abi::WindowOffset;

pub use mapped::MappedWindow;
pub use mock::{AccessKind, AccessRecord, MockWindow};

/// Offset-addressed access to one contiguous window.
///
/// Implementations check every range against their own size and refuse
/// accesses outside `[0, size)`, independently of any validation the
/// caller already performed.
pub trait WindowMemory {
    /// Total window size in bytes (0 once the window is closed).
    fn size(&self) -> u64;

    /// Copy `dst.len()` bytes starting at `offset` out of the window.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::OutOfRange`] or [`WindowError::Unmapped`].
    fn read(&self, offset: WindowOffset, dst: &mut [u8]) -> Result<(), WindowError>;

    /// Copy `src` into the window starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::OutOfRange`] or [`WindowError::Unmapped`].
    fn write(&mut self, offset: WindowOffset, src: &[u8]) -> Result<(), WindowError>;

    /// Zero `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::OutOfRange`] or [`WindowError::Unmapped`].
    fn zero(&mut self, offset: WindowOffset, len: usize) -> Result<(), WindowError>;

    /// Make all prior stores globally visible before any later access.
    fn barrier(&self) {
        fence(Ordering::SeqCst);
    }
}

/// Errors from opening or accessing a window.
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    /// The device path could not be opened read/write.
    #[error("failed to open {}: {source}", .path.display())]
    DeviceOpen {
        /// Device path that was requested.
        path: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },

    /// The OS refused to map the requested size.
    #[error("failed to map {size:#x} bytes of {}: {source}", .path.display())]
    Mapping {
        /// Device path that was opened.
        path: PathBuf,
        /// Requested mapping size.
        size: u64,
        /// Underlying OS error.
        source: io::Error,
    },

    /// The range does not fit inside the window.
    #[error("window range {offset}..+{len:#x} exceeds window size {size:#x}")]
    OutOfRange {
        /// Start of the rejected range.
        offset: WindowOffset,
        /// Length of the rejected range.
        len: u64,
        /// Window size at the time of the access.
        size: u64,
    },

    /// The window was already closed.
    #[error("window is not mapped")]
    Unmapped,
}

/// Convert an `(offset, len)` pair into a byte range inside `size`.
pub(crate) fn checked_range(
    offset: WindowOffset,
    len: usize,
    size: u64,
) -> Result<core::ops::Range<usize>, WindowError> {
    let out_of_range = || WindowError::OutOfRange {
        offset,
        len: len as u64,
        size,
    };
    let end = offset.checked_add(len as u64).ok_or_else(out_of_range)?;
    if end.as_u64() > size {
        return Err(out_of_range());
    }
    let start = usize::try_from(offset.as_u64()).map_err(|_| out_of_range())?;
    let end = usize::try_from(end.as_u64()).map_err(|_| out_of_range())?;
    Ok(start..end)
}
