// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Window backed by an `mmap` of a UIO device.
//!
//! The device is opened with `O_SYNC` so the kernel maps it uncached, and
//! mapped `MAP_SHARED` so stores reach the FPGA bridge. The base pointer
//! never leaves this module, and every access through it is volatile.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::ptr;

use memmap2::{MmapMut, MmapOptions};
use tracing::{debug, info};
use uhtif_abi::WindowOffset;

use super::{WindowError, WindowMemory, checked_range};

/// A device window mapped into this process.
///
/// The window is in one of two states: mapped (mapping and handle both
/// held, `size() > 0`) or closed (neither held, `size() == 0`). Dropping the
/// window closes it.
pub struct MappedWindow {
    path: PathBuf,
    map: Option<MmapMut>,
    file: Option<File>,
}

impl MappedWindow {
    /// Open `path` and map exactly `size` bytes of it.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::DeviceOpen`] if the path cannot be opened
    /// read/write, or [`WindowError::Mapping`] if `size` is zero or the
    /// mapping request fails. On a mapping failure the device handle is
    /// released before returning.
    pub fn open(path: impl AsRef<Path>, size: u64) -> Result<Self, WindowError> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(&path)
            .map_err(|source| WindowError::DeviceOpen {
                path: path.clone(),
                source,
            })?;

        let mapping_error = |source| WindowError::Mapping {
            path: path.clone(),
            size,
            source,
        };
        if size == 0 {
            return Err(mapping_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "zero-length mapping",
            )));
        }
        let len = usize::try_from(size).map_err(|_| {
            mapping_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "mapping size exceeds address space",
            ))
        })?;

        // SAFETY: The mapping is shared with the device by design; the only
        // accesses go through the bounds-checked copies below, which never
        // hand out references into the mapped memory.
        let map = unsafe { MmapOptions::new().len(len).map_mut(&file) }.map_err(mapping_error)?;

        info!(
            device = %path.display(),
            base = ?map.as_ptr(),
            size = format_args!("{size:#x}"),
            "mapped UIO window"
        );

        Ok(Self {
            path,
            map: Some(map),
            file: Some(file),
        })
    }

    /// Check whether the window is still mapped.
    #[must_use]
    pub const fn is_mapped(&self) -> bool {
        self.map.is_some()
    }

    /// Unmap the window and close the device handle.
    ///
    /// Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(map) = self.map.take() {
            drop(map);
            debug!(device = %self.path.display(), "unmapped UIO window");
        }
        if let Some(file) = self.file.take() {
            drop(file);
            debug!(device = %self.path.display(), "closed UIO device");
        }
    }
}

impl WindowMemory for MappedWindow {
    fn size(&self) -> u64 {
        self.map.as_ref().map_or(0, |map| map.len() as u64)
    }

    fn read(&self, offset: WindowOffset, dst: &mut [u8]) -> Result<(), WindowError> {
        let map = self.map.as_ref().ok_or(WindowError::Unmapped)?;
        let range = checked_range(offset, dst.len(), map.len() as u64)?;
        // SAFETY: `range` lies inside the mapping, which stays alive for
        // the borrow of `self`.
        unsafe { load_volatile(map.as_ptr().add(range.start), dst) };
        Ok(())
    }

    fn write(&mut self, offset: WindowOffset, src: &[u8]) -> Result<(), WindowError> {
        let map = self.map.as_mut().ok_or(WindowError::Unmapped)?;
        let range = checked_range(offset, src.len(), map.len() as u64)?;
        // SAFETY: `range` lies inside the mapping, which stays alive for
        // the mutable borrow of `self`.
        unsafe { store_volatile(map.as_mut_ptr().add(range.start), src) };
        Ok(())
    }

    fn zero(&mut self, offset: WindowOffset, len: usize) -> Result<(), WindowError> {
        let map = self.map.as_mut().ok_or(WindowError::Unmapped)?;
        let range = checked_range(offset, len, map.len() as u64)?;
        // SAFETY: `range` lies inside the mapping, which stays alive for
        // the mutable borrow of `self`.
        unsafe { fill_volatile(map.as_mut_ptr().add(range.start), 0, len) };
        Ok(())
    }
}

// Device memory is shared with the remote core, so every access goes
// through volatile loads and stores. The compiler may neither cache a load
// across calls nor elide or merge a store.

/// Copy `dst.len()` bytes out of device memory at `src`.
///
/// # Safety
///
/// `src..src + dst.len()` must lie inside a live mapping.
unsafe fn load_volatile(src: *const u8, dst: &mut [u8]) {
    for (index, byte) in dst.iter_mut().enumerate() {
        // SAFETY: `index < dst.len()`, inside the range the caller vouches for.
        *byte = unsafe { ptr::read_volatile(src.add(index)) };
    }
}

/// Copy `src` into device memory at `dst`.
///
/// # Safety
///
/// `dst..dst + src.len()` must lie inside a live, writable mapping.
unsafe fn store_volatile(dst: *mut u8, src: &[u8]) {
    for (index, &byte) in src.iter().enumerate() {
        // SAFETY: `index < src.len()`, inside the range the caller vouches for.
        unsafe { ptr::write_volatile(dst.add(index), byte) };
    }
}

/// Set `len` bytes of device memory at `dst` to `value`.
///
/// # Safety
///
/// `dst..dst + len` must lie inside a live, writable mapping.
unsafe fn fill_volatile(dst: *mut u8, value: u8, len: usize) {
    for index in 0..len {
        // SAFETY: `index < len`, inside the range the caller vouches for.
        unsafe { ptr::write_volatile(dst.add(index), value) };
    }
}

impl Drop for MappedWindow {
    fn drop(&mut self) {
        self.close();
    }
}

impl core::fmt::Debug for MappedWindow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MappedWindow")
            .field("path", &self.path)
            .field("size", &self.size())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}
