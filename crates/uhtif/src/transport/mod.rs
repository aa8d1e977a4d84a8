// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Address-translating transport over a host window.
//!
//! Every data-moving operation follows the same path:
//!
//! 1. validate the whole target interval against one region
//! 2. translate the start address into a window offset
//! 3. copy (or zero) through the [`WindowMemory`]
//! 4. for stores, issue a full barrier before returning
//!
//! The remote core polls the window on its own, so the barrier keeps every
//! store ordered before whatever the host does next (in particular the
//! `msip` write in [`reset`]).
//!
//! [`reset`]: crate::ChunkedMemory::reset

#[cfg(test)]
mod translate_test;

mod translate;

pub use translate::AddressTranslator;

use tracing::{info, trace};
use uhtif_abi::layout::{CHUNK_ALIGN, CHUNK_MAX_SIZE, MSIP_HART0};
use uhtif_abi::{RegionMap, Taddr, WindowOffset};

use crate::config::{ConfigError, TransportConfig, UnmappedPolicy};
use crate::error::{Error, Result};
use crate::memif::ChunkedMemory;
use crate::window::{MappedWindow, WindowMemory};

/// Value written to `msip` to raise the software interrupt.
const MSIP_RAISE: u32 = 1;

/// Chunked, bounds-checked access to the target through one window.
///
/// The transport exclusively owns its window; dropping the transport
/// unmaps it.
#[derive(Debug)]
pub struct UioTransport<W: WindowMemory = MappedWindow> {
    window: W,
    translator: AddressTranslator,
    reset_issued: bool,
}

impl UioTransport<MappedWindow> {
    /// Resolve `config`, then map the UIO device it names.
    ///
    /// The configuration is checked before the device is opened, so a
    /// layout error never leaves a window mapped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a missing device or bad sizes,
    /// and [`Error::Window`] if the device cannot be opened or mapped.
    pub fn open(config: &TransportConfig) -> Result<Self> {
        let resolved = config.resolve()?;
        let window = MappedWindow::open(&resolved.device, resolved.window_size())?;
        Self::from_parts(window, resolved.regions, resolved.unmapped)
    }
}

impl<W: WindowMemory> UioTransport<W> {
    /// Build a transport over an existing window sized by the window itself.
    ///
    /// `dram_size` of `None` lets DRAM fill everything below the boot ROM.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the window cannot hold the
    /// layout.
    pub fn with_window(window: W, dram_size: Option<u64>, policy: UnmappedPolicy) -> Result<Self> {
        let regions = match dram_size {
            Some(size) => RegionMap::new(window.size(), size),
            None => RegionMap::with_default_dram(window.size()),
        }
        .map_err(ConfigError::from)?;
        Self::from_parts(window, regions, policy)
    }

    /// Build a transport from a window and a prepared region map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the window size differs from the
    /// size the region map was built for.
    pub fn from_parts(window: W, regions: RegionMap, policy: UnmappedPolicy) -> Result<Self> {
        if window.size() != regions.window_size() {
            return Err(ConfigError::WindowSizeMismatch {
                expected: regions.window_size(),
                actual: window.size(),
            }
            .into());
        }
        Ok(Self {
            window,
            translator: AddressTranslator::new(regions, policy),
            reset_issued: false,
        })
    }

    /// The address translator.
    #[must_use]
    pub const fn translator(&self) -> &AddressTranslator {
        &self.translator
    }

    /// Region placement inside the window.
    #[must_use]
    pub const fn regions(&self) -> &RegionMap {
        self.translator.regions()
    }

    /// The underlying window.
    #[must_use]
    pub const fn window(&self) -> &W {
        &self.window
    }

    /// Tear down the transport and hand back its window.
    #[must_use]
    pub fn into_window(self) -> W {
        self.window
    }

    /// Check whether [`reset`](ChunkedMemory::reset) has been issued.
    #[must_use]
    pub const fn is_reset(&self) -> bool {
        self.reset_issued
    }

    /// Translate a target address into a window offset.
    ///
    /// # Errors
    ///
    /// See [`AddressTranslator::translate`].
    pub fn translate(&self, addr: Taddr) -> Result<WindowOffset> {
        self.translator.translate(addr)
    }

    /// Check whether `[addr, addr + len)` may be accessed.
    #[must_use]
    pub fn validate(&self, addr: Taddr, len: u64) -> bool {
        self.translator.validate(addr, len)
    }

    /// Log the window layout, one line per region.
    pub fn log_layout(&self) {
        info!(
            "UIO memory map ({:#x} byte window):",
            self.regions().window_size()
        );
        for region in self.regions().iter() {
            info!("  {region}");
        }
    }
}

impl<W: WindowMemory> ChunkedMemory for UioTransport<W> {
    fn read_chunk(&self, addr: Taddr, dst: &mut [u8]) -> Result<()> {
        let offset = self.translator.resolve(addr, dst.len() as u64)?;
        trace!(%addr, %offset, len = dst.len(), "read chunk");
        self.window.read(offset, dst)?;
        Ok(())
    }

    fn write_chunk(&mut self, addr: Taddr, src: &[u8]) -> Result<()> {
        let offset = self.translator.resolve(addr, src.len() as u64)?;
        trace!(%addr, %offset, len = src.len(), "write chunk");
        self.window.write(offset, src)?;
        self.window.barrier();
        Ok(())
    }

    fn clear_chunk(&mut self, addr: Taddr, len: usize) -> Result<()> {
        let offset = self.translator.resolve(addr, len as u64)?;
        trace!(%addr, %offset, len, "clear chunk");
        self.window.zero(offset, len)?;
        self.window.barrier();
        Ok(())
    }

    fn chunk_align(&self) -> usize {
        CHUNK_ALIGN
    }

    fn chunk_max_size(&self) -> usize {
        CHUNK_MAX_SIZE
    }

    fn reset(&mut self) -> Result<()> {
        if self.reset_issued {
            return Err(Error::ResetAlreadyIssued);
        }
        let msip = Taddr::new(MSIP_HART0);
        info!(
            target_addr = %msip,
            offset = %self.translate(msip)?,
            "raising msip to start hart 0"
        );
        self.write_chunk(msip, &MSIP_RAISE.to_le_bytes())?;
        self.reset_issued = true;
        Ok(())
    }
}
