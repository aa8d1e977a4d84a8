// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Transport configuration.
//!
//! A [`TransportConfig`] holds what the command line produced; [`resolve`]
//! applies the defaults and checks the layout before any device is
//! touched, so a rejected configuration never leaves a window mapped.
//!
//! [`resolve`]: TransportConfig::resolve


use std::path::PathBuf;

use tracing::info;
use uhtif_abi::layout::{DEFAULT_WINDOW_SIZE, default_dram_size};
use uhtif_abi::{LayoutError, RegionMap};

/// What translation does with an address outside every region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum UnmappedPolicy {
    /// Fail with `UnmappedAddress`.
    #[default]
    Strict,
    /// Translate to window offset 0 and log a warning. Data accesses are
    /// still rejected by bounds validation.
    Alias,
}

/// Errors detected while resolving a [`TransportConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No device path was given.
    #[error("a UIO device path is required (+uio=/dev/uioX)")]
    MissingDevice,

    /// The window and DRAM sizes do not produce a valid layout.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// The window handed to the transport does not match the layout.
    #[error("window is {actual:#x} bytes but the layout expects {expected:#x}")]
    WindowSizeMismatch {
        /// Window size the region map was built for.
        expected: u64,
        /// Size reported by the window.
        actual: u64,
    },
}

/// Unresolved transport parameters.
///
/// `None` and zero sizes both mean "use the default".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportConfig {
    /// UIO device to map, e.g. `/dev/uio0`.
    pub device: Option<PathBuf>,
    /// Total window size in bytes (default 1 GiB).
    pub window_size: Option<u64>,
    /// DRAM size in bytes (default: window size minus 16 KiB).
    pub dram_size: Option<u64>,
    /// Handling of addresses outside every region.
    pub unmapped: UnmappedPolicy,
}

/// Configuration after defaults and layout checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// UIO device to map.
    pub device: PathBuf,
    /// Region placement inside the window.
    pub regions: RegionMap,
    /// Handling of addresses outside every region.
    pub unmapped: UnmappedPolicy,
}

impl ResolvedConfig {
    /// Total window size in bytes.
    #[must_use]
    pub const fn window_size(&self) -> u64 {
        self.regions.window_size()
    }
}

impl TransportConfig {
    /// Create a configuration for `device` with default sizes.
    #[must_use]
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: Some(device.into()),
            ..Self::default()
        }
    }

    /// Set the total window size.
    #[must_use]
    pub const fn with_window_size(mut self, size: u64) -> Self {
        self.window_size = Some(size);
        self
    }

    /// Set the DRAM size.
    #[must_use]
    pub const fn with_dram_size(mut self, size: u64) -> Self {
        self.dram_size = Some(size);
        self
    }

    /// Set the unmapped-address policy.
    #[must_use]
    pub const fn with_unmapped(mut self, policy: UnmappedPolicy) -> Self {
        self.unmapped = policy;
        self
    }

    /// Apply defaults and validate the layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDevice`] without a device path, and
    /// [`ConfigError::Layout`] if the sizes do not fit.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let window_size = match self.window_size {
            Some(size) if size != 0 => size,
            _ => {
                info!("using default UIO size {DEFAULT_WINDOW_SIZE:#x} (1 GiB)");
                DEFAULT_WINDOW_SIZE
            }
        };

        let dram_size = match self.dram_size {
            Some(size) if size != 0 => size,
            _ => {
                let size = default_dram_size(window_size)
                    .ok_or(LayoutError::WindowTooSmall { window_size })?;
                info!("using default DRAM size {size:#x}");
                size
            }
        };

        let device = self.device.clone().ok_or(ConfigError::MissingDevice)?;
        let regions = RegionMap::new(window_size, dram_size)?;

        Ok(ResolvedConfig {
            device,
            regions,
            unmapped: self.unmapped,
        })
    }
}

/// Parse a size or address the way `strtoull(s, 0, 0)` reads it.
///
/// Accepts `0x`/`0X` hexadecimal, leading-`0` octal and decimal, with
/// optional `_` separators. Unlike `strtoull`, trailing garbage is an error.
pub fn parse_size(text: &str) -> Result<u64, String> {
    let cleaned: String = text.trim().chars().filter(|&c| c != '_').collect();
    let (digits, radix) = if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        (hex, 16)
    } else if cleaned.len() > 1 && cleaned.starts_with('0') {
        (&cleaned[1..], 8)
    } else {
        (cleaned.as_str(), 10)
    };
    if digits.is_empty() {
        return Err(format!("'{text}' is not a number"));
    }
    u64::from_str_radix(digits, radix).map_err(|err| format!("'{text}': {err}"))
}
