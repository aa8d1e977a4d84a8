// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Target address to window offset translation.

use tracing::{error, warn};
use uhtif_abi::{RegionMap, Taddr, WindowOffset};

use crate::config::UnmappedPolicy;
use crate::error::{Error, Result};

/// Maps target addresses onto window offsets through a [`RegionMap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressTranslator {
    regions: RegionMap,
    policy: UnmappedPolicy,
}

impl AddressTranslator {
    /// Create a translator over `regions`.
    #[must_use]
    pub const fn new(regions: RegionMap, policy: UnmappedPolicy) -> Self {
        Self { regions, policy }
    }

    /// Region placement used for translation.
    #[must_use]
    pub const fn regions(&self) -> &RegionMap {
        &self.regions
    }

    /// Handling of addresses outside every region.
    #[must_use]
    pub const fn policy(&self) -> UnmappedPolicy {
        self.policy
    }

    /// Translate a target address into a window offset.
    ///
    /// Boot ROM is checked first, then CLINT, then everything at or above
    /// the DRAM base. The result is not bounds-checked; see [`validate`].
    ///
    /// [`validate`]: Self::validate
    ///
    /// # Errors
    ///
    /// Under [`UnmappedPolicy::Strict`], returns [`Error::UnmappedAddress`]
    /// for addresses no region claims. Under [`UnmappedPolicy::Alias`] such
    /// addresses translate to offset 0 with a warning.
    pub fn translate(&self, addr: Taddr) -> Result<WindowOffset> {
        match self.regions.find(addr) {
            Some(region) => region
                .offset_of(addr)
                .ok_or(Error::OutOfBounds { addr, len: 0 }),
            None => match self.policy {
                UnmappedPolicy::Strict => Err(Error::UnmappedAddress { addr }),
                UnmappedPolicy::Alias => {
                    warn!(%addr, "unmapped target address, aliasing to window offset 0");
                    Ok(WindowOffset::ZERO)
                }
            },
        }
    }

    /// Check whether `[addr, addr + len)` can be accessed.
    ///
    /// True iff the translated interval fits inside the window and the
    /// target interval lies entirely inside the one region that owns
    /// `addr`. Requests spanning two regions, running past the configured
    /// DRAM size, or overflowing are invalid. Unmapped addresses are never
    /// valid, whatever the policy.
    #[must_use]
    pub fn validate(&self, addr: Taddr, len: u64) -> bool {
        let Some(region) = self.regions.find(addr) else {
            return false;
        };
        let Some(end) = region
            .offset_of(addr)
            .and_then(|offset| offset.checked_add(len))
        else {
            return false;
        };
        end.as_u64() <= self.regions.window_size() && region.contains_range(addr, len)
    }

    /// Validate an access and return the window offset of its first byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnmappedAddress`] for an unclaimed address under the
    /// strict policy, and [`Error::OutOfBounds`] for any other invalid
    /// access.
    pub fn resolve(&self, addr: Taddr, len: u64) -> Result<WindowOffset> {
        if self.regions.find(addr).is_none() {
            // Strict fails here; alias warns and falls through to rejection.
            self.translate(addr)?;
        }
        if !self.validate(addr, len) {
            error!(%addr, len = format_args!("{len:#x}"), "access out of bounds");
            return Err(Error::OutOfBounds { addr, len });
        }
        self.translate(addr)
    }
}
