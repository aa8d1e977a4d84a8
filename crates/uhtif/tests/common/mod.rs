// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Shared fixtures for integration tests.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Window size used by the fixtures: 1 MiB.
pub const WINDOW: u64 = 0x10_0000;

/// Window offset of the boot ROM for [`WINDOW`].
pub const BOOTROM_SLOT: usize = 0xF_C000;

/// Window offset of the CLINT for [`WINDOW`].
pub const CLINT_SLOT: usize = 0xF_E000;

/// A regular file standing in for `/dev/uioN`.
pub struct FakeDevice {
    file: NamedTempFile,
}

impl FakeDevice {
    /// Create a zero-filled device of `size` bytes.
    pub fn new(size: u64) -> Self {
        let file = NamedTempFile::new().expect("create device file");
        file.as_file().set_len(size).expect("size device file");
        Self { file }
    }

    /// Path to pass as `+uio=`.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Current device contents.
    pub fn contents(&self) -> Vec<u8> {
        std::fs::read(self.file.path()).expect("read device file")
    }

    /// The `+uio=` plusarg for this device.
    pub fn plusarg(&self) -> String {
        format!("+uio={}", self.path().display())
    }
}

/// Write `bytes` to a temporary image file.
pub fn image(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create image file");
    file.write_all(bytes).expect("write image");
    file.flush().expect("flush image");
    file
}
