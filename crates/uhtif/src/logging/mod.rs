// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Log subscriber setup for the binary.
//!
//! `RUST_LOG` takes precedence; without it the level follows the number
//! of `-v` flags. Output goes to stderr so stdout stays free for the
//! target's console.


use tracing_subscriber::EnvFilter;

/// Default filter directive for a verbosity count.
#[must_use]
pub const fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Build the filter, preferring `RUST_LOG` when it parses.
#[must_use]
pub fn filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed, which happens
/// when tests drive the binary's code paths more than once.
pub fn init(verbosity: u8) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
