/*
 * This file is part of Hyperfan.
 *
 * Copyright (C) 2025 Hyperfan contributors
 *
 * Hyperfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Hyperfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Hyperfan. If not, see <https://www.gnu.org/licenses/>.
 */

//! Logging setup for binaries built on the thermal core.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to whoever owns the process.

use crate::constants::logging::{DEFAULT_LEVEL, LOG_ENV};

/// Filter directive from `HF_THERMAL_LOG`, falling back to `info`
pub fn log_level_from_env() -> String {
    std::env::var(LOG_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

/// Install a stdout subscriber. Returns false if one was already installed.
pub fn init_tracing(log_level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(log_level)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_level_defaults_to_info() {
        std::env::remove_var(LOG_ENV);
        assert_eq!(log_level_from_env(), "info");

        std::env::set_var(LOG_ENV, "   ");
        assert_eq!(log_level_from_env(), "info");
        std::env::remove_var(LOG_ENV);
    }

    #[test]
    #[serial]
    fn test_level_from_env() {
        std::env::set_var(LOG_ENV, "hf_thermal=debug");
        assert_eq!(log_level_from_env(), "hf_thermal=debug");
        std::env::remove_var(LOG_ENV);
    }

    #[test]
    #[serial]
    fn test_init_twice_is_harmless() {
        let _ = init_tracing("debug");
        assert!(!init_tracing("debug"));
    }
}
