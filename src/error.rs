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

//! Error handling for the thermal core
//!
//! A single error type is shared by sensors, actuators and configuration.
//! Every variant names the source it came from (path, command or actuator)
//! so an operator can tell which device misbehaved.

use std::io;
use std::path::PathBuf;

/// Result type alias using ThermalError
pub type Result<T> = std::result::Result<T, ThermalError>;

/// Broad classes of failure, used by callers to pick a reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid configuration or violated invariant. Abort startup for the device.
    Configuration,
    /// File, process or link failure. The caller decides whether to retry.
    SourceRead,
    /// Duty value outside the device range. Caller bug.
    Range,
    /// A fan could not be handed back to automatic control.
    ReleaseVerification,
}

#[derive(thiserror::Error, Debug)]
pub enum ThermalError {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Min temperature must be less than max for {sensor}: {min} < {max}")]
    InvalidBounds {
        sensor: String,
        min: f64,
        max: f64,
    },

    #[error("Invalid PWM line range {start}..{end}: {reason}")]
    InvalidPwmLine {
        start: u32,
        end: u32,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Source Read Errors
    // ============================================================================
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to parse '{value}' from {origin}: {reason}")]
    Parse {
        origin: String,
        value: String,
        reason: String,
    },

    #[error("Command `{command}` failed: {reason}")]
    Command {
        command: String,
        reason: String,
    },

    #[error("No usable reading from {origin}: {reason}")]
    NoReading {
        origin: String,
        reason: String,
    },

    #[error("Serial link {link} error: {reason}")]
    Link {
        link: String,
        reason: String,
    },

    // ============================================================================
    // Range Errors
    // ============================================================================
    #[error("Duty {value} out of range [{min}, {max}] for {actuator}")]
    DutyOutOfRange {
        actuator: String,
        value: i64,
        min: u32,
        max: u32,
    },

    // ============================================================================
    // Release Errors
    // ============================================================================
    #[error("Couldn't release {actuator} from manual control: duty read back as {duty}, expected at least {expected}")]
    ReleaseVerification {
        actuator: String,
        duty: u32,
        expected: u32,
    },

    #[error("Couldn't disable PWM control on {actuator}: {reason}")]
    Release {
        actuator: String,
        reason: String,
    },

    #[error("{primary} (releasing manual control also failed: {release})")]
    ReleaseAfterError {
        primary: Box<ThermalError>,
        release: Box<ThermalError>,
    },
}

impl ThermalError {
    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a link error
    pub fn link(link: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Link {
            link: link.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBounds { .. }
            | Self::InvalidPwmLine { .. }
            | Self::Config(_)
            | Self::JsonParse(_) => ErrorKind::Configuration,
            Self::FileRead { .. }
            | Self::FileWrite { .. }
            | Self::Parse { .. }
            | Self::Command { .. }
            | Self::NoReading { .. }
            | Self::Link { .. } => ErrorKind::SourceRead,
            Self::DutyOutOfRange { .. } => ErrorKind::Range,
            Self::ReleaseVerification { .. }
            | Self::Release { .. }
            | Self::ReleaseAfterError { .. } => ErrorKind::ReleaseVerification,
        }
    }

    /// Fatal errors must stop the affected device, never be retried
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Configuration | ErrorKind::ReleaseVerification
        )
    }

    /// Attach a release failure to an error that was already propagating
    pub(crate) fn with_release_failure(self, release: ThermalError) -> Self {
        Self::ReleaseAfterError {
            primary: Box::new(self),
            release: Box::new(release),
        }
    }
}
