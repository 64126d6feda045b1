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

//! Temperature sensors
//!
//! Every source (hwmon files, `hddtemp`, arbitrary shell commands) is
//! reduced to a [`TempReading`] that carries the current value, the
//! source's min/max bounds and the configured panic/threshold flags.
//!
//! Sensors hold nothing but their source descriptor, so they are
//! `Send + Sync` and may be read concurrently and repeatedly.

mod command;
mod file;
mod hdd;

pub use command::CommandTemp;
pub use file::FileTemp;
pub use hdd::HddTemp;

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, ThermalError};

/// Degrees Celsius. Unbounded, negative values are valid.
pub type TempCelsius = f64;

/// Optional alarm levels attached to a sensor
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TempLimits {
    pub panic: Option<TempCelsius>,
    pub threshold: Option<TempCelsius>,
}

impl TempLimits {
    pub fn new(panic: Option<TempCelsius>, threshold: Option<TempCelsius>) -> Self {
        Self { panic, threshold }
    }
}

/// Immutable snapshot produced by every [`TempSensor::read`] call
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TempReading {
    pub temp: TempCelsius,
    pub min: TempCelsius,
    pub max: TempCelsius,
    pub panic: Option<TempCelsius>,
    pub threshold: Option<TempCelsius>,
    pub is_panic: bool,
    pub is_threshold: bool,
}

impl TempReading {
    /// Build a reading, rejecting `min >= max` (and NaN bounds).
    ///
    /// `origin` names the sensor in the error message.
    pub fn new(
        origin: &str,
        temp: TempCelsius,
        min: TempCelsius,
        max: TempCelsius,
        limits: TempLimits,
    ) -> Result<Self> {
        if !(min < max) {
            return Err(ThermalError::InvalidBounds {
                sensor: origin.to_string(),
                min,
                max,
            });
        }

        Ok(Self {
            temp,
            min,
            max,
            panic: limits.panic,
            threshold: limits.threshold,
            is_panic: limits.panic.is_some_and(|p| temp >= p),
            is_threshold: limits.threshold.is_some_and(|t| temp >= t),
        })
    }
}

impl fmt::Display for TempReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C [{:.1}..{:.1}]", self.temp, self.min, self.max)?;
        if self.is_panic {
            write!(f, " PANIC")?;
        } else if self.is_threshold {
            write!(f, " THRESHOLD")?;
        }
        Ok(())
    }
}

/// A temperature source
pub trait TempSensor: fmt::Debug + Send + Sync {
    /// Human-readable source, used in logs and errors
    fn describe(&self) -> String;

    fn limits(&self) -> TempLimits;

    /// Raw `(temp, min, max)` from the source, before validation
    fn read_temp(&self) -> Result<(TempCelsius, TempCelsius, TempCelsius)>;

    /// Read the source and validate it into a [`TempReading`]
    fn read(&self) -> Result<TempReading> {
        let (temp, min, max) = self.read_temp()?;
        let reading = TempReading::new(&self.describe(), temp, min, max, self.limits())?;
        debug!(
            sensor = %self.describe(),
            temp = reading.temp,
            is_panic = reading.is_panic,
            is_threshold = reading.is_threshold,
            "temperature read"
        );
        Ok(reading)
    }
}

/// Parse a decimal temperature from one line of command output
pub(crate) fn parse_celsius(origin: &str, line: &str) -> Result<TempCelsius> {
    let value = line.trim();
    value.parse::<f64>().map_err(|e| ThermalError::Parse {
        origin: origin.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}
