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

//! PWM fan actuators
//!
//! # PWM Values
//!
//! Raw duty values range from 0 to 255 on both hwmon and the serial fan
//! board:
//! - 0 = fan off (or minimum speed on some fans)
//! - 255 = full speed
//!
//! # Control
//!
//! Software may only write duty values after taking the fan out of
//! automatic mode. [`acquire`] does that and returns a [`PwmControl`]
//! guard which always hands the fan back at full duty when dropped.

mod control;
mod link;
mod linux;
mod norm;

pub use control::{acquire, with_control, PwmControl};
pub use link::{LinkPwm, LinkTach};
pub use linux::{LinuxPwm, LinuxTach};
pub use norm::{PwmFanNorm, PwmLine};

use std::fmt;

use crate::constants::pwm;
use crate::error::{Result, ThermalError};

/// Raw duty cycle value
pub type PwmValue = u32;

/// Tachometer value (RPM)
pub type FanValue = u32;

/// Closed range of raw duty values a device accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyRange {
    pub min: PwmValue,
    pub max: PwmValue,
}

impl DutyRange {
    /// 0..=255, used by hwmon and the fan board
    pub const STANDARD: DutyRange = DutyRange {
        min: pwm::MIN_VALUE,
        max: pwm::MAX_VALUE,
    };

    pub fn contains(&self, value: i64) -> bool {
        value >= i64::from(self.min) && value <= i64::from(self.max)
    }

    /// Validate `value` for `actuator` before any I/O happens
    pub fn check(&self, actuator: &str, value: i64) -> Result<PwmValue> {
        if !self.contains(value) {
            return Err(ThermalError::DutyOutOfRange {
                actuator: actuator.to_string(),
                value,
                min: self.min,
                max: self.max,
            });
        }
        // In range, so it fits
        Ok(value as PwmValue)
    }
}

impl Default for DutyRange {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Reads a fan's tachometer
pub trait TachReader: fmt::Debug + Send {
    fn read_tach(&self) -> Result<FanValue>;
}

/// A fan's raw PWM control line
///
/// Implementors provide the primitive steps; the range check and the
/// acquire/release protocol are shared.
pub trait RawPwm: fmt::Debug + Send {
    /// Identifier used in logs and errors (path or link pin)
    fn id(&self) -> String;

    fn duty_range(&self) -> DutyRange {
        DutyRange::STANDARD
    }

    fn read_duty(&self) -> Result<PwmValue>;

    /// Write a duty value that has already been range-checked
    fn write_raw(&mut self, value: PwmValue) -> Result<()>;

    fn read_tach(&self) -> Result<FanValue>;

    /// Take the control line out of automatic mode
    fn enable_manual(&mut self) -> Result<()>;

    /// Hand the control line back to automatic mode
    fn disable_manual(&mut self) -> Result<()>;

    /// Wait until prior writes are visible to `read_duty`
    fn settle(&mut self) -> Result<()> {
        Ok(())
    }

    /// Drop resources taken by `enable_manual`. Runs last during release.
    fn finish_release(&mut self) {}

    /// Range-checked duty write
    fn write_duty(&mut self, value: i64) -> Result<()> {
        let duty = self.duty_range().check(&self.id(), value)?;
        self.write_raw(duty)
    }

    fn set_full_duty(&mut self) -> Result<()> {
        let max = self.duty_range().max;
        self.write_raw(max)
    }
}

impl<P: RawPwm + ?Sized> RawPwm for Box<P> {
    fn id(&self) -> String {
        (**self).id()
    }

    fn duty_range(&self) -> DutyRange {
        (**self).duty_range()
    }

    fn read_duty(&self) -> Result<PwmValue> {
        (**self).read_duty()
    }

    fn write_raw(&mut self, value: PwmValue) -> Result<()> {
        (**self).write_raw(value)
    }

    fn read_tach(&self) -> Result<FanValue> {
        (**self).read_tach()
    }

    fn enable_manual(&mut self) -> Result<()> {
        (**self).enable_manual()
    }

    fn disable_manual(&mut self) -> Result<()> {
        (**self).disable_manual()
    }

    fn settle(&mut self) -> Result<()> {
        (**self).settle()
    }

    fn finish_release(&mut self) {
        (**self).finish_release()
    }

    fn write_duty(&mut self, value: i64) -> Result<()> {
        (**self).write_duty(value)
    }

    fn set_full_duty(&mut self) -> Result<()> {
        (**self).set_full_duty()
    }
}
