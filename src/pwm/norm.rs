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

//! Normalized fan speed
//!
//! `get()` reports duty as a fraction of the device's absolute maximum, so
//! values compare across fans. `set()` only writes inside the fan's line
//! range:
//!
//! ```text
//! speed <= 0      -> 0 (never_stop = false) or line_start (never_stop = true)
//! 0 < speed < 1   -> max(line_start, ceil(speed * line_end))
//! speed >= 1      -> line_end
//! ```

use tracing::debug;

use super::{acquire, DutyRange, FanValue, PwmControl, PwmValue, RawPwm};
use crate::constants::pwm::{DEFAULT_LINE_END, DEFAULT_LINE_START, MIN_VALUE};
use crate::error::{Result, ThermalError};

/// Usable duty range of a fan. Below `start` the fan may stall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmLine {
    start: PwmValue,
    end: PwmValue,
}

impl PwmLine {
    pub fn new(start: PwmValue, end: PwmValue) -> Result<Self> {
        if start >= end {
            return Err(ThermalError::InvalidPwmLine {
                start,
                end,
                reason: "pwm_line_start must be less than pwm_line_end".to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> PwmValue {
        self.start
    }

    pub fn end(&self) -> PwmValue {
        self.end
    }

    fn check_within(&self, range: DutyRange) -> Result<()> {
        if self.start < range.min || self.end > range.max {
            return Err(ThermalError::InvalidPwmLine {
                start: self.start,
                end: self.end,
                reason: format!("must lie within [{}, {}]", range.min, range.max),
            });
        }
        Ok(())
    }
}

impl Default for PwmLine {
    fn default() -> Self {
        Self {
            start: DEFAULT_LINE_START,
            end: DEFAULT_LINE_END,
        }
    }
}

/// A raw PWM actuator driven by speed fractions
#[derive(Debug)]
pub struct PwmFanNorm {
    raw: Box<dyn RawPwm>,
    line: PwmLine,
    never_stop: bool,
}

impl PwmFanNorm {
    /// Fails if `line` does not fit the actuator's duty range
    pub fn new(raw: Box<dyn RawPwm>, line: PwmLine, never_stop: bool) -> Result<Self> {
        line.check_within(raw.duty_range())?;
        Ok(Self {
            raw,
            line,
            never_stop,
        })
    }

    pub fn line(&self) -> PwmLine {
        self.line
    }

    pub fn never_stop(&self) -> bool {
        self.never_stop
    }

    /// Current duty as a fraction of the absolute maximum duty
    pub fn get(&self) -> Result<f64> {
        let duty = self.raw.read_duty()?;
        Ok(f64::from(duty) / f64::from(self.raw.duty_range().max))
    }

    /// Duty that `set(speed)` writes. Monotonic in `speed`.
    pub fn map_speed(&self, speed: f64) -> PwmValue {
        // NaN.min(1.0) is 1.0, so garbage input runs the fan at line_end
        let speed = speed.min(1.0);
        if speed <= 0.0 {
            return if self.never_stop {
                self.line.start
            } else {
                MIN_VALUE
            };
        }
        let scaled = (speed * f64::from(self.line.end)).ceil() as PwmValue;
        scaled.clamp(self.line.start, self.line.end)
    }

    /// Write `speed` and return the raw duty written
    pub fn set(&mut self, speed: f64) -> Result<PwmValue> {
        let duty = self.map_speed(speed);
        self.raw.write_duty(i64::from(duty))?;
        debug!(pwm = %self.raw.id(), speed, duty, "normalized pwm set");
        Ok(duty)
    }

    pub fn set_full_speed(&mut self) -> Result<()> {
        self.raw.set_full_duty()
    }

    pub fn get_speed(&self) -> Result<FanValue> {
        self.raw.read_tach()
    }

    /// Take manual control of the wrapped actuator
    pub fn acquire(&mut self) -> Result<PwmControl<'_, Self>> {
        acquire(self)
    }
}

impl RawPwm for PwmFanNorm {
    fn id(&self) -> String {
        self.raw.id()
    }

    fn duty_range(&self) -> DutyRange {
        self.raw.duty_range()
    }

    fn read_duty(&self) -> Result<PwmValue> {
        self.raw.read_duty()
    }

    fn write_raw(&mut self, value: PwmValue) -> Result<()> {
        self.raw.write_raw(value)
    }

    fn read_tach(&self) -> Result<FanValue> {
        self.raw.read_tach()
    }

    fn enable_manual(&mut self) -> Result<()> {
        self.raw.enable_manual()
    }

    fn disable_manual(&mut self) -> Result<()> {
        self.raw.disable_manual()
    }

    fn settle(&mut self) -> Result<()> {
        self.raw.settle()
    }

    fn finish_release(&mut self) {
        self.raw.finish_release()
    }
}
