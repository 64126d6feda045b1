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

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{FanValue, PwmValue, RawPwm, TachReader};
use crate::constants::pwm::{enable, ENABLE_SUFFIX};
use crate::error::Result;
use crate::hwmon;

/// hwmon fan tachometer, e.g. `/sys/class/hwmon/hwmon0/fan2_input`
#[derive(Debug, Clone)]
pub struct LinuxTach {
    fan_input: PathBuf,
}

impl LinuxTach {
    pub fn new(fan_input: impl Into<PathBuf>) -> Self {
        Self {
            fan_input: fan_input.into(),
        }
    }
}

impl TachReader for LinuxTach {
    fn read_tach(&self) -> Result<FanValue> {
        hwmon::read_value(&self.fan_input)
    }
}

/// hwmon PWM control line, e.g. `/sys/class/hwmon/hwmon0/pwm2`.
///
/// The mode file `pwm2_enable` is derived from the pwm path. The tachometer
/// is passed separately because hwmon numbers fan inputs independently of
/// PWM outputs.
#[derive(Debug, Clone)]
pub struct LinuxPwm {
    pwm: PathBuf,
    pwm_enable: PathBuf,
    tach: LinuxTach,
}

impl LinuxPwm {
    pub fn new(pwm: impl Into<PathBuf>, fan_input: impl Into<PathBuf>) -> Self {
        let pwm = pwm.into();
        Self {
            pwm_enable: hwmon::with_suffix(&pwm, ENABLE_SUFFIX),
            pwm,
            tach: LinuxTach::new(fan_input),
        }
    }

    pub fn pwm_path(&self) -> &Path {
        &self.pwm
    }

    pub fn enable_path(&self) -> &Path {
        &self.pwm_enable
    }
}

impl RawPwm for LinuxPwm {
    fn id(&self) -> String {
        self.pwm.display().to_string()
    }

    fn read_duty(&self) -> Result<PwmValue> {
        hwmon::read_value(&self.pwm)
    }

    fn write_raw(&mut self, value: PwmValue) -> Result<()> {
        debug!(pwm = %self.pwm.display(), value, "pwm write");
        hwmon::write_value(&self.pwm, value)
    }

    fn read_tach(&self) -> Result<FanValue> {
        self.tach.read_tach()
    }

    fn enable_manual(&mut self) -> Result<()> {
        hwmon::write_value(&self.pwm_enable, enable::MANUAL)
    }

    fn disable_manual(&mut self) -> Result<()> {
        hwmon::write_value(&self.pwm_enable, enable::AUTO)
    }
}
