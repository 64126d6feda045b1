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

//! hf-thermal - temperature sensing and PWM fan actuation for Hyperfan
//!
//! This library provides the primitives a fan control loop is built on:
//! validated temperature readings from hwmon files, `hddtemp` or shell
//! commands, and PWM fans driven through hwmon or a serial fan board with
//! a take-control/release-control protocol that always hands the fan back
//! at full speed.
//!
//! # Module Structure
//!
//! - `temp/` - temperature sensors
//! - `pwm/` - raw and normalized PWM actuators, scoped control
//! - `link` - shared serial-link connections
//! - `config` - JSON configuration of sensors and fans
//!
//! # Example
//!
//! ```no_run
//! use hf_thermal::pwm::{with_control, LinuxPwm, PwmFanNorm, PwmLine};
//! use hf_thermal::temp::{FileTemp, TempLimits, TempSensor};
//!
//! let cpu = FileTemp::new("/sys/class/hwmon/hwmon0/temp1", None, None, TempLimits::new(Some(90.0), None));
//! let reading = cpu.read().unwrap();
//!
//! let raw = LinuxPwm::new("/sys/class/hwmon/hwmon0/pwm2", "/sys/class/hwmon/hwmon0/fan2_input");
//! let mut fan = PwmFanNorm::new(Box::new(raw), PwmLine::default(), true).unwrap();
//! with_control(&mut fan, |fan| fan.set(if reading.is_threshold { 1.0 } else { 0.3 })).unwrap();
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod exec;
mod hwmon;
pub mod link;
pub mod logger;
pub mod pwm;
pub mod temp;

#[cfg(test)]
pub mod test_utils;

pub use config::{FanConfig, FanKind, LinkRegistry, TempConfig, ThermalConfig};
pub use error::{ErrorKind, Result, ThermalError};
pub use link::{LinkConnection, LinkHold, LinkPin, SharedLink};
pub use pwm::{
    acquire, with_control, DutyRange, FanValue, LinkPwm, LinkTach, LinuxPwm, LinuxTach, PwmControl,
    PwmFanNorm, PwmLine, PwmValue, RawPwm, TachReader,
};
pub use temp::{CommandTemp, FileTemp, HddTemp, TempCelsius, TempLimits, TempReading, TempSensor};
