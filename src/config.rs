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

//! Sensor and fan configuration
//!
//! JSON layout:
//!
//! ```json
//! {
//!   "temps": {
//!     "cpu": { "type": "file", "path": "/sys/class/hwmon/hwmon0/temp1_input", "panic": 90 },
//!     "hdds": { "type": "hdd", "path": "/dev/sd?", "min": 35, "max": 48 },
//!     "gpu": { "type": "exec", "command": "nvidia-smi ...", "min": 40, "max": 80 }
//!   },
//!   "fans": {
//!     "case": { "type": "linux", "pwm": "/sys/class/hwmon/hwmon0/pwm2",
//!               "fan_input": "/sys/class/hwmon/hwmon0/fan2_input" },
//!     "front": { "type": "arduino", "connection": "board", "pwm_pin": 9, "tacho_pin": 3,
//!                "pwm_line_start": 80, "never_stop": false }
//!   }
//! }
//! ```
//!
//! Building turns each entry into a sensor or actuator; validation errors
//! surface here, at startup, rather than on the first read.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::pwm::{DEFAULT_LINE_END, DEFAULT_LINE_START};
use crate::constants::temperature::HDDTEMP_BIN;
use crate::error::{Result, ThermalError};
use crate::link::{LinkPin, SharedLink};
use crate::pwm::{LinkPwm, LinkTach, LinuxPwm, LinuxTach, PwmFanNorm, PwmLine, RawPwm, TachReader};
use crate::temp::{CommandTemp, FileTemp, HddTemp, TempCelsius, TempLimits, TempSensor};

/// Serial links by connection name, owned by the daemon
pub type LinkRegistry = BTreeMap<String, SharedLink>;

fn default_hddtemp() -> String {
    HDDTEMP_BIN.to_string()
}

fn default_line_start() -> u32 {
    DEFAULT_LINE_START
}

fn default_line_end() -> u32 {
    DEFAULT_LINE_END
}

fn default_never_stop() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TempConfig {
    File {
        path: String,
        #[serde(default)]
        min: Option<TempCelsius>,
        #[serde(default)]
        max: Option<TempCelsius>,
        #[serde(default)]
        panic: Option<TempCelsius>,
        #[serde(default)]
        threshold: Option<TempCelsius>,
    },
    Hdd {
        path: String,
        min: TempCelsius,
        max: TempCelsius,
        #[serde(default)]
        panic: Option<TempCelsius>,
        #[serde(default)]
        threshold: Option<TempCelsius>,
        #[serde(default = "default_hddtemp")]
        hddtemp_bin: String,
    },
    Exec {
        command: String,
        #[serde(default)]
        min: Option<TempCelsius>,
        #[serde(default)]
        max: Option<TempCelsius>,
        #[serde(default)]
        panic: Option<TempCelsius>,
        #[serde(default)]
        threshold: Option<TempCelsius>,
    },
}

fn check_static_bounds(name: &str, min: Option<TempCelsius>, max: Option<TempCelsius>) -> Result<()> {
    if let (Some(min), Some(max)) = (min, max) {
        if !(min < max) {
            return Err(ThermalError::InvalidBounds {
                sensor: name.to_string(),
                min,
                max,
            });
        }
    }
    Ok(())
}

impl TempConfig {
    /// Build the sensor. Statically configured bounds are validated here.
    pub fn build(&self, name: &str) -> Result<Box<dyn TempSensor>> {
        let sensor: Box<dyn TempSensor> = match self {
            Self::File { path, min, max, panic, threshold } => {
                check_static_bounds(name, *min, *max)?;
                Box::new(FileTemp::new(path, *min, *max, TempLimits::new(*panic, *threshold)))
            }
            Self::Hdd { path, min, max, panic, threshold, hddtemp_bin } => {
                check_static_bounds(name, Some(*min), Some(*max))?;
                Box::new(
                    HddTemp::new(path.clone(), *min, *max, TempLimits::new(*panic, *threshold))
                        .with_hddtemp_bin(hddtemp_bin.clone()),
                )
            }
            Self::Exec { command, min, max, panic, threshold } => {
                check_static_bounds(name, *min, *max)?;
                Box::new(CommandTemp::new(command.clone(), *min, *max, TempLimits::new(*panic, *threshold)))
            }
        };
        debug!(name, sensor = %sensor.describe(), "temperature sensor configured");
        Ok(sensor)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanKind {
    #[default]
    Linux,
    Arduino,
}

/// One fan. Which fields are required depends on `type`:
/// `linux` needs `pwm` and `fan_input`, `arduino` needs `connection`,
/// `pwm_pin` and `tacho_pin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanConfig {
    #[serde(rename = "type", default)]
    pub kind: FanKind,
    #[serde(default)]
    pub pwm: Option<String>,
    #[serde(default)]
    pub fan_input: Option<String>,
    #[serde(default)]
    pub connection: Option<String>,
    #[serde(default)]
    pub pwm_pin: Option<LinkPin>,
    #[serde(default)]
    pub tacho_pin: Option<LinkPin>,
    #[serde(default = "default_line_start")]
    pub pwm_line_start: u32,
    #[serde(default = "default_line_end")]
    pub pwm_line_end: u32,
    #[serde(default = "default_never_stop")]
    pub never_stop: bool,
}

fn required<'a, T>(fan: &str, field: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| ThermalError::config(format!("fan '{}': missing required field '{}'", fan, field)))
}

impl FanConfig {
    fn resolve_link<'a>(&self, name: &str, links: &'a LinkRegistry) -> Result<&'a SharedLink> {
        let connection = required(name, "connection", &self.connection)?;
        links.get(connection).ok_or_else(|| {
            ThermalError::config(format!("fan '{}': unknown serial connection '{}'", name, connection))
        })
    }

    /// Build the normalized actuator
    pub fn build(&self, name: &str, links: &LinkRegistry) -> Result<PwmFanNorm> {
        let line = PwmLine::new(self.pwm_line_start, self.pwm_line_end)?;
        let fan = match self.kind {
            FanKind::Linux => {
                let pwm = required(name, "pwm", &self.pwm)?;
                let fan_input = required(name, "fan_input", &self.fan_input)?;
                PwmFanNorm::new(Box::new(LinuxPwm::new(pwm, fan_input)), line, self.never_stop)?
            }
            FanKind::Arduino => {
                let link = self.resolve_link(name, links)?;
                let pwm_pin = *required(name, "pwm_pin", &self.pwm_pin)?;
                let tacho_pin = *required(name, "tacho_pin", &self.tacho_pin)?;
                PwmFanNorm::new(
                    Box::new(LinkPwm::new(link.clone(), pwm_pin, tacho_pin)),
                    line,
                    self.never_stop,
                )?
            }
        };
        debug!(name, pwm = %fan.id(), "fan configured");
        Ok(fan)
    }

    /// Build only the tachometer, for read-only monitoring
    pub fn build_tach(&self, name: &str, links: &LinkRegistry) -> Result<Box<dyn TachReader>> {
        match self.kind {
            FanKind::Linux => {
                let fan_input = required(name, "fan_input", &self.fan_input)?;
                Ok(Box::new(LinuxTach::new(fan_input)))
            }
            FanKind::Arduino => {
                let link = self.resolve_link(name, links)?;
                let tacho_pin = *required(name, "tacho_pin", &self.tacho_pin)?;
                Ok(Box::new(LinkTach::new(link.clone(), tacho_pin)))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermalConfig {
    #[serde(default)]
    pub temps: BTreeMap<String, TempConfig>,
    #[serde(default)]
    pub fans: BTreeMap<String, FanConfig>,
}

impl ThermalConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ThermalError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn build_sensors(&self) -> Result<BTreeMap<String, Box<dyn TempSensor>>> {
        self.temps
            .iter()
            .map(|(name, cfg)| Ok((name.clone(), cfg.build(name)?)))
            .collect()
    }

    pub fn build_fans(&self, links: &LinkRegistry) -> Result<BTreeMap<String, PwmFanNorm>> {
        self.fans
            .iter()
            .map(|(name, cfg)| Ok((name.clone(), cfg.build(name, links)?)))
            .collect()
    }
}
