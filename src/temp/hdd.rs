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

use super::{TempCelsius, TempLimits, TempSensor};
use crate::constants::temperature::HDDTEMP_BIN;
use crate::error::{Result, ThermalError};
use crate::exec::exec_shell_command;

/// Disk temperature via `hddtemp`.
///
/// `disk_path` may be a glob (`/dev/sd?`), so the utility runs through a
/// shell. The hottest reported value wins. Disks expose no bounds, so
/// `min`/`max` are mandatory.
#[derive(Debug, Clone)]
pub struct HddTemp {
    disk_path: String,
    min: TempCelsius,
    max: TempCelsius,
    limits: TempLimits,
    hddtemp_bin: String,
}

impl HddTemp {
    pub fn new(disk_path: impl Into<String>, min: TempCelsius, max: TempCelsius, limits: TempLimits) -> Self {
        Self {
            disk_path: disk_path.into(),
            min,
            max,
            limits,
            hddtemp_bin: HDDTEMP_BIN.to_string(),
        }
    }

    /// Use a different `hddtemp` binary
    pub fn with_hddtemp_bin(mut self, bin: impl Into<String>) -> Self {
        self.hddtemp_bin = bin.into();
        self
    }

    fn shell_command(&self) -> String {
        format!("{} -n -u C \"{}\"", self.hddtemp_bin, self.disk_path)
    }

    /// Highest numeric line in `output`; non-numeric lines are skipped
    pub(crate) fn max_temperature(&self, output: &str) -> Result<TempCelsius> {
        output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| line.parse::<f64>().ok())
            .filter(|t| !t.is_nan())
            .reduce(f64::max)
            .ok_or_else(|| ThermalError::NoReading {
                origin: self.describe(),
                reason: "hddtemp returned empty list of valid temperature values".to_string(),
            })
    }
}

impl TempSensor for HddTemp {
    fn describe(&self) -> String {
        format!("HddTemp({})", self.disk_path)
    }

    fn limits(&self) -> TempLimits {
        self.limits
    }

    fn read_temp(&self) -> Result<(TempCelsius, TempCelsius, TempCelsius)> {
        let output = exec_shell_command(&self.shell_command())?;
        let temp = self.max_temperature(&output)?;
        Ok((temp, self.min, self.max))
    }
}
