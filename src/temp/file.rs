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

use lazy_static::lazy_static;
use regex::Regex;

use super::{TempCelsius, TempLimits, TempSensor};
use crate::constants::temperature::{INPUT_SUFFIX, MAX_SUFFIX, MILLIDEGREE_DIVISOR, MIN_SUFFIX};
use crate::error::Result;
use crate::hwmon;

lazy_static! {
    static ref INPUT_SUFFIX_RE: Regex = Regex::new(r"_input$").expect("static regex");
}

/// hwmon temperature sensor, e.g. `/sys/class/hwmon/hwmon0/temp1`.
///
/// Reads `temp1_input`, and `temp1_min`/`temp1_max` unless static bounds
/// are configured.
#[derive(Debug, Clone)]
pub struct FileTemp {
    temp_input: PathBuf,
    temp_min: PathBuf,
    temp_max: PathBuf,
    min: Option<TempCelsius>,
    max: Option<TempCelsius>,
    limits: TempLimits,
}

impl FileTemp {
    /// `temp_path` may be given with or without the `_input` suffix
    pub fn new(
        temp_path: &str,
        min: Option<TempCelsius>,
        max: Option<TempCelsius>,
        limits: TempLimits,
    ) -> Self {
        let base = PathBuf::from(INPUT_SUFFIX_RE.replace(temp_path, "").into_owned());
        Self {
            temp_input: hwmon::with_suffix(&base, INPUT_SUFFIX),
            temp_min: hwmon::with_suffix(&base, MIN_SUFFIX),
            temp_max: hwmon::with_suffix(&base, MAX_SUFFIX),
            min,
            max,
            limits,
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.temp_input
    }

    fn read_celsius(path: &Path) -> Result<TempCelsius> {
        let millidegrees: i64 = hwmon::read_value(path)?;
        Ok(millidegrees as f64 / MILLIDEGREE_DIVISOR)
    }
}

impl TempSensor for FileTemp {
    fn describe(&self) -> String {
        format!("FileTemp({})", self.temp_input.display())
    }

    fn limits(&self) -> TempLimits {
        self.limits
    }

    fn read_temp(&self) -> Result<(TempCelsius, TempCelsius, TempCelsius)> {
        let temp = Self::read_celsius(&self.temp_input)?;
        let min = match self.min {
            Some(min) => min,
            None => Self::read_celsius(&self.temp_min)?,
        };
        let max = match self.max {
            Some(max) => max,
            None => Self::read_celsius(&self.temp_max)?,
        };
        Ok((temp, min, max))
    }
}
