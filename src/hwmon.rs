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

//! Low-level hwmon attribute access shared by file-backed sensors and fans.
//!
//! Attributes are plain decimal integers, newline-terminated on read.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, ThermalError};

pub(crate) fn read_trimmed(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|source| ThermalError::FileRead {
            path: path.to_path_buf(),
            source,
        })
}

/// Read and parse a single integer attribute
pub(crate) fn read_value<T>(path: &Path) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = read_trimmed(path)?;
    raw.parse::<T>().map_err(|e| ThermalError::Parse {
        origin: path.display().to_string(),
        value: raw.clone(),
        reason: e.to_string(),
    })
}

pub(crate) fn write_value(path: &Path, value: impl ToString) -> Result<()> {
    fs::write(path, value.to_string()).map_err(|source| ThermalError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// `/sys/.../pwm2` + `_enable` -> `/sys/.../pwm2_enable`
pub(crate) fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s = base.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}
