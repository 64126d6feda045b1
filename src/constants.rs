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

//! Constants and configuration defaults for the thermal core
//!
//! Centralizes hwmon file conventions, duty bounds and configuration
//! defaults so the sensor and actuator modules share one source of truth.

/// Temperature file conventions (Linux hwmon)
pub mod temperature {
    /// Suffix of the current-value file, e.g. `temp1_input`
    pub const INPUT_SUFFIX: &str = "_input";
    pub const MIN_SUFFIX: &str = "_min";
    pub const MAX_SUFFIX: &str = "_max";

    /// hwmon reports millidegrees Celsius
    pub const MILLIDEGREE_DIVISOR: f64 = 1000.0;

    /// Default disk temperature utility
    pub const HDDTEMP_BIN: &str = "hddtemp";
}

/// PWM conventions
pub mod pwm {
    /// Lowest raw duty accepted by hwmon and the fan board firmware
    pub const MIN_VALUE: u32 = 0;

    /// Highest raw duty accepted by hwmon and the fan board firmware
    pub const MAX_VALUE: u32 = 255;

    /// Suffix of the mode file next to `pwmN`
    pub const ENABLE_SUFFIX: &str = "_enable";

    /// PWM enable modes written to `pwmN_enable`
    pub mod enable {
        /// Hand control back to the chip/driver
        pub const AUTO: u8 = 0;
        /// Software controls the duty
        pub const MANUAL: u8 = 1;
    }

    /// Default usable duty range of a fan
    pub const DEFAULT_LINE_START: u32 = 100;
    pub const DEFAULT_LINE_END: u32 = 240;
}

/// Logging
pub mod logging {
    /// Environment variable holding the tracing filter
    pub const LOG_ENV: &str = "HF_THERMAL_LOG";
    pub const DEFAULT_LEVEL: &str = "info";
}
