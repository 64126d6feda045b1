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

use super::{parse_celsius, TempCelsius, TempLimits, TempSensor};
use crate::error::{Result, ThermalError};
use crate::exec::exec_shell_command;

/// Temperature from an arbitrary shell command.
///
/// Output format, one value per non-empty line:
///
/// ```text
/// <temp>
/// <min>   (only read when `min` is not configured)
/// <max>   (only read when `max` is not configured)
/// ```
///
/// The line positions are fixed: a command used with a configured `min`
/// but no `max` must still print a (ignored) second line.
#[derive(Debug, Clone)]
pub struct CommandTemp {
    shell_command: String,
    min: Option<TempCelsius>,
    max: Option<TempCelsius>,
    limits: TempLimits,
}

impl CommandTemp {
    pub fn new(
        shell_command: impl Into<String>,
        min: Option<TempCelsius>,
        max: Option<TempCelsius>,
        limits: TempLimits,
    ) -> Self {
        Self {
            shell_command: shell_command.into(),
            min,
            max,
            limits,
        }
    }

    pub(crate) fn parse_output(&self, output: &str) -> Result<(TempCelsius, TempCelsius, TempCelsius)> {
        let origin = self.describe();
        let temps = output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| parse_celsius(&origin, line))
            .collect::<Result<Vec<_>>>()?;

        let line = |idx: usize, what: &str| -> Result<TempCelsius> {
            temps.get(idx).copied().ok_or_else(|| ThermalError::NoReading {
                origin: origin.clone(),
                reason: format!(
                    "expected {} on output line {}, command printed {} line(s)",
                    what,
                    idx,
                    temps.len()
                ),
            })
        };

        let temp = line(0, "temperature")?;
        let min = match self.min {
            Some(min) => min,
            None => line(1, "min temperature")?,
        };
        let max = match self.max {
            Some(max) => max,
            None => line(2, "max temperature")?,
        };
        Ok((temp, min, max))
    }
}

impl TempSensor for CommandTemp {
    fn describe(&self) -> String {
        format!("CommandTemp({})", self.shell_command)
    }

    fn limits(&self) -> TempLimits {
        self.limits
    }

    fn read_temp(&self) -> Result<(TempCelsius, TempCelsius, TempCelsius)> {
        let output = exec_shell_command(&self.shell_command)?;
        self.parse_output(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_values_from_command() {
        let sensor = CommandTemp::new("printf '47.0\\n30\\n85\\n'", None, None, TempLimits::default());
        let reading = sensor.read().unwrap();
        assert_eq!((reading.temp, reading.min, reading.max), (47.0, 30.0, 85.0));
    }

    #[test]
    fn test_configured_bounds_take_precedence() {
        let sensor = CommandTemp::new("echo 47.0", Some(20.0), Some(60.0), TempLimits::new(Some(45.0), None));
        let reading = sensor.read().unwrap();
        assert_eq!((reading.temp, reading.min, reading.max), (47.0, 20.0, 60.0));
        assert!(reading.is_panic);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let sensor = CommandTemp::new("true", None, Some(90.0), TempLimits::default());
        let parsed = sensor.parse_output("\n  50.5 \n\n 25 \n").unwrap();
        assert_eq!(parsed, (50.5, 25.0, 90.0));
    }

    #[test]
    fn test_max_line_position_is_fixed() {
        // min configured, max not: max still comes from line 2
        let sensor = CommandTemp::new("true", Some(10.0), None, TempLimits::default());
        assert_eq!(sensor.parse_output("40\n0\n70\n").unwrap(), (40.0, 10.0, 70.0));

        let err = sensor.parse_output("40\n70\n").unwrap_err();
        assert!(matches!(err, ThermalError::NoReading { .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_too_few_lines() {
        let sensor = CommandTemp::new("echo 40", None, None, TempLimits::default());
        assert!(matches!(sensor.read(), Err(ThermalError::NoReading { .. })));

        let sensor = CommandTemp::new("true", Some(0.0), Some(100.0), TempLimits::default());
        assert!(matches!(sensor.read(), Err(ThermalError::NoReading { .. })));
    }

    #[test]
    fn test_non_numeric_line_is_parse_error() {
        let sensor = CommandTemp::new("echo hot", Some(0.0), Some(100.0), TempLimits::default());
        assert!(matches!(sensor.read(), Err(ThermalError::Parse { .. })));
    }

    #[test]
    fn test_command_failure() {
        let sensor = CommandTemp::new("exit 1", Some(0.0), Some(100.0), TempLimits::default());
        assert!(matches!(sensor.read(), Err(ThermalError::Command { .. })));
    }
}
