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

use std::process::Command;

use tracing::debug;

use crate::error::{Result, ThermalError};

/// Run `command` through `sh -c` and return its stdout.
///
/// A shell is required because commands may contain globs or pipelines.
/// A non-zero exit status is an error that carries stderr.
pub fn exec_shell_command(command: &str) -> Result<String> {
    debug!(command, "exec shell command");

    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .map_err(|e| ThermalError::Command {
            command: command.to_string(),
            reason: format!("failed to spawn shell: {}", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ThermalError::Command {
            command: command.to_string(),
            reason: format!("{}: {}", output.status, stderr.trim()),
        });
    }

    String::from_utf8(output.stdout).map_err(|e| ThermalError::Command {
        command: command.to_string(),
        reason: format!("stdout is not valid UTF-8: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let out = exec_shell_command("printf '1\\n2\\n'").unwrap();
        assert_eq!(out, "1\n2\n");
    }

    #[test]
    fn test_shell_features_available() {
        let out = exec_shell_command("echo 40 | tr 4 5").unwrap();
        assert_eq!(out.trim(), "50");
    }

    #[test]
    fn test_nonzero_exit_is_error() {
        let err = exec_shell_command("echo oops >&2; exit 3").unwrap_err();
        match err {
            ThermalError::Command { command, reason } => {
                assert!(command.contains("exit 3"));
                assert!(reason.contains("oops"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
