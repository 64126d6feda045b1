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

//! hf-thermal-probe: read every configured sensor once.
//!
//! Never takes control of a fan; safe to run next to the daemon.

use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};

use hf_thermal::config::{FanKind, LinkRegistry, ThermalConfig};
use hf_thermal::logger;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!("hf-thermal-probe {}", VERSION);
    println!();
    println!("Usage: hf-thermal-probe <config.json> [--fans]");
    println!();
    println!("Options:");
    println!("  --fans         Also read tachometers of hwmon fans");
    println!("  -h, --help     Show this help");
    println!("  -v, --version  Show version");
    println!();
    println!("Log filter is taken from HF_THERMAL_LOG (default: info)");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut read_fans = false;

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-v" | "--version" => {
                println!("hf-thermal-probe {}", VERSION);
                return Ok(());
            }
            "--fans" => read_fans = true,
            other if other.starts_with('-') => {
                eprintln!("Unknown argument: {}", other);
                print_help();
                std::process::exit(1);
            }
            other => config_path = Some(PathBuf::from(other)),
        }
    }

    let Some(config_path) = config_path else {
        print_help();
        std::process::exit(1);
    };

    logger::init_tracing(&logger::log_level_from_env());

    let config = ThermalConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    info!("Loaded {} sensor(s), {} fan(s)", config.temps.len(), config.fans.len());

    let sensors = config.build_sensors().context("configuring sensors")?;
    let mut failures = 0;
    for (name, sensor) in &sensors {
        match sensor.read() {
            Ok(reading) => println!("{:<16} {}", name, reading),
            Err(e) => {
                failures += 1;
                println!("{:<16} ERROR: {}", name, e);
            }
        }
    }

    if read_fans {
        // Serial boards are owned by the daemon; only hwmon fans are probed
        let links = LinkRegistry::new();
        for (name, fan) in &config.fans {
            if fan.kind != FanKind::Linux {
                warn!("Skipping fan {}: serial-link fans are not probed", name);
                continue;
            }
            let tach = fan
                .build_tach(name, &links)
                .with_context(|| format!("configuring fan {}", name))?;
            match tach.read_tach() {
                Ok(rpm) => println!("{:<16} {} RPM", name, rpm),
                Err(e) => {
                    failures += 1;
                    println!("{:<16} ERROR: {}", name, e);
                }
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} source(s) could not be read", failures);
    }
    Ok(())
}
