/*
 * Test utilities and fake devices for hf-thermal
 *
 * This module provides fake hwmon trees, a recording PWM actuator and an
 * in-memory fan board that unit tests across modules share.
 */

#[cfg(test)]
pub mod test_utils {
    use crate::error::{Result, ThermalError};
    use crate::link::{LinkConnection, LinkPin, SharedLink};
    use crate::pwm::{FanValue, LinuxPwm, PwmFanNorm, PwmLine, PwmValue, RawPwm};
    use parking_lot::{Mutex, MutexGuard};
    use std::collections::{HashMap, HashSet};
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Raw file contents, newline included
    pub fn read_file(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    /// Writes `<name>_input` and optionally `_min`/`_max` in millidegrees.
    /// Returns the `_input` path.
    pub fn write_hwmon_temp(
        dir: &Path,
        name: &str,
        input: i64,
        min: Option<i64>,
        max: Option<i64>,
    ) -> String {
        let input_path = dir.join(format!("{}_input", name));
        fs::write(&input_path, format!("{}\n", input)).unwrap();
        if let Some(min) = min {
            fs::write(dir.join(format!("{}_min", name)), format!("{}\n", min)).unwrap();
        }
        if let Some(max) = max {
            fs::write(dir.join(format!("{}_max", name)), format!("{}\n", max)).unwrap();
        }
        input_path.to_string_lossy().to_string()
    }

    /// Script standing in for `hddtemp` that prints `output`.
    /// Returns a command usable as `hddtemp_bin`.
    pub fn fake_hddtemp(dir: &Path, output: &str) -> String {
        let out_path = dir.join("hddtemp.out");
        fs::write(&out_path, output).unwrap();
        let script = dir.join("hddtemp.sh");
        fs::write(&script, format!("cat '{}'\n", out_path.display())).unwrap();
        format!("sh {}", script.display())
    }

    /// `pwm2`, `pwm2_enable`, `fan2_input` in a temp dir, set to 0 / 0 / 1300
    pub struct PwmFiles {
        _dir: TempDir,
        pub pwm: PathBuf,
        pub pwm_enable: PathBuf,
        pub fan_input: PathBuf,
    }

    impl PwmFiles {
        pub fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let pwm = dir.path().join("pwm2");
            let pwm_enable = dir.path().join("pwm2_enable");
            let fan_input = dir.path().join("fan2_input");
            fs::write(&pwm, "0\n").unwrap();
            fs::write(&pwm_enable, "0\n").unwrap();
            fs::write(&fan_input, "1300\n").unwrap();
            Self {
                _dir: dir,
                pwm,
                pwm_enable,
                fan_input,
            }
        }

        pub fn linux_pwm(&self) -> LinuxPwm {
            LinuxPwm::new(&self.pwm, &self.fan_input)
        }

        pub fn norm_fan(&self, line_start: PwmValue, line_end: PwmValue, never_stop: bool) -> PwmFanNorm {
            PwmFanNorm::new(
                Box::new(self.linux_pwm()),
                PwmLine::new(line_start, line_end).unwrap(),
                never_stop,
            )
            .unwrap()
        }
    }

    /// In-memory actuator that records every primitive step
    #[derive(Debug)]
    pub struct RecordingPwm {
        pub duty: PwmValue,
        pub manual: bool,
        pub tach: FanValue,
        pub log: Vec<String>,
        /// Duty the "chip" falls to when manual mode is cleared
        pub duty_after_disable: Option<PwmValue>,
        pub fail_writes: bool,
        /// Number of upcoming writes that fail before writes work again
        pub failing_writes: usize,
    }

    impl RecordingPwm {
        pub fn new() -> Self {
            Self {
                duty: 0,
                manual: false,
                tach: 900,
                log: Vec::new(),
                duty_after_disable: None,
                fail_writes: false,
                failing_writes: 0,
            }
        }
    }

    impl RawPwm for RecordingPwm {
        fn id(&self) -> String {
            "recording".to_string()
        }

        fn read_duty(&self) -> Result<PwmValue> {
            Ok(self.duty)
        }

        fn write_raw(&mut self, value: PwmValue) -> Result<()> {
            if self.fail_writes || self.failing_writes > 0 {
                self.failing_writes = self.failing_writes.saturating_sub(1);
                self.log.push(format!("write {} failed", value));
                return Err(ThermalError::FileWrite {
                    path: PathBuf::from("recording"),
                    source: io::Error::new(io::ErrorKind::Other, "injected failure"),
                });
            }
            self.log.push(format!("write {}", value));
            self.duty = value;
            Ok(())
        }

        fn read_tach(&self) -> Result<FanValue> {
            Ok(self.tach)
        }

        fn enable_manual(&mut self) -> Result<()> {
            self.log.push("enable".to_string());
            self.manual = true;
            Ok(())
        }

        fn disable_manual(&mut self) -> Result<()> {
            self.log.push("disable".to_string());
            self.manual = false;
            if let Some(duty) = self.duty_after_disable {
                self.duty = duty;
            }
            Ok(())
        }

        fn settle(&mut self) -> Result<()> {
            self.log.push("settle".to_string());
            Ok(())
        }

        fn finish_release(&mut self) {
            self.log.push("finish".to_string());
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeBoardState {
        pub connected: bool,
        pub connects: usize,
        pub disconnects: usize,
        pub fail_connect: bool,
        pub pwm: HashMap<LinkPin, u32>,
        pub rpm: HashMap<LinkPin, u32>,
        /// Pins that ignore full-duty writes
        pub stuck_pins: HashSet<LinkPin>,
    }

    /// In-memory fan board; clones share state with the connections it hands out
    #[derive(Debug, Clone, Default)]
    pub struct FakeBoard {
        state: Arc<Mutex<FakeBoardState>>,
    }

    impl FakeBoard {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn state(&self) -> MutexGuard<'_, FakeBoardState> {
            self.state.lock()
        }

        pub fn link(&self, name: &str) -> SharedLink {
            SharedLink::new(
                name,
                FakeConnection {
                    state: self.state.clone(),
                },
            )
        }
    }

    struct FakeConnection {
        state: Arc<Mutex<FakeBoardState>>,
    }

    impl FakeConnection {
        fn connected(&self) -> Result<MutexGuard<'_, FakeBoardState>> {
            let state = self.state.lock();
            if !state.connected {
                return Err(ThermalError::link("fake", "not connected"));
            }
            Ok(state)
        }
    }

    impl LinkConnection for FakeConnection {
        fn is_connected(&self) -> bool {
            self.state.lock().connected
        }

        fn connect(&mut self) -> Result<()> {
            let mut state = self.state.lock();
            if state.fail_connect {
                return Err(ThermalError::link("fake", "connect refused"));
            }
            state.connected = true;
            state.connects += 1;
            Ok(())
        }

        fn disconnect(&mut self) {
            let mut state = self.state.lock();
            state.connected = false;
            state.disconnects += 1;
        }

        fn get_pwm(&mut self, pin: LinkPin) -> Result<u32> {
            Ok(self.connected()?.pwm.get(&pin).copied().unwrap_or(0))
        }

        fn get_rpm(&mut self, pin: LinkPin) -> Result<u32> {
            Ok(self.connected()?.rpm.get(&pin).copied().unwrap_or(0))
        }

        fn set_pwm(&mut self, pin: LinkPin, pwm: u32) -> Result<()> {
            let mut state = self.connected()?;
            if pwm == 255 && state.stuck_pins.contains(&pin) {
                return Ok(());
            }
            state.pwm.insert(pin, pwm);
            Ok(())
        }

        fn wait_for_settled(&mut self) -> Result<()> {
            self.connected().map(|_| ())
        }
    }
}
