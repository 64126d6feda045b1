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

//! Scoped manual control of a fan
//!
//! Release sequence, run on every exit path:
//! 1. full duty
//! 2. manual flag cleared
//! 3. settle, then read back the duty; it must be at the device maximum
//!
//! A fan left below full duty in manual mode may overheat the machine, so a
//! failed read-back is reported as a fatal error.

use std::ops::{Deref, DerefMut};

use tracing::{error, info};

use super::RawPwm;
use crate::error::{Result, ThermalError};

/// Manual control of a fan, released when dropped.
///
/// Prefer [`PwmControl::release`] or [`with_control`] where the release
/// outcome matters; a drop can only log a failure.
#[must_use = "dropping the guard immediately hands the fan back"]
pub struct PwmControl<'a, P: RawPwm + ?Sized> {
    pwm: &'a mut P,
    released: bool,
}

/// Switch `pwm` to manual mode at full duty.
///
/// If full duty cannot be set after manual mode was enabled, the release
/// sequence runs before the error is returned. A failed release is attached
/// to that error, which makes it fatal.
pub fn acquire<P: RawPwm + ?Sized>(pwm: &mut P) -> Result<PwmControl<'_, P>> {
    pwm.enable_manual()?;
    let mut control = PwmControl {
        pwm,
        released: false,
    };
    if let Err(e) = control.pwm.set_full_duty() {
        return Err(match control.release_inner() {
            Ok(()) => e,
            Err(release) => e.with_release_failure(release),
        });
    }
    info!(pwm = %control.pwm.id(), "manual PWM control acquired");
    Ok(control)
}

/// Run `body` under manual control and always release afterwards.
///
/// An error from `body` is returned even when release also fails; the
/// release failure is attached to it.
pub fn with_control<P, T, F>(pwm: &mut P, body: F) -> Result<T>
where
    P: RawPwm + ?Sized,
    F: FnOnce(&mut P) -> Result<T>,
{
    let mut control = acquire(pwm)?;
    let outcome = body(&mut *control);
    let released = control.release();

    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(release)) => Err(release),
        (Err(primary), Ok(())) => Err(primary),
        (Err(primary), Err(release)) => Err(primary.with_release_failure(release)),
    }
}

impl<'a, P: RawPwm + ?Sized> PwmControl<'a, P> {
    /// Re-confirm manual mode and full duty without releasing
    pub fn reacquire(&mut self) -> Result<()> {
        self.pwm.enable_manual()?;
        self.pwm.set_full_duty()
    }

    /// Hand the fan back to automatic mode and verify it runs at full duty
    pub fn release(mut self) -> Result<()> {
        self.release_inner()
    }

    fn release_inner(&mut self) -> Result<()> {
        self.released = true;
        let pwm = &mut *self.pwm;
        let id = pwm.id();

        // Every step is attempted even if an earlier one failed
        let full = pwm.set_full_duty();
        let disabled = pwm.disable_manual();
        let verified = full.and(disabled).and_then(|()| {
            pwm.settle()?;
            let duty = pwm.read_duty()?;
            let expected = pwm.duty_range().max;
            if duty >= expected {
                Ok(())
            } else {
                Err(ThermalError::ReleaseVerification {
                    actuator: id.clone(),
                    duty,
                    expected,
                })
            }
        });
        pwm.finish_release();

        match verified {
            Ok(()) => {
                info!(pwm = %id, "manual PWM control released");
                Ok(())
            }
            Err(e @ ThermalError::ReleaseVerification { .. }) => Err(e),
            Err(e) => Err(ThermalError::Release {
                actuator: id,
                reason: e.to_string(),
            }),
        }
    }
}

impl<P: RawPwm + ?Sized> Deref for PwmControl<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.pwm
    }
}

impl<P: RawPwm + ?Sized> DerefMut for PwmControl<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.pwm
    }
}

impl<P: RawPwm + ?Sized> Drop for PwmControl<'_, P> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.release_inner() {
            error!(
                pwm = %self.pwm.id(),
                panicking = std::thread::panicking(),
                "failed to release manual PWM control: {}",
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_utils::test_utils::RecordingPwm;

    #[test]
    fn test_acquire_enables_manual_at_full_duty() {
        let mut pwm = RecordingPwm::new();
        {
            let control = acquire(&mut pwm).unwrap();
            assert!(control.manual);
            assert_eq!(control.duty, 255);
        }
        assert!(!pwm.manual);
        assert_eq!(pwm.duty, 255);
        assert_eq!(
            pwm.log,
            vec!["enable", "write 255", "write 255", "disable", "settle", "finish"]
        );
    }

    #[test]
    fn test_writes_through_guard() {
        let mut pwm = RecordingPwm::new();
        let mut control = acquire(&mut pwm).unwrap();
        control.write_duty(142).unwrap();
        assert_eq!(control.duty, 142);
        control.release().unwrap();
        assert_eq!(pwm.duty, 255);
    }

    #[test]
    fn test_release_runs_when_body_fails() {
        let mut pwm = RecordingPwm::new();
        let result: Result<()> = with_control(&mut pwm, |p| {
            p.write_duty(100)?;
            Err(ThermalError::config("control loop gave up"))
        });

        assert!(matches!(result, Err(ThermalError::Config(_))));
        assert!(!pwm.manual);
        assert_eq!(pwm.duty, 255);
    }

    #[test]
    fn test_release_runs_on_panic() {
        let mut pwm = RecordingPwm::new();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut control = acquire(&mut pwm).unwrap();
            control.write_duty(0).unwrap();
            panic!("control loop crashed");
        }));

        assert!(outcome.is_err());
        assert!(!pwm.manual);
        assert_eq!(pwm.duty, 255);
    }

    #[test]
    fn test_verification_failure_is_fatal() {
        let mut pwm = RecordingPwm::new();
        // Chip drops to a low duty when handed back
        pwm.duty_after_disable = Some(80);

        let err = with_control(&mut pwm, |_| Ok(())).unwrap_err();
        assert!(matches!(
            err,
            ThermalError::ReleaseVerification { duty: 80, expected: 255, .. }
        ));
        assert!(err.is_fatal());
        assert_eq!(pwm.log.last().map(String::as_str), Some("finish"));
    }

    #[test]
    fn test_body_error_kept_when_release_fails() {
        let mut pwm = RecordingPwm::new();
        pwm.duty_after_disable = Some(0);

        let err = with_control(&mut pwm, |_| -> Result<()> {
            Err(ThermalError::config("boom"))
        })
        .unwrap_err();

        match err {
            ThermalError::ReleaseAfterError { primary, release } => {
                assert!(matches!(*primary, ThermalError::Config(_)));
                assert!(matches!(*release, ThermalError::ReleaseVerification { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failed_full_duty_after_enable_still_releases() {
        let mut pwm = RecordingPwm::new();
        pwm.fail_writes = true;

        let err = acquire(&mut pwm).err().unwrap();
        // Release could not write full duty either, so the fan may be stuck
        match &err {
            ThermalError::ReleaseAfterError { primary, release } => {
                assert!(matches!(**primary, ThermalError::FileWrite { .. }));
                assert!(matches!(**release, ThermalError::Release { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_fatal());
        assert!(!pwm.manual);
        assert_eq!(
            pwm.log,
            vec!["enable", "write 255 failed", "write 255 failed", "disable", "finish"]
        );
    }

    #[test]
    fn test_failed_full_duty_with_clean_release_keeps_error() {
        let mut pwm = RecordingPwm::new();
        pwm.failing_writes = 1;

        let err = acquire(&mut pwm).err().unwrap();
        assert!(matches!(err, ThermalError::FileWrite { .. }));
        assert_eq!(err.kind(), ErrorKind::SourceRead);
        assert!(!pwm.manual);
        assert_eq!(pwm.duty, 255);
        assert_eq!(
            pwm.log,
            vec!["enable", "write 255 failed", "write 255", "disable", "settle", "finish"]
        );
    }

    #[test]
    fn test_io_failure_during_release_is_release_error() {
        let mut pwm = RecordingPwm::new();
        let mut control = acquire(&mut pwm).unwrap();
        control.fail_writes = true;

        let err = control.release().unwrap_err();
        assert!(matches!(err, ThermalError::Release { .. }));
        assert_eq!(err.kind(), ErrorKind::ReleaseVerification);
        assert!(!pwm.manual);
    }

    #[test]
    fn test_reacquire_and_reuse() {
        let mut pwm = RecordingPwm::new();

        let mut control = acquire(&mut pwm).unwrap();
        control.write_duty(120).unwrap();
        control.reacquire().unwrap();
        assert!(control.manual);
        assert_eq!(control.duty, 255);
        control.release().unwrap();

        // Same actuator can be acquired again after a release
        with_control(&mut pwm, |p| p.write_duty(130)).unwrap();
        assert!(!pwm.manual);
        assert_eq!(pwm.duty, 255);
    }

    #[test]
    fn test_out_of_range_write_under_control() {
        let mut pwm = RecordingPwm::new();
        let err = with_control(&mut pwm, |p| p.write_duty(256)).unwrap_err();
        assert!(matches!(err, ThermalError::DutyOutOfRange { .. }));
        assert!(!pwm.log.contains(&"write 256".to_string()));
    }
}
