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

use tracing::debug;

use super::{FanValue, PwmValue, RawPwm, TachReader};
use crate::error::Result;
use crate::link::{LinkHold, LinkPin, SharedLink};

/// Tachometer pin on a serial fan board
#[derive(Debug, Clone)]
pub struct LinkTach {
    link: SharedLink,
    tacho_pin: LinkPin,
}

impl LinkTach {
    pub fn new(link: SharedLink, tacho_pin: LinkPin) -> Self {
        Self { link, tacho_pin }
    }

    /// Keep the board connected while reading outside of a PWM scope
    pub fn open(&self) -> Result<LinkHold> {
        self.link.hold()
    }
}

impl TachReader for LinkTach {
    fn read_tach(&self) -> Result<FanValue> {
        self.link.get_rpm(self.tacho_pin)
    }
}

/// PWM pin on a serial fan board.
///
/// The board firmware has no separate mode flag: manual control lasts as
/// long as the link is held, and the board falls back to full speed on its
/// own once the host goes away. Enabling manual mode therefore means
/// holding the link, and disabling it is a no-op at the pin level.
#[derive(Debug)]
pub struct LinkPwm {
    link: SharedLink,
    pwm_pin: LinkPin,
    tach: LinkTach,
    hold: Option<LinkHold>,
}

impl LinkPwm {
    pub fn new(link: SharedLink, pwm_pin: LinkPin, tacho_pin: LinkPin) -> Self {
        Self {
            tach: LinkTach::new(link.clone(), tacho_pin),
            link,
            pwm_pin,
            hold: None,
        }
    }

    /// Whether this actuator currently keeps the link open
    pub fn is_holding_link(&self) -> bool {
        self.hold.is_some()
    }
}

impl RawPwm for LinkPwm {
    fn id(&self) -> String {
        format!("{}:{}", self.link.name(), self.pwm_pin)
    }

    fn read_duty(&self) -> Result<PwmValue> {
        self.link.get_pwm(self.pwm_pin)
    }

    fn write_raw(&mut self, value: PwmValue) -> Result<()> {
        debug!(link = %self.link.name(), pin = self.pwm_pin.0, value, "pwm write");
        self.link.set_pwm(self.pwm_pin, value)
    }

    fn read_tach(&self) -> Result<FanValue> {
        self.tach.read_tach()
    }

    fn enable_manual(&mut self) -> Result<()> {
        // Re-entry keeps the existing hold but must find the link open
        if self.hold.is_some() {
            return self.link.ensure_connected();
        }
        self.hold = Some(self.link.hold()?);
        Ok(())
    }

    fn disable_manual(&mut self) -> Result<()> {
        Ok(())
    }

    fn settle(&mut self) -> Result<()> {
        self.link.wait_for_settled()
    }

    fn finish_release(&mut self) {
        self.hold = None;
    }
}
