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

//! Serial-link fan boards
//!
//! A microcontroller board drives several fans over one serial link.
//! Framing and pin addressing belong to the [`LinkConnection`]
//! implementation; this module only brokers the connection between the
//! actuators that share it.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Pin number on the fan board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkPin(pub u8);

impl fmt::Display for LinkPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pin {}", self.0)
    }
}

/// Connection to a fan board. Implemented outside this crate.
#[cfg_attr(test, mockall::automock)]
pub trait LinkConnection: Send {
    fn is_connected(&self) -> bool;

    fn connect(&mut self) -> Result<()>;

    fn disconnect(&mut self);

    /// Raw duty currently applied on a PWM pin
    fn get_pwm(&mut self, pin: LinkPin) -> Result<u32>;

    /// Tachometer reading of a fan pin
    fn get_rpm(&mut self, pin: LinkPin) -> Result<u32>;

    fn set_pwm(&mut self, pin: LinkPin, pwm: u32) -> Result<()>;

    /// Block until the board has reported state reflecting all prior writes
    fn wait_for_settled(&mut self) -> Result<()>;
}

struct LinkState {
    conn: Box<dyn LinkConnection>,
    holders: usize,
}

/// Reference-counted handle to one board connection.
///
/// Clones share the connection. Each [`LinkHold`] keeps it open; the link
/// disconnects when the last hold is dropped.
#[derive(Clone)]
pub struct SharedLink {
    name: Arc<str>,
    state: Arc<Mutex<LinkState>>,
}

impl fmt::Debug for SharedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedLink")
            .field("name", &self.name)
            .field("holders", &self.holders())
            .finish()
    }
}

impl SharedLink {
    pub fn new(name: impl Into<String>, conn: impl LinkConnection + 'static) -> Self {
        let name: String = name.into();
        Self {
            name: Arc::from(name),
            state: Arc::new(Mutex::new(LinkState {
                conn: Box::new(conn),
                holders: 0,
            })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of live holds
    pub fn holders(&self) -> usize {
        self.state.lock().holders
    }

    /// Keep the link open, connecting first if needed
    pub fn hold(&self) -> Result<LinkHold> {
        let mut state = self.state.lock();
        if !state.conn.is_connected() {
            info!(link = %self.name, "connecting serial link");
            state.conn.connect()?;
        }
        state.holders += 1;
        debug!(link = %self.name, holders = state.holders, "link hold acquired");
        Ok(LinkHold { link: self.clone() })
    }

    /// Reconnect a link that dropped while held. The holder count is unchanged.
    pub fn ensure_connected(&self) -> Result<()> {
        let mut state = self.state.lock();
        if !state.conn.is_connected() {
            info!(link = %self.name, holders = state.holders, "reconnecting serial link");
            state.conn.connect()?;
        }
        Ok(())
    }

    fn release_hold(&self) {
        let mut state = self.state.lock();
        if state.holders == 0 {
            warn!(link = %self.name, "link hold released more often than acquired");
            return;
        }
        state.holders -= 1;
        debug!(link = %self.name, holders = state.holders, "link hold released");
        if state.holders == 0 {
            info!(link = %self.name, "disconnecting serial link");
            state.conn.disconnect();
        }
    }

    pub fn get_pwm(&self, pin: LinkPin) -> Result<u32> {
        self.state.lock().conn.get_pwm(pin)
    }

    pub fn get_rpm(&self, pin: LinkPin) -> Result<u32> {
        self.state.lock().conn.get_rpm(pin)
    }

    pub fn set_pwm(&self, pin: LinkPin, pwm: u32) -> Result<()> {
        self.state.lock().conn.set_pwm(pin, pwm)
    }

    pub fn wait_for_settled(&self) -> Result<()> {
        self.state.lock().conn.wait_for_settled()
    }
}

/// Keeps a [`SharedLink`] connected while alive
#[must_use = "the link disconnects when the last hold is dropped"]
pub struct LinkHold {
    link: SharedLink,
}

impl fmt::Debug for LinkHold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkHold").field("link", &self.link.name).finish()
    }
}

impl Drop for LinkHold {
    fn drop(&mut self) {
        self.link.release_hold();
    }
}
