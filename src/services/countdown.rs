// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Redirect countdown shown after a successful verification. The client
//! ticks it once a second; the confirm view carries its starting state.

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Seconds left to show.
    Remaining(u32),
    /// Countdown over; navigate to the target.
    Redirect(String),
}

#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u32,
    target: String,
}

impl Countdown {
    pub fn new(secs: u32, target: impl Into<String>) -> Self {
        Self {
            remaining: secs,
            target: target.into(),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Advance by one second. The tick that would show 0 redirects
    /// instead, and every later tick repeats the redirect.
    pub fn tick(&mut self) -> Tick {
        if self.remaining <= 1 {
            self.remaining = 0;
            return Tick::Redirect(self.target.clone());
        }
        self.remaining -= 1;
        Tick::Remaining(self.remaining)
    }
}
