//! Verification code entry.
//!
//! Two independent pieces of state for the OTP screen: [`OtpInput`], a
//! reducer over a fixed-length numeric code, and [`OtpTimer`], the expiry
//! countdown with its resend affordance.  Neither talks to a backend;
//! submitting and resending only log.

use std::time::{Duration, Instant};

use tracing::info;

pub const DEFAULT_OTP_LENGTH: usize = 6;

/// Typed-in code, always at most `length` ASCII digits.
#[derive(Debug, Clone)]
pub struct OtpInput {
    length: usize,
    code: String,
}

impl OtpInput {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            code: String::new(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Position of the next digit to be filled.
    pub fn active_index(&self) -> usize {
        self.code.len()
    }

    pub fn is_complete(&self) -> bool {
        self.code.len() == self.length
    }

    /// Digit at `index`, if filled.
    pub fn digit(&self, index: usize) -> Option<char> {
        self.code.chars().nth(index)
    }

    /// Replace the whole field value, as a text widget would report it.
    ///
    /// Non-digits are dropped.  A value at least as long as the code is
    /// truncated to it (paste); a longer value pushes digits; a shorter one
    /// pops them.  Returns the code when this change completed it.
    pub fn apply(&mut self, new_value: &str) -> Option<String> {
        let digits: String = new_value.chars().filter(char::is_ascii_digit).collect();
        let was_complete = self.is_complete();

        if digits.len() >= self.length || digits.len() > self.code.len() {
            self.code = digits.chars().take(self.length).collect();
        } else if digits.len() < self.code.len() {
            self.code = digits;
        }

        (!was_complete && self.is_complete()).then(|| self.code.clone())
    }

    pub fn push(&mut self, c: char) -> Option<String> {
        let value = format!("{}{c}", self.code);
        self.apply(&value)
    }

    pub fn pop(&mut self) {
        let mut value = self.code.clone();
        value.pop();
        self.apply(&value);
    }

    pub fn paste(&mut self, text: &str) -> Option<String> {
        self.apply(text)
    }

    pub fn clear(&mut self) {
        self.code.clear();
    }
}

impl Default for OtpInput {
    fn default() -> Self {
        Self::new(DEFAULT_OTP_LENGTH)
    }
}

/// Stub for the verification call.
pub fn submit(code: &str) {
    info!(digits = code.len(), "verification code entered");
}

/// Countdown until the code expires.
#[derive(Debug, Clone)]
pub struct OtpTimer {
    total: Duration,
    started: Instant,
}

impl OtpTimer {
    pub fn new(total: Duration) -> Self {
        Self::started_at(total, Instant::now())
    }

    pub fn started_at(total: Duration, started: Instant) -> Self {
        Self { total, started }
    }

    /// Whole seconds left at `now`, never negative.
    pub fn remaining_at(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.started).as_secs();
        self.total.as_secs().saturating_sub(elapsed)
    }

    /// Fraction of time left, from 1.0 down to 0.0.
    pub fn progress_at(&self, now: Instant) -> f64 {
        let total = self.total.as_secs();
        if total == 0 {
            return 0.0;
        }
        self.remaining_at(now) as f64 / total as f64
    }

    pub fn can_resend_at(&self, now: Instant) -> bool {
        self.remaining_at(now) == 0
    }

    /// `MM:SS`; minutes are not wrapped into hours.
    pub fn label_at(&self, now: Instant) -> String {
        let remaining = self.remaining_at(now);
        format!("{:02}:{:02}", remaining / 60, remaining % 60)
    }

    /// Restart the countdown once it has run out.  Returns whether it did.
    pub fn resend(&mut self, now: Instant) -> bool {
        if !self.can_resend_at(now) {
            return false;
        }
        info!("verification code resend requested");
        self.started = now;
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
