//! Loading indicator state.
//!
//! The spinner has no clock of its own: the main loop calls
//! [`Spinner::advance`] once per tick and the UI reads the current frame.

/// Rotating glyph frames.
const FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Ticks each dot stays up before the next one jumps.
const DOT_TICKS: usize = 2;

#[derive(Debug, Default)]
pub struct Spinner {
    tick: usize,
}

impl Spinner {
    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn glyph(&self) -> &'static str {
        FRAMES[self.tick % FRAMES.len()]
    }

    /// `Loading` followed by 0 to 3 dots, cycling.
    pub fn label(&self) -> String {
        let dots = (self.tick / DOT_TICKS) % 4;
        format!("Loading{:<3}", ".".repeat(dots))
    }
}
