//! Keyboard input handling.
//!
//! Maps terminal events to [`App`] actions, per screen.  Adding a new
//! keybinding is a single match arm in the matching `*_keys` function.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm for the screen that should react to it.
//! 3. Update the help text in [`crate::ui`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Screen};

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return;
    }

    match app.screen {
        Screen::Categories => category_keys(app, key.code),
        Screen::Detail { .. } => detail_keys(app, key.code),
        Screen::Otp => otp_keys(app, key.code),
    }
}

/// Bracketed paste.  Only the code entry screen accepts text.
pub fn handle_paste(app: &mut App, text: &str) {
    if app.screen == Screen::Otp {
        app.otp_paste(text);
    }
}

fn category_keys(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.back(),
        KeyCode::Left | KeyCode::Char('h') => app.grid_left(),
        KeyCode::Right | KeyCode::Char('l') => app.grid_right(),
        KeyCode::Up | KeyCode::Char('k') => app.grid_up(),
        KeyCode::Down | KeyCode::Char('j') => app.grid_down(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('r') => app.refresh_current(),
        KeyCode::Char('o') => app.open_otp(),
        _ => {}
    }
}

fn detail_keys(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => app.back(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('r') => app.refresh_current(),
        _ => {}
    }
}

fn otp_keys(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.back(),
        KeyCode::Backspace => app.otp_backspace(),
        KeyCode::Char('r') => app.otp_resend(),
        KeyCode::Char(c) if c.is_ascii_digit() => app.otp_type(c),
        _ => {}
    }
}
