//! tweetsy — browse a hosted tweet dataset by category, in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐  fetch   ┌──────────┐  watch   ┌──────────┐  draw()  ┌──────────┐
//! │ source/   │ ◄─────── │ store.rs │ ───────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (HTTP)    │ ───────► │ (cells)  │ (cells)  │ (state)  │          │ (render) │
//! └───────────┘  result  └──────────┘          └──────────┘          └──────────┘
//!                                                   ▲
//!                                                   │ handle_key_event()
//!                                              ┌──────────┐
//!                                              │ input.rs │
//!                                              └──────────┘
//! ```
//!
//! * **`source/`** — the `TweetSource` trait and the JSON document store
//!   client.
//! * **`store`** — two observable cells (categories, tweets) refreshed from
//!   a source on tokio tasks.
//! * **`app`** — screen, selection and code-entry state; starts refreshes.
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations.
//! * **`otp`**, **`spinner`** — small widget state machines.
//! * **`config`**, **`logging`** — environment configuration and file logs.
//! * **`main`** — wires everything together: load config, set up the
//!   runtime and terminal, and run the event loop.

mod app;
mod config;
mod input;
mod logging;
mod otp;
mod source;
mod spinner;
mod store;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use app::App;
use config::Config;
use source::{JsonBinSource, TweetSource};
use store::TweetStore;

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode, alternate-screen and bracketed-paste lifetime
/// via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let config = Config::load()?;
    logging::init(&config.log_file)?;
    info!("starting tweetsy");

    install_panic_hook();

    // -- async runtime -------------------------------------------------------
    // The UI loop stays synchronous; refreshes are spawned onto the runtime,
    // which the guard below makes current for this thread.
    let runtime = tokio::runtime::Runtime::new()?;
    let _entered = runtime.enter();

    // -- data source and store -----------------------------------------------
    let source = match config.timeout {
        Some(timeout) => JsonBinSource::with_timeout(&config.base_url, &config.bin_id, timeout)?,
        None => JsonBinSource::new(&config.base_url, &config.bin_id),
    };
    info!(url = source.url(), "using document store");
    let source: Arc<dyn TweetSource> = Arc::new(source);
    let store = Arc::new(TweetStore::new(source));

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(store, &config);
    app.refresh_categories();

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Advance the spinner.
    //   2. Render from the current cell snapshots.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        app.tick();

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => input::handle_key_event(&mut app, key),
                Event::Paste(text) => input::handle_paste(&mut app, &text),
                _ => {}
            }
        }

        if app.quit {
            break;
        }
    }

    info!("shutting down");
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
