//! Application state.
//!
//! [`App`] is the terminal counterpart of the two view models: it holds
//! read-only subscriptions to the store's cells, starts refreshes when a
//! screen is entered, and keeps per-screen selection state.  Drawing lives
//! in [`crate::ui`], key handling in [`crate::input`].

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use ratatui::widgets::ListState;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::Config;
use crate::otp::{self, OtpInput, OtpTimer};
use crate::source::Tweet;
use crate::spinner::Spinner;
use crate::store::{Snapshot, Status, TweetStore};

/// Columns in the category grid.
pub const GRID_COLUMNS: usize = 2;

/// Which screen is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Categories,
    Detail { category: String },
    Otp,
}

pub struct App {
    store: Arc<TweetStore>,
    pub categories: watch::Receiver<Snapshot<Vec<String>>>,
    pub tweets: watch::Receiver<Snapshot<Vec<Option<Tweet>>>>,
    pub screen: Screen,
    /// Highlighted cell in the category grid.
    pub grid_selected: usize,
    /// Scroll state of the tweet list.
    pub list_state: ListState,
    pub spinner: Spinner,
    pub otp: OtpInput,
    pub otp_timer: OtpTimer,
    /// Whether the user has requested to quit.
    pub quit: bool,
    default_category: String,
    otp_expiry: std::time::Duration,
    categories_task: Option<JoinHandle<()>>,
    tweets_task: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(store: Arc<TweetStore>, config: &Config) -> Self {
        Self {
            categories: store.categories(),
            tweets: store.tweets(),
            store,
            screen: Screen::Categories,
            grid_selected: 0,
            list_state: ListState::default(),
            spinner: Spinner::default(),
            otp: OtpInput::new(config.otp_length),
            otp_timer: OtpTimer::new(config.otp_expiry),
            quit: false,
            default_category: config.default_category.clone(),
            otp_expiry: config.otp_expiry,
            categories_task: None,
            tweets_task: None,
        }
    }

    /// Advance animations by one UI tick and pull the grid cursor back
    /// inside a category list that may have shrunk.
    pub fn tick(&mut self) {
        self.spinner.advance();
        self.grid_selected = self.grid_cursor();
    }

    // -- refreshes -----------------------------------------------------------

    /// Reload the category list, superseding any load still running.
    pub fn refresh_categories(&mut self) {
        let store = Arc::clone(&self.store);
        respawn(&mut self.categories_task, async move {
            store.refresh_categories().await;
        });
    }

    /// Reload the tweets of `category`, superseding any load still running.
    pub fn refresh_tweets(&mut self, category: &str) {
        let store = Arc::clone(&self.store);
        let category = category.to_string();
        respawn(&mut self.tweets_task, async move {
            store.refresh_tweets(&category).await;
        });
    }

    /// Re-run whatever load feeds the current screen.
    pub fn refresh_current(&mut self) {
        match self.screen.clone() {
            Screen::Categories => self.refresh_categories(),
            Screen::Detail { category } => self.refresh_tweets(&category),
            Screen::Otp => {}
        }
    }

    // -- navigation ----------------------------------------------------------

    /// Category under the grid cursor, if the grid has any cells.
    pub fn selected_category(&self) -> Option<String> {
        let cursor = self.grid_cursor();
        self.categories.borrow().data.get(cursor).cloned()
    }

    /// Open the detail screen for the highlighted category, falling back to
    /// the configured default when nothing is selectable.
    pub fn open_selected(&mut self) {
        let category = self
            .selected_category()
            .unwrap_or_else(|| self.default_category.clone());
        self.open_detail(category);
    }

    pub fn open_detail(&mut self, category: String) {
        debug!(%category, "opening detail screen");
        self.list_state = ListState::default();
        self.refresh_tweets(&category);
        self.screen = Screen::Detail { category };
    }

    pub fn open_otp(&mut self) {
        self.otp.clear();
        self.otp_timer = OtpTimer::new(self.otp_expiry);
        self.screen = Screen::Otp;
    }

    /// Return to the category grid.  Quits from the grid itself.
    pub fn back(&mut self) {
        match self.screen {
            Screen::Categories => self.quit = true,
            Screen::Detail { .. } | Screen::Otp => self.screen = Screen::Categories,
        }
    }

    // -- category grid -------------------------------------------------------

    fn category_count(&self) -> usize {
        self.categories.borrow().data.len()
    }

    /// Grid cursor clamped to the current category list.
    pub fn grid_cursor(&self) -> usize {
        self.grid_selected.min(self.category_count().saturating_sub(1))
    }

    /// Move the grid cursor by `delta` cells, clamped to the grid.
    fn move_grid(&mut self, delta: isize) {
        let count = self.category_count();
        if count == 0 {
            self.grid_selected = 0;
            return;
        }
        let target = self.grid_cursor() as isize + delta;
        self.grid_selected = target.clamp(0, count as isize - 1) as usize;
    }

    pub fn grid_left(&mut self) {
        self.move_grid(-1);
    }

    pub fn grid_right(&mut self) {
        self.move_grid(1);
    }

    pub fn grid_up(&mut self) {
        if self.grid_cursor() >= GRID_COLUMNS {
            self.move_grid(-(GRID_COLUMNS as isize));
        }
    }

    pub fn grid_down(&mut self) {
        if self.grid_cursor() + GRID_COLUMNS < self.category_count() {
            self.move_grid(GRID_COLUMNS as isize);
        }
    }

    // -- tweet list ----------------------------------------------------------

    /// The tweets cell as the detail screen sees it.
    ///
    /// Data fetched for another category counts as nothing loaded, and a
    /// status left over from another category reads as loading, since
    /// [`App::open_detail`] has already started the request for this one.
    pub fn detail_snapshot(&self) -> Snapshot<Vec<Option<Tweet>>> {
        let mut snapshot = self.tweets.borrow().clone();
        if let Screen::Detail { category } = &self.screen {
            let wanted = Some(category.as_str());
            if snapshot.data_key.as_deref() != wanted {
                snapshot.data.clear();
            }
            if snapshot.request_key.as_deref() != wanted {
                snapshot.status = Status::Loading;
            }
        }
        snapshot
    }

    fn tweet_count(&self) -> usize {
        self.detail_snapshot().data.len()
    }

    pub fn select_next(&mut self) {
        let count = self.tweet_count();
        if count == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(count - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.tweet_count() == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.tweet_count() > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let count = self.tweet_count();
        if count > 0 {
            self.list_state.select(Some(count - 1));
        }
    }

    // -- verification code ---------------------------------------------------

    pub fn otp_type(&mut self, c: char) {
        if let Some(code) = self.otp.push(c) {
            otp::submit(&code);
        }
    }

    pub fn otp_paste(&mut self, text: &str) {
        if let Some(code) = self.otp.paste(text) {
            otp::submit(&code);
        }
    }

    pub fn otp_backspace(&mut self) {
        self.otp.pop();
    }

    pub fn otp_resend(&mut self) {
        self.otp_timer.resend(Instant::now());
    }
}

/// Abort the task in `slot`, if any, and replace it with a new one.
fn respawn<F>(slot: &mut Option<JoinHandle<()>>, task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Some(previous) = slot.take() {
        previous.abort();
    }
    *slot = Some(tokio::spawn(task));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
