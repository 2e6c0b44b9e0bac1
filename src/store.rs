//! Observable tweet store.
//!
//! [`TweetStore`] owns two [`Cell`]s, one for the category list and one
//! for the tweets of the active category.  Each cell is a
//! [`tokio::sync::watch`] channel: screens hold a receiver and re-render
//! from whatever [`Snapshot`] is current on every tick.
//!
//! ## Update rules
//!
//! * `data` starts empty and is only ever replaced wholesale by a
//!   successful fetch.  A failed fetch leaves it untouched.
//! * `status` says what the most recent request did, so a stalled request
//!   and a failed one no longer look the same.
//! * Every refresh takes a generation number when it starts.  Only the
//!   newest generation may write its result; older completions are
//!   dropped, so the cell reflects the most recently *requested* data.
//! * Keyed cells remember which request `status` describes and which one
//!   `data` answers.  They differ after a failure or while a new key loads.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::source::{FetchError, Tweet, TweetSource};

/// Outcome of the most recent request against a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Nothing has been requested yet.
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request succeeded at this time.
    Loaded { at: DateTime<Utc> },
    /// The last request failed; `data` still holds the previous value.
    Failed(String),
}

/// The value a cell publishes to its subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    pub data: T,
    pub status: Status,
    /// Number of successful replacements so far.
    pub version: u64,
    /// Key of the most recent request, the one `status` describes.
    pub request_key: Option<String>,
    /// Key of the request whose result `data` holds.
    pub data_key: Option<String>,
}

impl<T> Snapshot<T> {
    /// True while the screen has nothing to show yet but may still get it.
    pub fn is_pending(&self) -> bool {
        matches!(self.status, Status::Idle | Status::Loading)
    }
}

/// One observable, versioned unit of store state.
pub struct Cell<T> {
    tx: watch::Sender<Snapshot<T>>,
    generation: AtomicU64,
}

impl<T> Cell<T> {
    fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(Snapshot {
            data: initial,
            status: Status::Idle,
            version: 0,
            request_key: None,
            data_key: None,
        });
        Self {
            tx,
            generation: AtomicU64::new(0),
        }
    }

    /// Subscribe to this cell.  The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.tx.subscribe()
    }

    /// Start a request for `key`: mark the cell as loading and return its
    /// generation.
    fn begin(&self, key: Option<&str>) -> u64 {
        let mut generation = 0;
        self.tx.send_modify(|snapshot| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            snapshot.status = Status::Loading;
            snapshot.request_key = key.map(str::to_string);
        });
        generation
    }

    /// Apply the result of request `generation`.
    ///
    /// Returns `false` without touching the cell when a newer request has
    /// started since.
    fn finish(&self, generation: u64, result: Result<T, FetchError>) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match result {
                Ok(data) => {
                    snapshot.data = data;
                    snapshot.data_key = snapshot.request_key.clone();
                    snapshot.version += 1;
                    snapshot.status = Status::Loaded { at: Utc::now() };
                }
                Err(e) => snapshot.status = Status::Failed(e.to_string()),
            }
            true
        })
    }
}

/// Repository-style cache over a [`TweetSource`].
///
/// One store per app session; share it behind an [`Arc`] so refreshes can
/// run on spawned tasks.
pub struct TweetStore {
    source: Arc<dyn TweetSource>,
    categories: Cell<Vec<String>>,
    tweets: Cell<Vec<Option<Tweet>>>,
}

impl TweetStore {
    pub fn new(source: Arc<dyn TweetSource>) -> Self {
        Self {
            source,
            categories: Cell::new(Vec::new()),
            tweets: Cell::new(Vec::new()),
        }
    }

    /// Observable list of distinct category names.
    pub fn categories(&self) -> watch::Receiver<Snapshot<Vec<String>>> {
        self.categories.subscribe()
    }

    /// Observable tweets of the most recently requested category.
    pub fn tweets(&self) -> watch::Receiver<Snapshot<Vec<Option<Tweet>>>> {
        self.tweets.subscribe()
    }

    /// Fetch the category list and publish its distinct values.
    pub async fn refresh_categories(&self) {
        let generation = self.categories.begin(None);
        debug!(generation, "refreshing categories");

        let result = self.source.fetch_categories().await.map(distinct);
        match &result {
            Ok(categories) => info!(count = categories.len(), "categories fetched"),
            Err(e) => warn!(error = %e, "category fetch failed"),
        }

        if !self.categories.finish(generation, result) {
            debug!(generation, "dropping stale category response");
        }
    }

    /// Fetch the tweets of `category` and publish them verbatim.
    pub async fn refresh_tweets(&self, category: &str) {
        let generation = self.tweets.begin(Some(category));
        debug!(generation, category, "refreshing tweets");

        let result = self.source.fetch_tweets_by_category(category).await;
        match &result {
            Ok(tweets) => info!(category, count = tweets.len(), "tweets fetched"),
            Err(e) => warn!(category, error = %e, "tweet fetch failed"),
        }

        if !self.tweets.finish(generation, result) {
            debug!(generation, category, "dropping stale tweet response");
        }
    }
}

/// Remove repeats, keeping the first occurrence of each value in place.
fn distinct(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
