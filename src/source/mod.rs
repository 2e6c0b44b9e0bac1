//! Remote data source layer.
//!
//! This module defines the [`TweetSource`] trait, the [`Tweet`] record and
//! the [`FetchError`] returned by every source.  The concrete HTTP client
//! lives in [`jsonbin`].
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `local_file.rs`).
//! 2. Define a struct and implement [`TweetSource`] for it.
//! 3. Add `mod local_file;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of [`JsonBinSource`].
//!
//! The store, the screens and the refresh bookkeeping are all
//! source-agnostic.

mod jsonbin;
mod tweet;

pub use jsonbin::{JsonBinSource, DEFAULT_BASE_URL, DEFAULT_BIN_ID};
pub use tweet::Tweet;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong while fetching from a source.
///
/// The store never hands these to its callers; they end up as the message
/// of a failed cell status and in the log.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("category {0:?} cannot be used in a query")]
    InvalidCategory(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(StatusCode),

    #[error("response body was empty")]
    EmptyBody,

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Trait that every tweet source must implement.
///
/// Each call performs exactly one round trip.  No retries and no caching
/// happen at this layer.
///
/// ## Implementing a new source
///
/// ```ignore
/// pub struct MySource { /* config fields */ }
///
/// #[async_trait]
/// impl TweetSource for MySource {
///     async fn fetch_tweets_by_category(&self, category: &str)
///         -> Result<Vec<Option<Tweet>>, FetchError> { todo!() }
///
///     async fn fetch_categories(&self) -> Result<Vec<String>, FetchError> { todo!() }
/// }
/// ```
#[async_trait]
pub trait TweetSource: Send + Sync {
    /// Fetch the tweets filed under `category`, in upstream order.
    async fn fetch_tweets_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Option<Tweet>>, FetchError>;

    /// Fetch the category of every tweet.  Not deduplicated.
    async fn fetch_categories(&self) -> Result<Vec<String>, FetchError>;
}
