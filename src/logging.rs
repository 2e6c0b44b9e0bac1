//! Log setup.
//!
//! The terminal is owned by the UI, so log lines go to a file instead of
//! stderr.  Filtering follows `TWEETSY_LOG` using the usual `EnvFilter`
//! directive syntax (e.g. `TWEETSY_LOG=tweetsy=debug`).

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const FILTER_ENV: &str = "TWEETSY_LOG";
const DEFAULT_FILTER: &str = "tweetsy=info";

/// Install the global subscriber, appending to `path`.
pub fn init(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| DEFAULT_FILTER.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("a global log subscriber is already installed")?;

    Ok(())
}
