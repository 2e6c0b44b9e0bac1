//! Runtime configuration.
//!
//! Everything comes from `TWEETSY_*` environment variables (a `.env` file in
//! the working directory is honoured) with built-in defaults, so the binary
//! runs against the public dataset with no setup at all.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::otp::DEFAULT_OTP_LENGTH;
use crate::source::{DEFAULT_BASE_URL, DEFAULT_BIN_ID};

/// Category shown when the detail screen is opened without a selection.
pub const DEFAULT_CATEGORY: &str = "android";

/// Seconds until a verification code expires.
pub const DEFAULT_OTP_EXPIRY_SECS: u64 = 7200;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub bin_id: String,
    pub default_category: String,
    pub log_file: PathBuf,
    /// `None` keeps the HTTP client's own default.
    pub timeout: Option<Duration>,
    pub otp_length: usize,
    pub otp_expiry: Duration,
}

impl Config {
    /// Load from the process environment.  The first CLI argument, when
    /// given, overrides the document id.
    pub fn load() -> Result<Self> {
        // A missing .env file is the normal case.
        let _ = dotenvy::dotenv();

        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        if let Some(bin_id) = env::args().nth(1) {
            config.bin_id = bin_id;
        }
        Ok(config)
    }

    /// Build a config from any key lookup.  Split out so tests do not have
    /// to touch the real environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout = parse_opt::<u64>(&lookup, "TWEETSY_TIMEOUT_SECS")?.map(Duration::from_secs);
        let otp_expiry = parse_opt::<u64>(&lookup, "TWEETSY_OTP_EXPIRY_SECS")?
            .unwrap_or(DEFAULT_OTP_EXPIRY_SECS);

        Ok(Self {
            base_url: string_or(&lookup, "TWEETSY_BASE_URL", DEFAULT_BASE_URL),
            bin_id: string_or(&lookup, "TWEETSY_BIN_ID", DEFAULT_BIN_ID),
            default_category: string_or(&lookup, "TWEETSY_DEFAULT_CATEGORY", DEFAULT_CATEGORY),
            log_file: string_or(&lookup, "TWEETSY_LOG_FILE", "tweetsy.log").into(),
            timeout,
            otp_length: parse_opt(&lookup, "TWEETSY_OTP_LENGTH")?.unwrap_or(DEFAULT_OTP_LENGTH),
            otp_expiry: Duration::from_secs(otp_expiry),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            bin_id: DEFAULT_BIN_ID.to_string(),
            default_category: DEFAULT_CATEGORY.to_string(),
            log_file: PathBuf::from("tweetsy.log"),
            timeout: None,
            otp_length: DEFAULT_OTP_LENGTH,
            otp_expiry: Duration::from_secs(DEFAULT_OTP_EXPIRY_SECS),
        }
    }
}

fn string_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| {
            debug!("{key} not set, using default: {default}");
            default.to_string()
        })
}

fn parse_opt<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T::Err: Display,
{
    let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("invalid {key} value {raw:?}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_category, "android");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("TWEETSY_BASE_URL", "http://localhost:8080"),
            ("TWEETSY_BIN_ID", "abc"),
            ("TWEETSY_DEFAULT_CATEGORY", "rust"),
            ("TWEETSY_TIMEOUT_SECS", "15"),
            ("TWEETSY_OTP_LENGTH", "4"),
            ("TWEETSY_OTP_EXPIRY_SECS", " 120 "),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.bin_id, "abc");
        assert_eq!(config.default_category, "rust");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.otp_length, 4);
        assert_eq!(config.otp_expiry, Duration::from_secs(120));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[("TWEETSY_BIN_ID", "  ")])).unwrap();
        assert_eq!(config.bin_id, DEFAULT_BIN_ID);
    }

    #[test]
    fn unparseable_number_is_an_error() {
        let err = Config::from_lookup(lookup(&[("TWEETSY_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("TWEETSY_TIMEOUT_SECS"));
    }
}
