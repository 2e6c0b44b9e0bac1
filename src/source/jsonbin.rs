//! JSON document store source.
//!
//! The whole dataset is one hosted JSON document of the form
//! `{"tweets": [{"text": …, "category": …}, …]}`.  The store evaluates a
//! JSONPath expression sent in the `X-JSON-Path` request header and answers
//! with just the selected values, so both queries are a single GET against
//! the same URL.
//!
//! ## For contributors
//!
//! Category names are embedded inside a quoted filter string.  Anything
//! that could terminate or escape that string is rejected up front by
//! [`JsonBinSource::tweets_query`] instead of being sent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{FetchError, Tweet, TweetSource};

/// Public API host of the document store.
pub const DEFAULT_BASE_URL: &str = "https://api.jsonbin.io";

/// Document holding the tweet dataset.
pub const DEFAULT_BIN_ID: &str = "691feab1d0ea881f40f5f101";

const JSON_PATH_HEADER: &str = "X-JSON-Path";

/// Projection of every tweet's category.
const CATEGORIES_PATH: &str = "tweets..category";

/// A [`TweetSource`] backed by a hosted JSON document.
#[derive(Clone)]
pub struct JsonBinSource {
    client: Client,
    url: String,
}

impl JsonBinSource {
    /// Create a source using the HTTP client's default timeouts.
    ///
    /// # Arguments
    ///
    /// * `base_url` — API host, e.g. `https://api.jsonbin.io`.  A trailing
    ///   slash is ignored.
    /// * `bin_id` — identifier of the document to read.
    pub fn new(base_url: &str, bin_id: &str) -> Self {
        Self::with_client(Client::new(), base_url, bin_id)
    }

    /// Create a source whose requests give up after `timeout`.
    ///
    /// Fails when the HTTP client cannot be built (e.g. no TLS backend).
    pub fn with_timeout(
        base_url: &str,
        bin_id: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, bin_id))
    }

    fn with_client(client: Client, base_url: &str, bin_id: &str) -> Self {
        Self {
            client,
            url: format!("{}/v3/b/{}", base_url.trim_end_matches('/'), bin_id),
        }
    }

    /// The document URL, without the query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the filter expression selecting the tweets of `category`.
    ///
    /// Fails for empty names and for names containing a double quote, a
    /// backslash or a control character.
    pub fn tweets_query(category: &str) -> Result<String, FetchError> {
        let unsafe_char = |c: char| c == '"' || c == '\\' || c.is_control();
        if category.is_empty() || category.contains(unsafe_char) {
            return Err(FetchError::InvalidCategory(category.to_string()));
        }
        Ok(format!("tweets[?(@.category==\"{category}\")]"))
    }

    /// GET the document with `json_path` applied and decode the result.
    ///
    /// Non-2xx statuses, empty bodies and a JSON `null` are all errors.
    async fn get<T: DeserializeOwned>(&self, json_path: &str) -> Result<T, FetchError> {
        debug!(url = %self.url, json_path, "fetching");

        let response = self
            .client
            .get(&self.url)
            .query(&[("meta", "false")])
            .header(JSON_PATH_HEADER, json_path)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(FetchError::EmptyBody);
        }

        serde_json::from_slice::<Option<T>>(&body)?.ok_or(FetchError::EmptyBody)
    }
}

#[async_trait]
impl TweetSource for JsonBinSource {
    async fn fetch_tweets_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Option<Tweet>>, FetchError> {
        let query = Self::tweets_query(category)?;
        self.get(&query).await
    }

    async fn fetch_categories(&self) -> Result<Vec<String>, FetchError> {
        self.get(CATEGORIES_PATH).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;

    const BIN: &str = "testbin";

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Mimics the document store: only answers `meta=false` requests and
    /// dispatches on the JSONPath header.
    async fn document(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Response {
        if query.get("meta").map(String::as_str) != Some("false") {
            return StatusCode::BAD_REQUEST.into_response();
        }

        match headers.get("x-json-path").and_then(|v| v.to_str().ok()) {
            Some("tweets..category") => Json(json!(["tech", "tech", "sports"])).into_response(),
            Some(r#"tweets[?(@.category=="tech")]"#) => Json(json!([
                {"text": "hello", "category": "tech"},
                {"text": "world", "category": "tech"},
            ]))
            .into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn document_server() -> String {
        serve(Router::new().route(&format!("/v3/b/{BIN}"), get(document))).await
    }

    // -- query building ------------------------------------------------------

    #[test]
    fn tweets_query_interpolates_category() {
        assert_eq!(
            JsonBinSource::tweets_query("android").unwrap(),
            r#"tweets[?(@.category=="android")]"#
        );
    }

    #[test]
    fn tweets_query_rejects_quotes_and_backslashes() {
        for bad in [r#"a"b"#, r"a\b", "", "tab\there"] {
            assert!(
                matches!(
                    JsonBinSource::tweets_query(bad),
                    Err(FetchError::InvalidCategory(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn url_ignores_trailing_slash() {
        let src = JsonBinSource::new("https://api.example.com/", "abc");
        assert_eq!(src.url(), "https://api.example.com/v3/b/abc");
    }

    // -- fetching ------------------------------------------------------------

    #[tokio::test]
    async fn fetch_categories_returns_raw_sequence() {
        let src = JsonBinSource::new(&document_server().await, BIN);
        let categories = src.fetch_categories().await.unwrap();
        assert_eq!(categories, vec!["tech", "tech", "sports"]);
    }

    #[tokio::test]
    async fn fetch_tweets_sends_filter_header() {
        let src = JsonBinSource::new(&document_server().await, BIN);
        let tweets = src.fetch_tweets_by_category("tech").await.unwrap();

        let texts: Vec<_> = tweets
            .iter()
            .map(|t| t.as_ref().and_then(|t| t.text.as_deref()))
            .collect();
        assert_eq!(texts, vec![Some("hello"), Some("world")]);
    }

    #[tokio::test]
    async fn invalid_category_never_reaches_the_network() {
        // Nothing listens on the discard port; a request would fail differently.
        let src = JsonBinSource::new("http://127.0.0.1:9", BIN);
        let err = src.fetch_tweets_by_category("say \"hi\"").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidCategory(_)));
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let base = serve(Router::new().route(
            &format!("/v3/b/{BIN}"),
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;

        let err = JsonBinSource::new(&base, BIN).fetch_categories().await.unwrap_err();
        assert!(matches!(err, FetchError::Status(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn empty_body_maps_to_empty_body() {
        let base = serve(Router::new().route(&format!("/v3/b/{BIN}"), get(|| async { "" }))).await;

        let err = JsonBinSource::new(&base, BIN).fetch_categories().await.unwrap_err();
        assert!(matches!(err, FetchError::EmptyBody));
    }

    #[tokio::test]
    async fn null_body_maps_to_empty_body() {
        let base = serve(Router::new().route(
            &format!("/v3/b/{BIN}"),
            get(|| async { Json(serde_json::Value::Null) }),
        ))
        .await;

        let err = JsonBinSource::new(&base, BIN).fetch_categories().await.unwrap_err();
        assert!(matches!(err, FetchError::EmptyBody));
    }

    #[tokio::test]
    async fn timeout_applies_to_slow_responses() {
        let base = serve(Router::new().route(
            &format!("/v3/b/{BIN}"),
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!(["late"]))
            }),
        ))
        .await;

        let src = JsonBinSource::with_timeout(&base, BIN, Duration::from_millis(100)).unwrap();
        assert_eq!(src.url(), format!("{base}/v3/b/{BIN}"));

        let err = src.fetch_categories().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn wrong_shape_maps_to_decode() {
        let base = serve(Router::new().route(
            &format!("/v3/b/{BIN}"),
            get(|| async { Json(json!({"tweets": []})) }),
        ))
        .await;

        let err = JsonBinSource::new(&base, BIN).fetch_categories().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
