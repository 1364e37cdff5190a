//! OpenDART API client.

use crate::error::{DataError, Result};
use std::time::Duration;

/// OpenDART API base URL
pub const DART_BASE_URL: &str = "https://opendart.fss.or.kr";

/// Public viewer URL for a single disclosure, keyed by receipt number
pub const DART_VIEWER_URL: &str = "https://dart.fss.or.kr/dsaf001/main.do";

/// User agent sent with every request
const USER_AGENT: &str = concat!("dartdl/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Fixed delays inserted between consecutive requests.
///
/// These are unconditional pacing sleeps, not back-off: OpenDART throttles
/// keys that hammer the list and document endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Delay between two list pages
    pub page_delay: Duration,
    /// Delay between two document downloads
    pub document_delay: Duration,
}

impl Pacing {
    /// No delays at all. Intended for tests against a local server.
    pub const fn none() -> Self {
        Self {
            page_delay: Duration::ZERO,
            document_delay: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(150),
            document_delay: Duration::from_millis(350),
        }
    }
}

/// OpenDART API client.
///
/// Constructed once at startup and passed by reference to every operation
/// that issues requests. The API key is attached as the `crtfc_key` query
/// parameter.
pub struct DartClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    pacing: Pacing,
}

impl DartClient {
    /// Create a client for the public OpenDART host.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DART_BASE_URL)
    }

    /// Create a client against a custom host (mirror or local test server).
    ///
    /// # Example
    /// ```no_run
    /// use dartdl_data::DartClient;
    ///
    /// # fn example() -> dartdl_data::Result<()> {
    /// let client = DartClient::with_base_url("my-key", "http://127.0.0.1:8080")?;
    /// assert_eq!(client.base_url(), "http://127.0.0.1:8080");
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(DataError::from)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            pacing: Pacing::default(),
        })
    }

    /// Replace the pacing delays.
    pub const fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Pacing delays in effect.
    pub const fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Issue a GET against `endpoint` with the API key and `params` attached.
    ///
    /// Only transport failures are errors here; status handling is left to
    /// the caller because the document endpoint treats it per item.
    pub(crate) async fn get(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> reqwest::Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, ?params, "GET");

        self.client
            .get(&url)
            .query(&[("crtfc_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
    }
}

impl std::fmt::Debug for DartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DartClient")
            .field("base_url", &self.base_url)
            .field("pacing", &self.pacing)
            .finish_non_exhaustive()
    }
}

/// Viewer link for a disclosure on the public DART site.
pub fn viewer_url(rcept_no: &str) -> String {
    format!("{DART_VIEWER_URL}?rcpNo={rcept_no}")
}
