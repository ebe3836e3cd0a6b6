//! Shared HTTP client for the outbound services (geocoding, IP location,
//! assessment creation).

mod response;

pub use response::{read_json, HttpError};

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// Default user agent. Public geocoders such as Nominatim reject anonymous
/// clients.
pub const USER_AGENT: &str = concat!(
    "rainwise/",
    env!("CARGO_PKG_VERSION"),
    " (rainwater harvesting assessment)"
);

/// Resolve the user agent from config: `None` or blank means the default.
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        None | Some("") => USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}

/// Thin wrapper over `reqwest::Client` with JSON helpers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

/// Builder for `HttpClient`.
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl HttpClientBuilder {
    /// Set the user agent string. Not called: default rainwise user agent.
    pub fn user_agent(mut self, ua: &str) -> Self {
        self.user_agent = Some(ua.to_string());
        self
    }

    /// Build the `HttpClient`.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let user_agent = resolve_user_agent(self.user_agent.as_deref());
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(self.timeout)
            .gzip(true)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(HttpClient { client })
    }
}

impl HttpClient {
    /// Create a builder with the request timeout every client needs.
    pub fn builder(timeout: Duration) -> HttpClientBuilder {
        HttpClientBuilder {
            timeout,
            user_agent: None,
        }
    }

    /// GET `url` and decode a JSON body. Non-2xx statuses are errors.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, HttpError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    /// POST a JSON body to `url` and decode a JSON reply.
    pub async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        read_json(response).await
    }
}
