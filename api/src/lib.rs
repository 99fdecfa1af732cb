//! Backend transport for the kiosk analytics service.
//!
//! This crate only knows how to reach the three read endpoints the dashboard
//! consumes and hand back the raw response body. Decoding and shape validation
//! live in `ui::core::records`, so a malformed payload is rejected in one place
//! regardless of where it came from.

use reqwest::{Client, Url};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid backend URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} responded with HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },
}

/// One of the read endpoints exposed by the analytics backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Machines,
    Stats { machine: String, days: u16 },
    Choices { machine: String, days: u16, limit: u32 },
}

impl Endpoint {
    /// Short resource name, also used as the log label.
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::Machines => "machines",
            Endpoint::Stats { .. } => "stats",
            Endpoint::Choices { .. } => "choices",
        }
    }

    /// Query parameters in the order the backend documents them. An empty
    /// machine filter means "all machines" and is left out entirely.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        match self {
            Endpoint::Machines => {}
            Endpoint::Stats { machine, days } => {
                pairs.push(("days", days.to_string()));
                push_machine(&mut pairs, machine);
            }
            Endpoint::Choices {
                machine,
                days,
                limit,
            } => {
                pairs.push(("days", days.to_string()));
                pairs.push(("limit", limit.to_string()));
                push_machine(&mut pairs, machine);
            }
        }
        pairs
    }
}

fn push_machine(pairs: &mut Vec<(&'static str, String)>, machine: &str) {
    let trimmed = machine.trim();
    if !trimmed.is_empty() {
        pairs.push(("machine", trimmed.to_string()));
    }
}

/// Thin HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut url = Url::parse(base_url.trim()).map_err(|err| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;

        if url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }

        // `Url::join` replaces the last path segment unless the base ends with '/'.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);

        Ok(Self {
            base_url: url,
            http: Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full request URL for an endpoint.
    pub fn url(&self, endpoint: &Endpoint) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(endpoint.label())
            .map_err(|err| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: err.to_string(),
            })?;

        let pairs = endpoint.query();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Fetch the raw response body for `endpoint`.
    pub async fn fetch(&self, endpoint: &Endpoint) -> Result<String, ApiError> {
        let label = endpoint.label();
        let url = self.url(endpoint)?;
        debug!(endpoint = label, %url, "requesting");

        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: label,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = label, status = status.as_u16(), "backend rejected request");
            return Err(ApiError::Status {
                endpoint: label,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| ApiError::Transport {
            endpoint: label,
            source,
        })?;
        debug!(endpoint = label, bytes = body.len(), "response received");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machines_endpoint_has_no_query() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        let url = client.url(&Endpoint::Machines).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/machines");
    }

    #[test]
    fn empty_machine_filter_is_omitted() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        let url = client
            .url(&Endpoint::Stats {
                machine: String::new(),
                days: 7,
            })
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/stats?days=7");
    }

    #[test]
    fn machine_filter_is_url_encoded() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        let url = client
            .url(&Endpoint::Choices {
                machine: "borne 01&hall".into(),
                days: 30,
                limit: 1000,
            })
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/choices?days=30&limit=1000&machine=borne+01%26hall"
        );
    }

    #[test]
    fn base_path_is_preserved() {
        let client = ApiClient::new("https://analytics.example.org/api?stale=1").unwrap();
        let url = client.url(&Endpoint::Machines).unwrap();
        assert_eq!(url.as_str(), "https://analytics.example.org/api/machines");
    }

    #[test]
    fn rejects_relative_base_url() {
        let err = ApiClient::new("localhost").unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    }
}
