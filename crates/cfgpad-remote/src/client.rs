use crate::error::RemoteError;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Content type the hash endpoint expects.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Paths of the server endpoints, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Returns the current config text.
    pub get: String,
    /// Accepts the new config text as the request body.
    pub save: String,
    /// Hashes the request body and returns the digest as text.
    pub hash: String,
    /// Stops the server.
    pub shutdown: String,
    /// JSON schema of the config document.
    pub schema: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            get: "/api/v1/cfg/get".to_string(),
            save: "/api/v1/cfg/save".to_string(),
            hash: "/genhash".to_string(),
            shutdown: "/shutdown".to_string(),
            schema: "/api/v1/cfg/schema".to_string(),
        }
    }
}

/// Result of a save request.
///
/// Saving never fails on a status code; the status is reported as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase (`OK`, `Bad Request`, ...), empty when unknown.
    pub reason: String,
}

impl SaveOutcome {
    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking client for one config server.
#[derive(Debug, Clone)]
pub struct ConfigClient {
    http: Client,
    base: Url,
    endpoints: Endpoints,
}

impl ConfigClient {
    /// Client for `base_url` with the default endpoints and timeout.
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        Self::with_options(base_url, Endpoints::default(), DEFAULT_TIMEOUT)
    }

    /// Client with explicit endpoints and request timeout.
    pub fn with_options(
        base_url: &str,
        endpoints: Endpoints,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let base = Url::parse(base_url).map_err(|source| RemoteError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base,
            endpoints,
        })
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Configured endpoint paths.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Resolve `path` against the base URL. Absolute URLs are returned unchanged.
    pub fn resolve(&self, path: &str) -> Result<Url, RemoteError> {
        self.base.join(path).map_err(|source| RemoteError::InvalidUrl {
            url: path.to_string(),
            source,
        })
    }

    /// Absolute URL of the config schema.
    pub fn schema_url(&self) -> Result<Url, RemoteError> {
        self.resolve(&self.endpoints.schema)
    }

    /// Fetch the current config text.
    pub fn load(&self) -> Result<String, RemoteError> {
        let url = self.resolve(&self.endpoints.get)?;
        let response = self.http.get(url.clone()).send()?;
        let text = check_status("GET", &url, response)?.text()?;
        tracing::info!(len = text.len(), "config loaded from {url}");
        Ok(text)
    }

    /// Upload `text` as the new config.
    pub fn save(&self, text: &str) -> Result<SaveOutcome, RemoteError> {
        let url = self.resolve(&self.endpoints.save)?;
        let response = self.http.post(url.clone()).body(text.to_string()).send()?;
        let outcome = SaveOutcome {
            status: response.status().as_u16(),
            reason: reason_phrase(response.status()),
        };
        if outcome.is_success() {
            tracing::info!(status = outcome.status, "config saved to {url}");
        } else {
            tracing::warn!(status = outcome.status, "config save rejected by {url}");
        }
        Ok(outcome)
    }

    /// Ask the server to hash `text` and return the digest.
    pub fn hash(&self, text: &str) -> Result<String, RemoteError> {
        let url = self.resolve(&self.endpoints.hash)?;
        let response = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(text.to_string())
            .send()?;
        let digest = check_status("POST", &url, response)?.text()?;
        tracing::debug!("hash computed by {url}");
        Ok(digest)
    }

    /// Ask the server to stop and return the HTTP status it answered with.
    pub fn shutdown(&self) -> Result<u16, RemoteError> {
        let url = self.resolve(&self.endpoints.shutdown)?;
        let status = self.http.get(url.clone()).send()?.status().as_u16();
        tracing::info!(status, "shutdown requested at {url}");
        Ok(status)
    }
}

/// The response does not carry the server's own reason text; use the standard one.
fn reason_phrase(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

fn check_status(
    method: &'static str,
    url: &Url,
    response: Response,
) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    tracing::warn!(status = status.as_u16(), "{method} {url} failed");
    Err(RemoteError::Status {
        method,
        url: url.to_string(),
        status: status.as_u16(),
        reason: reason_phrase(status),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_resolve_against_base() {
        let client = ConfigClient::new("http://127.0.0.1:8080/ui/").unwrap();
        assert_eq!(
            client.resolve("/api/v1/cfg/get").unwrap().as_str(),
            "http://127.0.0.1:8080/api/v1/cfg/get"
        );
        assert_eq!(
            client.resolve("genhash").unwrap().as_str(),
            "http://127.0.0.1:8080/ui/genhash"
        );
        assert_eq!(
            client.resolve("https://schemas.example/cfg.json").unwrap().as_str(),
            "https://schemas.example/cfg.json"
        );
        assert_eq!(
            client.schema_url().unwrap().as_str(),
            "http://127.0.0.1:8080/api/v1/cfg/schema"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        match ConfigClient::new("not a url") {
            Err(RemoteError::InvalidUrl { url, .. }) => assert_eq!(url, "not a url"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_save_outcome_success_range() {
        let ok = SaveOutcome {
            status: 204,
            reason: "No Content".to_string(),
        };
        let bad = SaveOutcome {
            status: 400,
            reason: "Bad Request".to_string(),
        };
        assert!(ok.is_success());
        assert!(!bad.is_success());
        assert_eq!(reason_phrase(StatusCode::OK), "OK");
    }
}
