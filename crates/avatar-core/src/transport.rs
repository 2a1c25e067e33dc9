//! Transport layer: one authenticated JSON round trip per call, classified into
//! [`AvatarError`] kinds. No retries happen here.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AvatarError, AvatarResult};
use crate::registry::SessionToken;
use crate::vendor::{self, API_KEY_HEADER};

/// Longest slice of a raw body carried inside an error.
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// The two header shapes the vendor accepts.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Account-level calls (token minting, listings).
    ApiKey,
    /// Session-scoped calls (open/start/task/stop).
    Bearer(SessionToken),
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::ApiKey => f.write_str("ApiKey"),
            Auth::Bearer(_) => f.write_str("Bearer(***)"),
        }
    }
}

/// A single vendor call, independent of the HTTP library used to perform it.
#[derive(Debug, Clone)]
pub struct VendorRequest {
    pub method: HttpMethod,
    pub path: &'static str,
    pub auth: Auth,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl VendorRequest {
    pub fn get(path: &'static str, auth: Auth, timeout: Duration) -> Self {
        Self { method: HttpMethod::Get, path, auth, body: None, timeout }
    }

    pub fn post(path: &'static str, auth: Auth, body: Option<Value>, timeout: Duration) -> Self {
        Self { method: HttpMethod::Post, path, auth, body, timeout }
    }
}

/// A successfully classified (2xx, JSON) vendor response.
#[derive(Debug, Clone)]
pub struct VendorResponse {
    pub status: u16,
    pub body: Value,
}

/// Performs vendor calls. Implemented by [`HttpTransport`] in production and by
/// scripted fakes in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform exactly one attempt. Non-2xx, non-JSON and network failures come
    /// back as the matching [`AvatarError`] kind.
    async fn call(&self, request: VendorRequest) -> AvatarResult<VendorResponse>;
}

/// reqwest-backed transport. Holds the API key; session tokens travel per request.
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> AvatarResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(AvatarError::Config("vendor API key is required".to_string()));
        }
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        match reqwest::Url::parse(&base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(AvatarError::Config(format!(
                    "base_url must be http or https, got scheme {:?}",
                    url.scheme()
                )))
            }
            Err(e) => return Err(AvatarError::Config(format!("invalid base_url {:?}: {}", base_url, e))),
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AvatarError::Config(e.to_string()))?;
        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, request: VendorRequest) -> AvatarResult<VendorResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(method = ?request.method, %url, auth = ?request.auth, "vendor call");

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        let builder = match &request.auth {
            Auth::ApiKey => builder.header(API_KEY_HEADER, &self.api_key),
            Auth::Bearer(token) => builder.bearer_auth(token.expose()),
        };
        let builder = builder
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(request.timeout);
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let res = builder
            .send()
            .await
            .map_err(|e| AvatarError::NetworkUnavailable(e.to_string()))?;
        let status = res.status().as_u16();
        let text = res
            .text()
            .await
            .map_err(|e| AvatarError::NetworkUnavailable(e.to_string()))?;

        classify_response(status, &text)
    }
}

/// Maps an HTTP status and raw body text onto the error taxonomy.
pub fn classify_response(status: u16, text: &str) -> AvatarResult<VendorResponse> {
    let parsed = serde_json::from_str::<Value>(text).ok();

    if !(200..300).contains(&status) {
        if parsed.as_ref().is_some_and(vendor::is_quota_exhausted) {
            return Err(AvatarError::QuotaExceeded(format!(
                "HTTP {}: {}",
                status,
                truncate(text)
            )));
        }
        let body = match &parsed {
            Some(v) => truncate(&v.to_string()),
            None => truncate(text),
        };
        return Err(AvatarError::Backend { status, body });
    }

    match parsed {
        Some(body) => Ok(VendorResponse { status, body }),
        None => Err(AvatarError::Protocol {
            status,
            detail: format!("non-JSON response: {}", truncate(text)),
        }),
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_json_passes_through() {
        let res = classify_response(200, r#"{"code":100,"data":{}}"#).unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.body["code"], 100);
    }

    #[test]
    fn success_with_html_is_protocol_error() {
        let html = format!("<html>{}</html>", "x".repeat(500));
        match classify_response(200, &html) {
            Err(AvatarError::Protocol { status, detail }) => {
                assert_eq!(status, 200);
                assert!(detail.len() < 250);
                assert!(detail.contains("<html>"));
            }
            other => panic!("expected protocol error, got {:?}", other),
        }
    }

    #[test]
    fn quota_code_on_error_status_is_quota() {
        let err = classify_response(400, r#"{"code":10007,"message":"quota"}"#).unwrap_err();
        assert!(matches!(err, AvatarError::QuotaExceeded(_)));
    }

    #[test]
    fn other_error_status_is_backend_with_raw_body() {
        match classify_response(503, "upstream down") {
            Err(AvatarError::Backend { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "upstream down");
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[test]
    fn error_status_with_json_keeps_parsed_body() {
        match classify_response(401, r#"{"error":{"code":"unauthorized"}}"#) {
            Err(AvatarError::Backend { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("unauthorized"));
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[test]
    fn bearer_auth_debug_is_redacted() {
        let auth = Auth::Bearer(SessionToken::new("secret-token"));
        assert_eq!(format!("{:?}", auth), "Bearer(***)");
    }

    #[test]
    fn http_transport_requires_api_key() {
        let err = HttpTransport::new("https://example.invalid", "   ").unwrap_err();
        assert!(matches!(err, AvatarError::Config(_)));
    }

    #[test]
    fn http_transport_trims_trailing_slash() {
        let t = HttpTransport::new("https://example.invalid/", "key").unwrap();
        assert_eq!(t.base_url(), "https://example.invalid");
    }

    #[test]
    fn http_transport_rejects_malformed_base_url() {
        for bad in ["api.heygen.com", "ftp://api.heygen.com", ""] {
            let err = HttpTransport::new(bad, "key").unwrap_err();
            assert!(matches!(err, AvatarError::Config(_)), "{:?} accepted", bad);
        }
    }

    #[tokio::test]
    async fn refused_connection_is_network_unavailable() {
        // Port 9 (discard) on loopback is closed on test hosts.
        let t = HttpTransport::new("http://127.0.0.1:9", "key").unwrap();
        let err = t
            .call(VendorRequest::get(
                vendor::AVATAR_LIST_PATH,
                Auth::ApiKey,
                Duration::from_secs(2),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AvatarError::NetworkUnavailable(_)));
    }
}
