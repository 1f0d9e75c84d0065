//! HTTP Transport
//!
//! HTTP client interface and implementations for provider requests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::TransportError;

/// Maximum accepted response body size.
pub const MAX_RESPONSE_SIZE: usize = 1048576;

/// HTTP GET request definition.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// Request URL.
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// GET request accepting JSON.
    pub fn get_json(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: [("accept".to_string(), "application/json".to_string())]
                .into_iter()
                .collect(),
            timeout: None,
        }
    }

    /// Attach a bearer token.
    pub fn bearer(mut self, token: &str) -> Self {
        self.headers
            .insert("authorization".to_string(), format!("Bearer {}", token));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP response definition.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: String,
}

impl HttpResponse {
    /// 200 response with a JSON body.
    pub fn json<T: serde::Serialize>(body: &T) -> Self {
        Self::with_status(200, serde_json::to_string(body).unwrap_or_default())
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: [("content-type".to_string(), "application/json".to_string())]
                .into_iter()
                .collect(),
            body: body.into(),
        }
    }
}

/// HTTP transport interface (for dependency injection).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a GET request.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Issue a GET and decode a JSON body from a 200 response.
pub async fn get_json<T, R>(transport: &T, request: HttpRequest) -> Result<R, TransportError>
where
    T: HttpTransport + ?Sized,
    R: DeserializeOwned,
{
    let response = transport.send(request).await?;

    if response.status != 200 {
        return Err(TransportError::HttpStatus {
            status: response.status,
        });
    }

    serde_json::from_str(&response.body).map_err(|e| TransportError::InvalidJson {
        message: e.to_string(),
    })
}

/// Default reqwest-based HTTP transport.
pub struct ReqwestHttpTransport {
    client: reqwest::Client,
    default_timeout: Duration,
    max_response_size: usize,
}

impl ReqwestHttpTransport {
    /// Create new transport with default settings.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_options(Duration::from_secs(30), MAX_RESPONSE_SIZE)
    }

    /// Create transport with custom options.
    pub fn with_options(
        timeout: Duration,
        max_response_size: usize,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::ConnectionFailed {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            default_timeout: timeout,
            max_response_size,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut req_builder = self.client.get(&request.url).timeout(timeout);
        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout { timeout }
            } else {
                TransportError::ConnectionFailed {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();

        if (300..400).contains(&status) {
            let location = response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            return Err(TransportError::UnexpectedRedirect { location });
        }

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string().to_lowercase(), v.to_string());
            }
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_response_size {
                return Err(TransportError::ResponseTooLarge { size: len as usize });
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::ConnectionFailed {
                message: e.to_string(),
            })?;

        if body.len() > self.max_response_size {
            return Err(TransportError::ResponseTooLarge { size: body.len() });
        }

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Mock HTTP transport for testing, routing by URL.
#[derive(Default)]
pub struct MockHttpTransport {
    responses: Mutex<HashMap<String, HttpResponse>>,
    request_history: Mutex<Vec<HttpRequest>>,
}

impl MockHttpTransport {
    /// Create new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a response for a URL.
    pub fn set_response(&self, url: &str, response: HttpResponse) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
        self
    }

    /// Serve a JSON body with status 200 for a URL.
    pub fn set_json_response<T: serde::Serialize>(&self, url: &str, body: &T) -> &Self {
        self.set_response(url, HttpResponse::json(body))
    }

    /// Get request history.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        self.request_history.lock().unwrap().clone()
    }

    /// Number of requests sent to a URL.
    pub fn request_count(&self, url: &str) -> usize {
        self.request_history
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.clone();
        self.request_history.lock().unwrap().push(request);

        self.responses
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .ok_or_else(|| TransportError::ConnectionFailed {
                message: format!("No mock response for {}", url),
            })
    }
}
