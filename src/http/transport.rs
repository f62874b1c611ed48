use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error as _;
use std::time::Duration;
use tracing::{debug, error};

use crate::error::{CivicError, Result};

pub const USER_AGENT_VALUE: &str = concat!("Civic-Pass-MCP-Server-RS/", env!("CARGO_PKG_VERSION"));

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Response body: parsed JSON, or the raw text when a successful response is not JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub payload: Payload,
}

/// A single outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Map<String, Value>>,
    pub headers: Vec<(String, String)>,
    pub timeout_ms: Option<u64>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        HttpRequest {
            method,
            url: url.into(),
            body: None,
            headers: Vec::new(),
            timeout_ms: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        HttpRequest::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        HttpRequest::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()))
            .map(|(_, value)| value.as_str())
    }
}

/// One-shot HTTP client. Issues exactly one call per `send`, never retries
/// and never follows redirects; a 3xx is reported like any other non-2xx.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    default_timeout: Duration,
}

impl HttpTransport {
    pub fn new(default_timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(|e| CivicError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpTransport {
            client,
            default_timeout: Duration::from_millis(default_timeout_ms),
        })
    }

    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!("{} {}", request.method, redact_query(&request.url));

        let body = encode_body(&request)?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| CivicError::NetworkError(format!("Invalid header name: {}", e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| CivicError::NetworkError(format!("Invalid header value: {}", e)))?;
            headers.insert(name, value);
        }
        if let Some((content_type, bytes)) = &body {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(*content_type));
            }
            headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
        }

        let timeout = request
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout);

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(headers)
            .timeout(timeout);
        if let Some((_, bytes)) = body {
            builder = builder.body(bytes);
        }

        let response = builder.send().await.map_err(classify_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(classify_error)?;

        if !(200..300).contains(&status) {
            error!("HTTP {} from {}", status, redact_query(&request.url));
            return Err(CivicError::HttpStatus { status, body: text });
        }

        let payload = match serde_json::from_str::<Value>(&text) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(text),
        };

        Ok(HttpResponse { status, payload })
    }
}

/// Serialize the body as form fields when the caller asked for it, JSON otherwise.
fn encode_body(request: &HttpRequest) -> Result<Option<(&'static str, Vec<u8>)>> {
    let Some(body) = &request.body else {
        return Ok(None);
    };

    if request.content_type() == Some(FORM_CONTENT_TYPE) {
        let mut form = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in body {
            match value {
                Value::String(s) => form.append_pair(key, s),
                other => form.append_pair(key, &other.to_string()),
            };
        }
        Ok(Some((FORM_CONTENT_TYPE, form.finish().into_bytes())))
    } else {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| CivicError::SerializationError(format!("Failed to encode body: {}", e)))?;
        Ok(Some((JSON_CONTENT_TYPE, bytes)))
    }
}

fn classify_error(e: reqwest::Error) -> CivicError {
    if e.is_timeout() {
        return CivicError::Timeout;
    }

    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    CivicError::NetworkError(message)
}

// Query strings carry wallet addresses; log the path only.
fn redact_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TIMEOUT_MS;
    use mockito::Matcher;
    use serde_json::json;

    fn transport() -> HttpTransport {
        HttpTransport::new(DEFAULT_TIMEOUT_MS).unwrap()
    }

    fn form_fields() -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("grant_type".to_string(), json!("client_credentials"));
        body.insert("scope".to_string(), json!("read:pass write:pass"));
        body
    }

    #[tokio::test]
    async fn test_get_parses_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pass/status")
            .match_header("user-agent", USER_AGENT_VALUE)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"ACTIVE"}"#)
            .expect(1)
            .create_async()
            .await;

        let response = transport()
            .send(HttpRequest::get(format!("{}/pass/status", server.url())))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.payload, Payload::Json(json!({"status": "ACTIVE"})));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_json_success_falls_back_to_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/plain")
            .with_status(200)
            .with_body("ok, not json")
            .create_async()
            .await;

        let response = transport()
            .send(HttpRequest::get(format!("{}/plain", server.url())))
            .await
            .unwrap();

        assert_eq!(response.payload, Payload::Text("ok, not json".to_string()));
        assert!(response.payload.as_json().is_none());
    }

    #[tokio::test]
    async fn test_non_success_status_is_error_with_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/pass/status")
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let err = transport()
            .send(HttpRequest::get(format!("{}/pass/status", server.url())))
            .await
            .unwrap_err();

        match err {
            CivicError::HttpStatus { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_json_error_body_still_fails() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/token")
            .with_status(401)
            .with_body(r#"{"error":"invalid_client"}"#)
            .create_async()
            .await;

        let err = transport()
            .send(HttpRequest::post(format!("{}/oauth/token", server.url())).body(form_fields()))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), r#"HTTP 401: {"error":"invalid_client"}"#);
    }

    #[tokio::test]
    async fn test_form_encoded_body() {
        let encoded = "grant_type=client_credentials&scope=read%3Apass+write%3Apass";
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_header("content-type", FORM_CONTENT_TYPE)
            .match_header("content-length", Matcher::Exact(encoded.len().to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()),
                Matcher::UrlEncoded("scope".into(), "read:pass write:pass".into()),
            ]))
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        transport()
            .send(
                HttpRequest::post(format!("{}/oauth/token", server.url()))
                    .header("Content-Type", FORM_CONTENT_TYPE)
                    .body(form_fields()),
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_json_body_is_default() {
        let encoded = serde_json::to_vec(&form_fields()).unwrap();
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/echo")
            .match_header("content-type", JSON_CONTENT_TYPE)
            .match_header("content-length", Matcher::Exact(encoded.len().to_string()))
            .match_body(Matcher::Json(json!({
                "grant_type": "client_credentials",
                "scope": "read:pass write:pass"
            })))
            .with_status(201)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let response = transport()
            .send(HttpRequest::post(format!("{}/echo", server.url())).body(form_fields()))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_redirect_is_not_followed() {
        let mut server = mockito::Server::new_async().await;
        let _moved = server
            .mock("POST", "/oauth/token")
            .with_status(302)
            .with_header("location", "/moved")
            .with_body("moved")
            .expect(1)
            .create_async()
            .await;
        let target = server
            .mock("GET", "/moved")
            .with_status(200)
            .with_body(r#"{"status":"ACTIVE"}"#)
            .expect(0)
            .create_async()
            .await;

        let err = transport()
            .send(
                HttpRequest::post(format!("{}/oauth/token", server.url()))
                    .header("Content-Type", FORM_CONTENT_TYPE)
                    .body(form_fields()),
            )
            .await
            .unwrap_err();

        match err {
            CivicError::HttpStatus { status, body } => {
                assert_eq!(status, 302);
                assert_eq!(body, "moved");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        target.assert_async().await;
    }

    #[tokio::test]
    async fn test_timeout_is_distinct_from_network_error() {
        // Accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let mut sockets = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                sockets.push(socket);
            }
        });

        let err = transport()
            .send(HttpRequest::get(format!("http://{}/slow", addr)).timeout_ms(100))
            .await
            .unwrap_err();

        assert!(matches!(err, CivicError::Timeout), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = transport()
            .send(HttpRequest::get(format!("http://{}/gone", addr)).timeout_ms(2_000))
            .await
            .unwrap_err();

        match err {
            CivicError::NetworkError(message) => assert!(!message.is_empty()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_redact_query() {
        assert_eq!(
            redact_query("https://api.civic.com/pass/status?wallet=0xabc"),
            "https://api.civic.com/pass/status"
        );
    }
}
