//! Client layer: resolves the endpoint, drives the transport and maps wire ↔ domain.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::domain::EmailRequest;

/// Request timeout applied by [`MailerClient::new`] and the default builder.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Path appended to the base URL for every send.
pub const SEND_PATH: &str = "/send";

/// Boxed future returned by [`HttpTransport`] implementations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error type produced by [`HttpTransport`] implementations.
pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug)]
/// Raw HTTP response as seen by the client: status line and body text.
///
/// `body` is an error when the status line arrived but reading the body failed
/// (truncation, reset, timeout mid-body).
pub struct HttpResponse {
    pub status: u16,
    pub body: Result<String, BoxError>,
}

/// The network seam used by [`MailerClient`].
///
/// The default implementation is backed by `reqwest`. Inject your own through
/// [`MailerClientBuilder::transport`] to route requests elsewhere or to fake the
/// backend in tests. Implementations must be safe to share between tasks.
pub trait HttpTransport: Send + Sync {
    /// POST `body` to `url` with `Content-Type: application/json`.
    ///
    /// Any status code is a successful round-trip; return `Err` only when no
    /// response could be obtained. Failures while reading the body belong in
    /// [`HttpResponse::body`].
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: Vec<u8>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: Vec<u8>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(BoxError::from);
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`MailerClient::send`].
///
/// A send yields exactly one of these or `Ok(())`.
pub enum MailerError {
    /// The request could not be encoded as JSON. Nothing was sent.
    #[error("failed to serialize email request: {0}")]
    Serialization(#[source] serde_json::Error),

    /// No response was obtained: invalid or refused endpoint, DNS, connect,
    /// TLS, or timeout before the status line.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// A response arrived but its body could not be read or is not the
    /// expected JSON shape.
    ///
    /// The request reached the server, so delivery may still have happened.
    #[error("email sent but failed to decode response")]
    ResponseDecode(#[source] BoxError),

    /// The backend answered `success: false`. `message` is its text verbatim.
    #[error("failed to send email: {message}")]
    Rejected { message: String },
}

impl MailerError {
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_response_decode(&self) -> bool {
        matches!(self, Self::ResponseDecode(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

#[derive(Debug, thiserror::Error)]
/// Local refusal to contact the configured endpoint.
///
/// Surfaced to callers wrapped in [`MailerError::Transport`].
pub enum EndpointError {
    #[error("invalid endpoint URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Credentials travel in the request body, so plain `http` needs an explicit opt-in.
    #[error(
        "refusing to send credentials over plaintext http to {url}; use https or enable allow_plaintext_http"
    )]
    PlaintextHttp { url: String },

    #[error("unsupported URL scheme {scheme:?} in {url}")]
    UnsupportedScheme { url: String, scheme: String },
}

fn resolve_endpoint(base_url: &str, allow_plaintext_http: bool) -> Result<Url, EndpointError> {
    let raw = format!("{}{}", base_url.trim_end_matches('/'), SEND_PATH);
    let url = Url::parse(&raw).map_err(|source| EndpointError::InvalidUrl {
        url: raw.clone(),
        source,
    })?;

    let scheme = url.scheme().to_owned();
    match scheme.as_str() {
        "https" => Ok(url),
        "http" if allow_plaintext_http => Ok(url),
        "http" => Err(EndpointError::PlaintextHttp { url: raw }),
        _ => Err(EndpointError::UnsupportedScheme { url: raw, scheme }),
    }
}

#[derive(Clone)]
enum HttpBackend {
    Default,
    Reqwest(reqwest::Client),
    Custom(Arc<dyn HttpTransport>),
}

#[derive(Clone)]
/// Builder for [`MailerClient`].
///
/// Use this when you need to customize the timeout, user-agent, HTTP client,
/// or when the backend is reachable only over plain `http`.
pub struct MailerClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: Option<String>,
    allow_plaintext_http: bool,
    backend: HttpBackend,
}

impl MailerClientBuilder {
    /// Create a builder with the default 10 second timeout and `https`-only policy.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            allow_plaintext_http: false,
            backend: HttpBackend::Default,
        }
    }

    /// Set the timeout applied to the entire request.
    ///
    /// Ignored when a client or transport is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the HTTP `User-Agent` header.
    ///
    /// Ignored when a client or transport is supplied.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Allow `http://` base URLs.
    ///
    /// Credentials are sent in the request body, so only enable this for
    /// loopback or otherwise trusted networks.
    pub fn allow_plaintext_http(mut self, allow: bool) -> Self {
        self.allow_plaintext_http = allow;
        self
    }

    /// Use a pre-configured `reqwest` client. Its own timeout settings apply.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.backend = HttpBackend::Reqwest(client);
        self
    }

    /// Use a custom [`HttpTransport`].
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.backend = HttpBackend::Custom(transport);
        self
    }

    /// Build a [`MailerClient`].
    ///
    /// Fails with [`MailerError::Transport`] only if the `reqwest` client cannot
    /// be constructed. The base URL is not checked until the first send.
    pub fn build(self) -> Result<MailerClient, MailerError> {
        let (http, timeout): (Arc<dyn HttpTransport>, Option<Duration>) = match self.backend {
            HttpBackend::Custom(transport) => (transport, None),
            HttpBackend::Reqwest(client) => (Arc::new(ReqwestTransport { client }), None),
            HttpBackend::Default => {
                let mut builder = reqwest::Client::builder().timeout(self.timeout);
                if let Some(user_agent) = self.user_agent {
                    builder = builder.user_agent(user_agent);
                }
                let client = builder
                    .build()
                    .map_err(|err| MailerError::Transport(Box::new(err)))?;
                (Arc::new(ReqwestTransport { client }), Some(self.timeout))
            }
        };

        Ok(MailerClient {
            base_url: self.base_url,
            allow_plaintext_http: self.allow_plaintext_http,
            timeout,
            http,
        })
    }
}

impl fmt::Debug for MailerClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = match self.backend {
            HttpBackend::Default => "default",
            HttpBackend::Reqwest(_) => "reqwest",
            HttpBackend::Custom(_) => "custom",
        };
        f.debug_struct("MailerClientBuilder")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("allow_plaintext_http", &self.allow_plaintext_http)
            .field("backend", &backend)
            .finish()
    }
}

#[derive(Clone)]
/// Client for the mailer `/send` endpoint.
///
/// Create it once and reuse it; clones share the underlying HTTP transport and
/// concurrent sends do not share any per-call state.
///
/// Success is decided by the `success` field of the response body alone. The
/// HTTP status line is not inspected, so a `500` carrying `{"success": true}`
/// is a successful send.
pub struct MailerClient {
    base_url: String,
    allow_plaintext_http: bool,
    timeout: Option<Duration>,
    http: Arc<dyn HttpTransport>,
}

impl MailerClient {
    /// Create a client for the mailer hosted at `base_url` (e.g. `https://mailer.example.com`).
    ///
    /// Requests time out after [`DEFAULT_TIMEOUT`]. Nothing is validated here;
    /// a malformed or non-`https` URL fails on [`MailerClient::send`].
    /// Use [`MailerClient::builder`] for more control.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        match MailerClientBuilder::new(base_url.clone()).build() {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "failed to build HTTP client with default timeout, falling back to reqwest defaults"
                );
                Self {
                    base_url,
                    allow_plaintext_http: false,
                    timeout: None,
                    http: Arc::new(ReqwestTransport {
                        client: reqwest::Client::default(),
                    }),
                }
            }
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(base_url: impl Into<String>) -> MailerClientBuilder {
        MailerClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Timeout configured on the built-in transport, `None` when the HTTP
    /// client or transport was supplied by the caller.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Send one email through the mailer backend.
    ///
    /// A single attempt is made; nothing is retried.
    ///
    /// Errors:
    /// - [`MailerError::Serialization`] if the request cannot be encoded,
    /// - [`MailerError::Transport`] if the endpoint is invalid or refused, or no response arrives,
    /// - [`MailerError::ResponseDecode`] if the body is not the expected JSON,
    /// - [`MailerError::Rejected`] if the backend reports `success: false`.
    #[tracing::instrument(
        name = "mailer.send",
        level = "debug",
        skip_all,
        fields(base_url = %self.base_url, recipients = request.to_list().len())
    )]
    pub async fn send(&self, request: EmailRequest) -> Result<(), MailerError> {
        let body = crate::transport::encode_send_email_json(&request)
            .map_err(MailerError::Serialization)?;

        let endpoint = resolve_endpoint(&self.base_url, self.allow_plaintext_http)
            .map_err(|err| MailerError::Transport(Box::new(err)))?;

        let response = self
            .http
            .post_json(endpoint.as_str(), body)
            .await
            .map_err(MailerError::Transport)?;
        tracing::debug!(status = response.status, "mailer responded");

        let body = response.body.map_err(MailerError::ResponseDecode)?;
        let parsed = crate::transport::decode_send_email_json_response(&body)
            .map_err(|err| MailerError::ResponseDecode(Box::new(err)))?;

        if !parsed.success {
            tracing::debug!("mailer rejected the email");
            return Err(MailerError::Rejected {
                message: parsed.message,
            });
        }

        tracing::debug!("mailer accepted the email");
        Ok(())
    }
}

impl fmt::Debug for MailerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerClient")
            .field("base_url", &self.base_url)
            .field("allow_plaintext_http", &self.allow_plaintext_http)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::{Value, json};

    use crate::domain::{Credentials, EmailRequest};

    use super::*;

    #[derive(Clone)]
    struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    struct FakeTransportState {
        calls: usize,
        last_url: Option<String>,
        last_body: Vec<u8>,
        response: Result<(u16, Result<String, String>), String>,
    }

    impl FakeTransport {
        fn new(status: u16, body: impl Into<String>) -> Self {
            Self::with_response(Ok((status, Ok(body.into()))))
        }

        fn failing(message: impl Into<String>) -> Self {
            Self::with_response(Err(message.into()))
        }

        fn failing_body(status: u16, message: impl Into<String>) -> Self {
            Self::with_response(Ok((status, Err(message.into()))))
        }

        fn with_response(response: Result<(u16, Result<String, String>), String>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    calls: 0,
                    last_url: None,
                    last_body: Vec::new(),
                    response,
                })),
            }
        }

        fn calls(&self) -> usize {
            self.state.lock().unwrap().calls
        }

        fn last_request(&self) -> (Option<String>, Value) {
            let state = self.state.lock().unwrap();
            let body = serde_json::from_slice(&state.last_body).unwrap_or(Value::Null);
            (state.last_url.clone(), body)
        }
    }

    impl HttpTransport for FakeTransport {
        fn post_json<'a>(
            &'a self,
            url: &'a str,
            body: Vec<u8>,
        ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
            Box::pin(async move {
                let response = {
                    let mut state = self.state.lock().unwrap();
                    state.calls += 1;
                    state.last_url = Some(url.to_owned());
                    state.last_body = body;
                    state.response.clone()
                };
                let (status, body) = response.map_err(BoxError::from)?;
                Ok(HttpResponse {
                    status,
                    body: body.map_err(BoxError::from),
                })
            })
        }
    }

    fn make_client(base_url: &str, transport: FakeTransport) -> MailerClient {
        MailerClient::builder(base_url)
            .transport(Arc::new(transport))
            .build()
            .unwrap()
    }

    fn request() -> EmailRequest {
        EmailRequest::new(
            Credentials::new("noreply@example.com", "pw"),
            vec!["user@example.com".to_owned()],
            "Welcome",
            "<p>hi</p>",
        )
        .html()
        .from_name("Bot")
    }

    #[tokio::test]
    async fn send_posts_json_to_send_endpoint() {
        let transport = FakeTransport::new(200, r#"{"success": true, "message": ""}"#);
        let client = make_client("https://mailer.example.invalid", transport.clone());

        client.send(request()).await.unwrap();

        let (url, body) = transport.last_request();
        assert_eq!(url.as_deref(), Some("https://mailer.example.invalid/send"));
        assert_eq!(
            body,
            json!({
                "creds": {"email": "noreply@example.com", "pwd": "pw"},
                "to_list": ["user@example.com"],
                "subject": "Welcome",
                "body": "<p>hi</p>",
                "html": true,
                "from_name": "Bot"
            })
        );
    }

    #[tokio::test]
    async fn send_keeps_path_prefix_and_trims_trailing_slash() {
        let transport = FakeTransport::new(200, r#"{"success": true}"#);
        let client = make_client("https://example.invalid/api/mailer/", transport.clone());

        client.send(request()).await.unwrap();

        let (url, _) = transport.last_request();
        assert_eq!(url.as_deref(), Some("https://example.invalid/api/mailer/send"));
    }

    #[tokio::test]
    async fn send_maps_success_false_to_rejected() {
        let transport =
            FakeTransport::new(200, r#"{"success": false, "message": "invalid recipient"}"#);
        let client = make_client("https://example.invalid", transport);

        let err = client.send(request()).await.unwrap_err();
        match &err {
            MailerError::Rejected { message } => assert_eq!(message, "invalid recipient"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "failed to send email: invalid recipient");
    }

    #[tokio::test]
    async fn send_ignores_http_status_when_body_reports_success() {
        let transport = FakeTransport::new(500, r#"{"success": true}"#);
        let client = make_client("https://example.invalid", transport);

        client.send(request()).await.unwrap();
    }

    #[tokio::test]
    async fn send_maps_invalid_json_to_response_decode() {
        let transport = FakeTransport::new(200, "");
        let client = make_client("https://example.invalid", transport);

        let err = client.send(request()).await.unwrap_err();
        assert!(err.is_response_decode(), "unexpected error: {err:?}");
        assert_eq!(err.to_string(), "email sent but failed to decode response");
    }

    #[tokio::test]
    async fn send_treats_null_message_as_empty() {
        let transport = FakeTransport::new(200, r#"{"success": true, "message": null}"#);
        let client = make_client("https://example.invalid", transport);
        client.send(request()).await.unwrap();

        let transport = FakeTransport::new(200, r#"{"success": false, "message": null}"#);
        let client = make_client("https://example.invalid", transport);
        let err = client.send(request()).await.unwrap_err();
        match err {
            MailerError::Rejected { message } => assert_eq!(message, ""),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_maps_body_read_failure_to_response_decode() {
        let transport = FakeTransport::failing_body(200, "connection reset");
        let client = make_client("https://example.invalid", transport);

        let err = client.send(request()).await.unwrap_err();
        let MailerError::ResponseDecode(source) = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(source.to_string(), "connection reset");
        assert_eq!(err.to_string(), "email sent but failed to decode response");
    }

    #[tokio::test]
    async fn send_maps_empty_object_to_rejection_with_empty_message() {
        let transport = FakeTransport::new(200, "{}");
        let client = make_client("https://example.invalid", transport);

        let err = client.send(request()).await.unwrap_err();
        assert!(err.is_rejected());
        assert_eq!(err.to_string(), "failed to send email: ");
    }

    #[tokio::test]
    async fn send_maps_transport_failure() {
        let transport = FakeTransport::failing("connection refused");
        let client = make_client("https://example.invalid", transport);

        let err = client.send(request()).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[tokio::test]
    async fn send_refuses_plaintext_http_by_default() {
        let transport = FakeTransport::new(200, r#"{"success": true}"#);
        let client = make_client("http://example.invalid", transport.clone());

        let err = client.send(request()).await.unwrap_err();
        let MailerError::Transport(source) = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(matches!(
            source.downcast_ref::<EndpointError>(),
            Some(EndpointError::PlaintextHttp { .. })
        ));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn send_allows_plaintext_http_when_opted_in() {
        let transport = FakeTransport::new(200, r#"{"success": true}"#);
        let client = MailerClient::builder("http://127.0.0.1:8080")
            .allow_plaintext_http(true)
            .transport(Arc::new(transport.clone()))
            .build()
            .unwrap();

        client.send(request()).await.unwrap();
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn send_surfaces_malformed_base_url_as_transport_error() {
        let transport = FakeTransport::new(200, r#"{"success": true}"#);
        let client = make_client("not a url", transport.clone());

        let err = client.send(request()).await.unwrap_err();
        let MailerError::Transport(source) = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(matches!(
            source.downcast_ref::<EndpointError>(),
            Some(EndpointError::InvalidUrl { .. })
        ));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn send_rejects_unsupported_scheme() {
        let transport = FakeTransport::new(200, r#"{"success": true}"#);
        let client = make_client("ftp://example.invalid", transport);

        let err = client.send(request()).await.unwrap_err();
        let MailerError::Transport(source) = &err else {
            panic!("unexpected error: {err:?}");
        };
        match source.downcast_ref::<EndpointError>() {
            Some(EndpointError::UnsupportedScheme { scheme, .. }) => assert_eq!(scheme, "ftp"),
            other => panic!("unexpected source: {other:?}"),
        }
    }

    #[test]
    fn new_uses_default_timeout() {
        let client = MailerClient::new("https://example.invalid");
        assert_eq!(client.timeout(), Some(DEFAULT_TIMEOUT));
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(10));
        assert_eq!(client.base_url(), "https://example.invalid");
    }

    #[test]
    fn builder_timeout_override_is_applied() {
        let client = MailerClient::builder("https://example.invalid")
            .timeout(Duration::from_secs(3))
            .user_agent("mailer-test/1.0")
            .build()
            .unwrap();
        assert_eq!(client.timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn builder_with_custom_client_reports_no_timeout() {
        let client = MailerClient::builder("https://example.invalid")
            .http_client(reqwest::Client::new())
            .build()
            .unwrap();
        assert_eq!(client.timeout(), None);
    }

    #[test]
    fn resolve_endpoint_appends_send_path() {
        let url = resolve_endpoint("https://example.invalid", false).unwrap();
        assert_eq!(url.as_str(), "https://example.invalid/send");

        let url = resolve_endpoint("https://example.invalid///", false).unwrap();
        assert_eq!(url.as_str(), "https://example.invalid/send");
    }

    #[test]
    fn endpoint_error_messages_are_human_readable() {
        let err = resolve_endpoint("http://example.invalid", false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "refusing to send credentials over plaintext http to http://example.invalid/send; use https or enable allow_plaintext_http"
        );
    }
}
