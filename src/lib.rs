//! Typed async Rust client for a JSON mailer HTTP API.
//!
//! The crate talks to a single endpoint, `POST {base_url}/send`, and maps the
//! backend's `{"success": bool, "message": string}` answer onto
//! `Result<(), MailerError>`. It is layered as a domain layer of plain types, a
//! transport layer for wire-format details, and a small client layer driving
//! the request.
//!
//! Account credentials are part of every request body. Confidentiality relies
//! on TLS, so `http://` base URLs are refused unless explicitly allowed with
//! [`MailerClientBuilder::allow_plaintext_http`].
//!
//! ```rust,no_run
//! use mailer_client::{Credentials, EmailRequest, MailerClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailer_client::MailerError> {
//!     let client = MailerClient::new("https://mailer.example.com");
//!     let request = EmailRequest::new(
//!         Credentials::new("noreply@example.com", "..."),
//!         vec!["user@example.com".to_owned()],
//!         "Welcome!",
//!         "<h1>Hello world</h1>",
//!     )
//!     .html()
//!     .from_name("Example Bot");
//!     client.send(request).await?;
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod settings;
mod transport;

pub use client::{
    BoxError, BoxFuture, DEFAULT_TIMEOUT, EndpointError, HttpResponse, HttpTransport,
    MailerClient, MailerClientBuilder, MailerError, SEND_PATH,
};
pub use domain::{ContentType, Credentials, EmailRequest, EmailResponse, Password};
pub use settings::MailerSettings;
