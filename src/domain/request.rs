use crate::domain::value::Credentials;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// How the backend should interpret [`EmailRequest::body`].
pub enum ContentType {
    #[default]
    PlainText,
    Html,
}

impl ContentType {
    /// Wire representation (`html`): `true` for HTML bodies.
    pub fn is_html(self) -> bool {
        matches!(self, Self::Html)
    }
}

impl From<bool> for ContentType {
    fn from(html: bool) -> Self {
        if html { Self::Html } else { Self::PlainText }
    }
}

#[derive(Debug, Clone)]
/// A single email-send intent.
///
/// Nothing is validated locally: recipients, subject and body are forwarded
/// as-is and the backend is the only judge of what is acceptable.
///
/// ```rust
/// use mailer_client::{ContentType, Credentials, EmailRequest};
///
/// let request = EmailRequest::new(
///     Credentials::new("noreply@example.com", "secret"),
///     vec!["user@example.com".to_owned()],
///     "Welcome",
///     "<h1>Hello</h1>",
/// )
/// .content_type(ContentType::Html)
/// .from_name("Example Bot");
///
/// assert!(request.content_type_value().is_html());
/// ```
pub struct EmailRequest {
    credentials: Credentials,
    to_list: Vec<String>,
    subject: String,
    body: String,
    content_type: ContentType,
    from_name: Option<String>,
}

impl EmailRequest {
    pub fn new(
        credentials: Credentials,
        to_list: Vec<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            to_list,
            subject: subject.into(),
            body: body.into(),
            content_type: ContentType::default(),
            from_name: None,
        }
    }

    /// Mark the body as HTML or plain text.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Shorthand for `content_type(ContentType::Html)`.
    pub fn html(self) -> Self {
        self.content_type(ContentType::Html)
    }

    /// Set the display name shown as the sender.
    pub fn from_name(mut self, from_name: impl Into<String>) -> Self {
        self.from_name = Some(from_name.into());
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn to_list(&self) -> &[String] {
        &self.to_list
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn content_type_value(&self) -> ContentType {
        self.content_type
    }

    pub fn from_name_value(&self) -> Option<&str> {
        self.from_name.as_deref()
    }
}
