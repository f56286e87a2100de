use secrecy::{ExposeSecret, Secret};

#[derive(Clone)]
/// Mailer account password (`pwd`).
///
/// The value is wrapped in [`Secret`] so it is redacted from `Debug` output and
/// zeroized on drop. It is only exposed while the request body is encoded.
pub struct Password(Secret<String>);

impl Password {
    /// Wrap a password. No validation is performed; the backend decides.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Secret::new(value.into()))
    }

    /// Borrow the plaintext password.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone)]
/// Account credentials sent in the body of every request (`creds`).
///
/// Both parts travel in plaintext inside the JSON body, so confidentiality
/// depends entirely on the endpoint using TLS.
pub struct Credentials {
    email: String,
    password: Password,
}

impl Credentials {
    /// Create credentials from the account email and its password.
    pub fn new(email: impl Into<String>, password: impl Into<Password>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Account email used to authenticate against the backend.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}
