use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Email and API token pair authorizing every remote call.
///
/// Loaded once at startup and never mutated. `Debug` output hides the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    email: String,
    api_token: String,
}

impl Credential {
    pub fn new(email: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_token: api_token.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Value for the `Authorization` header: `Basic base64(email:token)`.
    pub fn authorization_header(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.email, self.api_token));
        format!("Basic {encoded}")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_header_is_basic_email_token() {
        let credential = Credential::new("admin@example.com", "secret");
        // base64("admin@example.com:secret")
        assert_eq!(credential.authorization_header(), "Basic YWRtaW5AZXhhbXBsZS5jb206c2VjcmV0");
    }

    #[test]
    fn debug_output_hides_token() {
        let credential = Credential::new("admin@example.com", "ATATT3xFfGF0-super-secret");
        let rendered = format!("{credential:?}");
        assert!(rendered.contains("admin@example.com"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("super-secret"));
    }
}
