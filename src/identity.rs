//! Authenticated identity as handed over by the OIDC login layer.
//!
//! The login layer validates the ID token before a principal is installed on
//! a session, so nothing here inspects signatures or expiry. Claims are kept
//! as the decoded JSON object the provider issued.

use serde_json::{Map, Value};

/// Claim carrying the provider session fingerprint (Keycloak and some other OPs).
pub const SESSION_STATE_CLAIM: &str = "session_state";

/// Raw ID token plus its decoded claims.
#[derive(Debug, Clone, PartialEq)]
pub struct IdToken {
    /// Compact serialized token, forwarded verbatim as `id_token_hint`.
    pub token_value: String,
    pub claims: Map<String, Value>,
}

impl IdToken {
    #[must_use]
    pub fn new(token_value: impl Into<String>, claims: Map<String, Value>) -> Self {
        Self { token_value: token_value.into(), claims }
    }

    /// String-valued claim, `None` when absent or not a string.
    #[must_use]
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }
}

/// Principal stored on a session after a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct OidcUser {
    pub subject: String,
    pub preferred_username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub id_token: Option<IdToken>,
}

impl OidcUser {
    /// Name to display, preferring `preferred_username` over the subject.
    #[must_use]
    pub fn username(&self) -> &str {
        self.preferred_username.as_deref().unwrap_or(&self.subject)
    }
}
