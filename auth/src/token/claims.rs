use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Purpose tag of a token.
///
/// Closed set: every token carries exactly one kind, and verification rules
/// depend on it. Access and refresh tokens carry a generation snapshot;
/// password-reset tokens do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    PasswordReset,
}

impl TokenKind {
    /// Stable string form, matching the wire encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller asks the codec to sign.
///
/// Timestamps are stamped by the codec at issuance; the payload only carries
/// the business content. The constructors encode the kind-specific rule:
/// access and refresh tokens always carry a generation, password-reset
/// tokens never do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPayload {
    pub subject: String,
    pub kind: TokenKind,
    pub generation: Option<u64>,
}

impl TokenPayload {
    /// Payload for a short-lived access token.
    pub fn access(subject: impl ToString, generation: u64) -> Self {
        Self {
            subject: subject.to_string(),
            kind: TokenKind::Access,
            generation: Some(generation),
        }
    }

    /// Payload for a long-lived refresh token.
    pub fn refresh(subject: impl ToString, generation: u64) -> Self {
        Self {
            subject: subject.to_string(),
            kind: TokenKind::Refresh,
            generation: Some(generation),
        }
    }

    /// Payload for a single-purpose password-reset token.
    ///
    /// Carries no generation: reset tokens are not subject to the
    /// logout-driven invalidation scheme.
    pub fn password_reset(subject: impl ToString) -> Self {
        Self {
            subject: subject.to_string(),
            kind: TokenKind::PasswordReset,
            generation: None,
        }
    }
}

/// Signed claim set as it travels inside a token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (identity key)
    pub sub: String,

    /// Token purpose
    pub kind: TokenKind,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Generation snapshot; present only on access/refresh tokens
    #[serde(rename = "gen", skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
}
