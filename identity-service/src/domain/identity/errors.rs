use thiserror::Error;

/// Error for IdentityId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for DisplayName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisplayNameError {
    #[error("Display name is empty")]
    Empty,

    #[error("Display name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for PhoneNumber validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Phone number too short: minimum {min} digits, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Phone number too long: maximum {max} digits, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Phone number contains invalid characters (digits with optional leading + allowed)")]
    InvalidCharacters,
}

/// Error for password-reset notification delivery
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Failed to deliver notification: {0}")]
    DeliveryFailed(String),

    #[error("Notification delivery timeout: {0}")]
    Timeout(String),
}

/// Top-level error for all credential-lifecycle operations
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Business-rule violations. Credential and token failures never reveal
    // which specific check failed.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Identity already exists: {0}")]
    IdentityAlreadyExists(String),

    #[error("Identity not found: {0}")]
    IdentityNotFound(String),

    #[error("Invalid access token")]
    InvalidAccessToken,

    #[error("Access token is expired")]
    AccessTokenExpired,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Refresh token is expired")]
    RefreshTokenExpired,

    #[error("Invalid password reset token")]
    InvalidResetToken,

    #[error("Password reset token is expired")]
    ResetTokenExpired,

    #[error("Failed to deliver password reset notification: {0}")]
    NotificationDeliveryFailed(String),

    // Internal-error class: a collaborator defect, not a caller mistake.
    #[error("Password reset failed: {0}")]
    PasswordResetFailed(String),

    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid identity ID: {0}")]
    InvalidIdentityId(#[from] IdentityIdError),

    #[error("Invalid display name: {0}")]
    InvalidDisplayName(#[from] DisplayNameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),

    // Infrastructure errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Database error: {0}")]
    StoreError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Unknown(err.to_string())
    }
}
