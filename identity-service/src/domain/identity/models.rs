use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::identity::errors::DisplayNameError;
use crate::identity::errors::EmailError;
use crate::identity::errors::IdentityIdError;
use crate::identity::errors::PhoneError;

/// Identity aggregate entity.
///
/// The durable account record: credentials, login status, and the token
/// generation counter. `secret_hash` never leaves the domain; outward-facing
/// code sees [`IdentityProfile`] instead.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: IdentityId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub phone: Option<PhoneNumber>,
    pub secret_hash: String,
    pub status: AccountStatus,
    pub last_authenticated_at: Option<DateTime<Utc>>,
    /// Incremented on logout; every access/refresh token carries a snapshot
    /// of this counter and is valid only while the snapshot matches.
    pub token_generation: u64,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Identity unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityId(pub Uuid);

impl IdentityId {
    /// Generate a new random identity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identity ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, IdentityIdError> {
        Uuid::parse_str(s)
            .map(IdentityId)
            .map_err(|e| IdentityIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Login status of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    LoggedIn,
    LoggedOut,
}

impl AccountStatus {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::LoggedIn => "logged_in",
            AccountStatus::LoggedOut => "logged_out",
        }
    }

    /// Parse the storage string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "logged_in" => Some(AccountStatus::LoggedIn),
            "logged_out" => Some(AccountStatus::LoggedOut),
            _ => None,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display name value type
///
/// Non-empty after trimming, at most 64 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MAX_LENGTH: usize = 64;

    /// Create a new valid display name.
    ///
    /// # Errors
    /// * `Empty` - Name is empty or whitespace only
    /// * `TooLong` - Name longer than 64 characters
    pub fn new(name: String) -> Result<Self, DisplayNameError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(DisplayNameError::Empty);
        }
        if name.chars().count() > Self::MAX_LENGTH {
            return Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: name.chars().count(),
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Phone number value type
///
/// E.164-shaped: optional leading `+`, then 7 to 15 digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MIN_DIGITS: usize = 7;
    const MAX_DIGITS: usize = 15;

    /// Create a new validated phone number.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 7 digits
    /// * `TooLong` - More than 15 digits
    /// * `InvalidCharacters` - Anything but digits after the optional `+`
    pub fn new(phone: String) -> Result<Self, PhoneError> {
        let digits = phone.strip_prefix('+').unwrap_or(&phone);

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::InvalidCharacters);
        }

        let count = digits.len();
        if count < Self::MIN_DIGITS {
            return Err(PhoneError::TooShort {
                min: Self::MIN_DIGITS,
                actual: count,
            });
        }
        if count > Self::MAX_DIGITS {
            return Err(PhoneError::TooLong {
                max: Self::MAX_DIGITS,
                actual: count,
            });
        }

        Ok(Self(phone))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to register a new identity with domain types
#[derive(Debug)]
pub struct RegisterIdentityCommand {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub phone: Option<PhoneNumber>,
    pub secret: String,
    pub image: Option<String>,
}

impl RegisterIdentityCommand {
    /// Construct a new register identity command.
    ///
    /// # Arguments
    /// * `name` - Validated display name
    /// * `email` - Validated email address
    /// * `phone` - Optional validated phone number
    /// * `secret` - Plain text secret (hashed by the service)
    /// * `image` - Optional avatar reference
    pub fn new(
        name: DisplayName,
        email: EmailAddress,
        phone: Option<PhoneNumber>,
        secret: String,
        image: Option<String>,
    ) -> Self {
        Self {
            name,
            email,
            phone,
            secret,
            image,
        }
    }
}

/// The credential an identity authenticates with: email or phone.
///
/// Exactly one is present, so "neither supplied" is unrepresentable here;
/// request-level validation stays with the caller.
#[derive(Debug, Clone)]
pub enum LoginKey {
    Email(EmailAddress),
    Phone(PhoneNumber),
}

impl LoginKey {
    pub fn email(&self) -> Option<&EmailAddress> {
        match self {
            LoginKey::Email(email) => Some(email),
            LoginKey::Phone(_) => None,
        }
    }

    pub fn phone(&self) -> Option<&PhoneNumber> {
        match self {
            LoginKey::Email(_) => None,
            LoginKey::Phone(phone) => Some(phone),
        }
    }
}

/// Command to authenticate an existing identity
#[derive(Debug)]
pub struct AuthenticateCommand {
    pub key: LoginKey,
    pub secret: String,
}

impl AuthenticateCommand {
    pub fn new(key: LoginKey, secret: String) -> Self {
        Self { key, secret }
    }
}

/// Public-safe projection of an identity.
///
/// What leaves the subsystem: no secret hash, no generation counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    pub id: IdentityId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub phone: Option<PhoneNumber>,
    pub image: Option<String>,
    pub status: AccountStatus,
}

impl From<&Identity> for IdentityProfile {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            name: identity.name.clone(),
            email: identity.email.clone(),
            phone: identity.phone.clone(),
            image: identity.image.clone(),
            status: identity.status,
        }
    }
}

/// A signed token plus its expiry instant, so callers can relay the expiry
/// without re-parsing the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Access/refresh tuple issued at successful authentication.
///
/// Both tokens carry the same generation snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub identity: IdentityProfile,
    pub credentials: CredentialPair,
}

/// Outcome of a password-reset request.
///
/// `notification_sent` is internal bookkeeping: callers mapping this to a
/// wire response must report success either way, or the endpoint becomes an
/// account-enumeration oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordResetReceipt {
    pub notification_sent: bool,
}
