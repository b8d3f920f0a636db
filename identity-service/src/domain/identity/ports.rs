use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::identity::models::AuthenticateCommand;
use crate::domain::identity::models::AuthenticatedSession;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::IdentityProfile;
use crate::domain::identity::models::IssuedToken;
use crate::domain::identity::models::PasswordResetReceipt;
use crate::domain::identity::models::PhoneNumber;
use crate::domain::identity::models::RegisterIdentityCommand;
use crate::identity::errors::AuthError;
use crate::identity::errors::NotificationError;

/// Port for credential-lifecycle service operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new identity.
    ///
    /// No token is issued at registration; the caller must authenticate
    /// separately.
    ///
    /// # Errors
    /// * `IdentityAlreadyExists` - Email or phone is already registered
    /// * `StoreError` - Persistence operation failed
    async fn register_identity(
        &self,
        command: RegisterIdentityCommand,
    ) -> Result<IdentityProfile, AuthError>;

    /// Verify a secret and issue a credential pair.
    ///
    /// Unknown identity and wrong secret are indistinguishable: both fail
    /// with `InvalidCredentials`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - No such identity, or the secret is wrong
    /// * `StoreError` - Persistence operation failed
    async fn authenticate(
        &self,
        command: AuthenticateCommand,
    ) -> Result<AuthenticatedSession, AuthError>;

    /// Log an identity out and invalidate every outstanding access/refresh
    /// token by bumping the generation counter.
    ///
    /// # Errors
    /// * `IdentityNotFound` - Identity does not exist
    /// * `StoreError` - Persistence operation failed
    async fn logout(&self, id: &IdentityId) -> Result<(), AuthError>;

    /// Check an access token against signature, expiry, kind, and the
    /// identity's current generation.
    ///
    /// # Returns
    /// Public-safe projection of the token's subject
    ///
    /// # Errors
    /// * `AccessTokenExpired` - Token is past its expiry
    /// * `InvalidAccessToken` - Malformed, tampered, wrong kind, or stale
    ///   generation
    /// * `IdentityNotFound` - Subject no longer exists
    async fn verify_access_token(&self, token: &str) -> Result<IdentityProfile, AuthError>;

    /// Exchange a valid refresh token for a fresh access token.
    ///
    /// Never issues a new refresh token.
    ///
    /// # Errors
    /// * `RefreshTokenExpired` - Token is past its expiry
    /// * `InvalidRefreshToken` - Malformed, tampered, wrong kind, or stale
    ///   generation
    /// * `IdentityNotFound` - Subject no longer exists
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<IssuedToken, AuthError>;

    /// Issue and deliver a password-reset token for the given email.
    ///
    /// An unknown email still returns success (with no notification
    /// attempted) so the endpoint cannot be used to enumerate accounts.
    ///
    /// # Errors
    /// * `NotificationDeliveryFailed` - The token was generated but could
    ///   not be delivered
    async fn request_password_reset(
        &self,
        email: &EmailAddress,
    ) -> Result<PasswordResetReceipt, AuthError>;

    /// Redeem a password-reset token and store a new secret.
    ///
    /// # Errors
    /// * `ResetTokenExpired` - Token is past its expiry
    /// * `InvalidResetToken` - Malformed, tampered, or wrong kind
    /// * `IdentityNotFound` - Subject no longer exists
    /// * `PasswordResetFailed` - The stored hash did not change, or is not
    ///   hash-shaped (collaborator defect)
    async fn reset_password(&self, token: &str, new_secret: &str) -> Result<(), AuthError>;
}

/// Persistence operations for the identity aggregate.
///
/// Writes are deliberately narrow: one method per mutation, so a status
/// update can never touch the secret hash and the secret write path stays
/// auditable.
#[async_trait]
pub trait IdentityStore: Send + Sync + 'static {
    /// Persist a new identity.
    ///
    /// # Errors
    /// * `IdentityAlreadyExists` - Email or phone is already registered
    /// * `StoreError` - Persistence operation failed
    async fn create(&self, identity: Identity) -> Result<Identity, AuthError>;

    /// Retrieve an identity by identifier.
    ///
    /// # Returns
    /// Optional identity (None if not found)
    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, AuthError>;

    /// Retrieve an identity matching the supplied email or phone.
    ///
    /// The returned record includes the stored secret hash.
    async fn find_by_email_or_phone(
        &self,
        email: Option<EmailAddress>,
        phone: Option<PhoneNumber>,
    ) -> Result<Option<Identity>, AuthError>;

    /// Whether any identity matches the supplied email or phone.
    async fn exists_by_email_or_phone(
        &self,
        email: Option<EmailAddress>,
        phone: Option<PhoneNumber>,
    ) -> Result<bool, AuthError>;

    /// Mark an identity as logged in at the given instant.
    ///
    /// Touches status and the login timestamp only; the stored secret hash
    /// is untouched.
    ///
    /// # Errors
    /// * `IdentityNotFound` - Identity does not exist
    async fn record_login(&self, id: &IdentityId, at: DateTime<Utc>) -> Result<(), AuthError>;

    /// Mark an identity as logged out and increment its token generation by
    /// exactly one, as a single atomic update.
    ///
    /// # Returns
    /// The new generation value
    ///
    /// # Errors
    /// * `IdentityNotFound` - Identity does not exist
    async fn record_logout(&self, id: &IdentityId) -> Result<u64, AuthError>;

    /// Replace the stored secret with the hash of `new_secret`.
    ///
    /// Hashing happens inside the store; no other write path can modify the
    /// secret hash.
    ///
    /// # Errors
    /// * `IdentityNotFound` - Identity does not exist
    /// * `Password` - Hashing failed
    async fn set_secret(&self, id: &IdentityId, new_secret: &str) -> Result<(), AuthError>;
}

/// Delivery of password-reset messages.
#[async_trait]
pub trait NotificationPort: Send + Sync + 'static {
    /// Deliver a password-reset token to an email address.
    ///
    /// # Arguments
    /// * `email` - Recipient address
    /// * `token` - The signed reset token, to be embedded as a link or code
    /// * `display_name` - Recipient's display name for the message body
    ///
    /// # Errors
    /// * `DeliveryFailed` - The message could not be handed off
    /// * `Timeout` - Delivery timed out
    async fn send_password_reset(
        &self,
        email: &EmailAddress,
        token: &str,
        display_name: &str,
    ) -> Result<(), NotificationError>;
}
