use std::sync::Arc;

use async_trait::async_trait;
use auth::clock::Clock;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth::TokenError;
use auth::TokenKind;
use auth::TokenPayload;
use chrono::Duration;

use crate::domain::identity::models::AccountStatus;
use crate::domain::identity::models::AuthenticateCommand;
use crate::domain::identity::models::AuthenticatedSession;
use crate::domain::identity::models::CredentialPair;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::IdentityProfile;
use crate::domain::identity::models::IssuedToken;
use crate::domain::identity::models::PasswordResetReceipt;
use crate::domain::identity::models::RegisterIdentityCommand;
use crate::identity::errors::AuthError;
use crate::identity::ports::AuthServicePort;
use crate::identity::ports::IdentityStore;
use crate::identity::ports::NotificationPort;

/// Lifetimes of the three token kinds.
#[derive(Debug, Clone, Copy)]
pub struct TokenTtls {
    pub access: Duration,
    pub refresh: Duration,
    pub password_reset: Duration,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
            password_reset: Duration::hours(1),
        }
    }
}

/// Domain service for the credential lifecycle.
///
/// Orchestrates registration, authentication, logout, refresh, and password
/// reset over the injected store and notifier. Stateless per request: the
/// only durable state is the identity record, and each operation performs at
/// most one persistence write.
pub struct AuthService<IS, NP>
where
    IS: IdentityStore,
    NP: NotificationPort,
{
    store: Arc<IS>,
    notifier: Arc<NP>,
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
    clock: Arc<dyn Clock>,
    ttls: TokenTtls,
}

impl<IS, NP> AuthService<IS, NP>
where
    IS: IdentityStore,
    NP: NotificationPort,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Identity persistence implementation
    /// * `notifier` - Password-reset delivery implementation
    /// * `token_codec` - Configured token codec (shares `clock`)
    /// * `clock` - Time source for issuance timestamps
    /// * `ttls` - Token lifetimes
    pub fn new(
        store: Arc<IS>,
        notifier: Arc<NP>,
        token_codec: TokenCodec,
        clock: Arc<dyn Clock>,
        ttls: TokenTtls,
    ) -> Self {
        Self {
            store,
            notifier,
            password_hasher: PasswordHasher::new(),
            token_codec,
            clock,
            ttls,
        }
    }

    /// Issue an access/refresh pair stamped with the identity's current
    /// generation.
    fn issue_credential_pair(&self, identity: &Identity) -> Result<CredentialPair, AuthError> {
        let now = self.clock.now();

        let access = self
            .token_codec
            .issue(
                &TokenPayload::access(identity.id, identity.token_generation),
                self.ttls.access,
            )
            .map_err(issue_failure)?;

        let refresh = self
            .token_codec
            .issue(
                &TokenPayload::refresh(identity.id, identity.token_generation),
                self.ttls.refresh,
            )
            .map_err(issue_failure)?;

        Ok(CredentialPair {
            access: IssuedToken {
                token: access,
                expires_at: now + self.ttls.access,
            },
            refresh: IssuedToken {
                token: refresh,
                expires_at: now + self.ttls.refresh,
            },
        })
    }
}

/// Issuance can only fail on misconfiguration or a serialization defect;
/// both are infrastructure, not caller mistakes.
fn issue_failure(err: TokenError) -> AuthError {
    AuthError::Configuration(err.to_string())
}

#[async_trait]
impl<IS, NP> AuthServicePort for AuthService<IS, NP>
where
    IS: IdentityStore,
    NP: NotificationPort,
{
    async fn register_identity(
        &self,
        command: RegisterIdentityCommand,
    ) -> Result<IdentityProfile, AuthError> {
        let taken = self
            .store
            .exists_by_email_or_phone(Some(command.email.clone()), command.phone.clone())
            .await?;

        if taken {
            return Err(AuthError::IdentityAlreadyExists(
                command.email.as_str().to_string(),
            ));
        }

        let secret_hash = self.password_hasher.hash(&command.secret)?;

        let identity = Identity {
            id: IdentityId::new(),
            name: command.name,
            email: command.email,
            phone: command.phone,
            secret_hash,
            status: AccountStatus::LoggedOut,
            last_authenticated_at: None,
            token_generation: 0,
            image: command.image,
            created_at: self.clock.now(),
        };

        let created = self.store.create(identity).await?;

        tracing::info!(identity_id = %created.id, "Identity registered");

        Ok(IdentityProfile::from(&created))
    }

    async fn authenticate(
        &self,
        command: AuthenticateCommand,
    ) -> Result<AuthenticatedSession, AuthError> {
        let identity = self
            .store
            .find_by_email_or_phone(
                command.key.email().cloned(),
                command.key.phone().cloned(),
            )
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if identity.secret_hash.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let matches = self
            .password_hasher
            .verify(&command.secret, &identity.secret_hash)?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        self.store.record_login(&identity.id, now).await?;

        let credentials = self.issue_credential_pair(&identity)?;

        let mut identity = identity;
        identity.status = AccountStatus::LoggedIn;
        identity.last_authenticated_at = Some(now);

        tracing::debug!(identity_id = %identity.id, "Authentication succeeded");

        Ok(AuthenticatedSession {
            identity: IdentityProfile::from(&identity),
            credentials,
        })
    }

    async fn logout(&self, id: &IdentityId) -> Result<(), AuthError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::IdentityNotFound(id.to_string()))?;

        let generation = self.store.record_logout(id).await?;

        tracing::debug!(identity_id = %id, generation, "Identity logged out");

        Ok(())
    }

    async fn verify_access_token(&self, token: &str) -> Result<IdentityProfile, AuthError> {
        let claims = self.token_codec.parse(token).map_err(|e| match e {
            TokenError::Expired => AuthError::AccessTokenExpired,
            _ => AuthError::InvalidAccessToken,
        })?;

        if claims.kind != TokenKind::Access {
            return Err(AuthError::InvalidAccessToken);
        }

        let id =
            IdentityId::from_string(&claims.sub).map_err(|_| AuthError::InvalidAccessToken)?;

        let identity = self
            .store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AuthError::IdentityNotFound(id.to_string()))?;

        // A stale generation means the token was issued before a logout.
        if claims.generation != Some(identity.token_generation) {
            return Err(AuthError::InvalidAccessToken);
        }

        Ok(IdentityProfile::from(&identity))
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<IssuedToken, AuthError> {
        let claims = self.token_codec.parse(refresh_token).map_err(|e| match e {
            TokenError::Expired => AuthError::RefreshTokenExpired,
            _ => AuthError::InvalidRefreshToken,
        })?;

        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::InvalidRefreshToken);
        }

        let id =
            IdentityId::from_string(&claims.sub).map_err(|_| AuthError::InvalidRefreshToken)?;

        let identity = self
            .store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AuthError::IdentityNotFound(id.to_string()))?;

        if claims.generation != Some(identity.token_generation) {
            return Err(AuthError::InvalidRefreshToken);
        }

        let now = self.clock.now();
        let token = self
            .token_codec
            .issue(
                &TokenPayload::access(identity.id, identity.token_generation),
                self.ttls.access,
            )
            .map_err(issue_failure)?;

        Ok(IssuedToken {
            token,
            expires_at: now + self.ttls.access,
        })
    }

    async fn request_password_reset(
        &self,
        email: &EmailAddress,
    ) -> Result<PasswordResetReceipt, AuthError> {
        let identity = match self
            .store
            .find_by_email_or_phone(Some(email.clone()), None)
            .await?
        {
            Some(identity) => identity,
            None => {
                // Success either way, so the endpoint cannot be used to
                // probe which emails are registered.
                return Ok(PasswordResetReceipt {
                    notification_sent: false,
                });
            }
        };

        let token = self
            .token_codec
            .issue(
                &TokenPayload::password_reset(identity.id),
                self.ttls.password_reset,
            )
            .map_err(issue_failure)?;

        self.notifier
            .send_password_reset(email, &token, identity.name.as_str())
            .await
            .map_err(|e| {
                tracing::error!(identity_id = %identity.id, error = %e, "Password reset delivery failed");
                AuthError::NotificationDeliveryFailed(e.to_string())
            })?;

        Ok(PasswordResetReceipt {
            notification_sent: true,
        })
    }

    async fn reset_password(&self, token: &str, new_secret: &str) -> Result<(), AuthError> {
        let claims = self.token_codec.parse(token).map_err(|e| match e {
            TokenError::Expired => AuthError::ResetTokenExpired,
            _ => AuthError::InvalidResetToken,
        })?;

        if claims.kind != TokenKind::PasswordReset {
            return Err(AuthError::InvalidResetToken);
        }

        let id = IdentityId::from_string(&claims.sub).map_err(|_| AuthError::InvalidResetToken)?;

        let identity = self
            .store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AuthError::IdentityNotFound(id.to_string()))?;
        let prior_hash = identity.secret_hash;

        self.store.set_secret(&id, new_secret).await?;

        // Re-read and confirm the write really replaced the hash.
        let updated = self
            .store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AuthError::IdentityNotFound(id.to_string()))?;

        if updated.secret_hash == prior_hash {
            return Err(AuthError::PasswordResetFailed(
                "stored hash unchanged".to_string(),
            ));
        }
        if !PasswordHasher::is_phc_hash(&updated.secret_hash) {
            return Err(AuthError::PasswordResetFailed(
                "stored value is not a hash".to_string(),
            ));
        }

        // The generation counter is left alone: outstanding sessions stay
        // valid after a reset.
        tracing::info!(identity_id = %id, "Password reset applied");

        Ok(())
    }
}
