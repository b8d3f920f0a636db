use std::collections::HashMap;

use async_trait::async_trait;
use auth::PasswordHasher;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::identity::models::AccountStatus;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::PhoneNumber;
use crate::identity::errors::AuthError;
use crate::identity::ports::IdentityStore;

/// In-memory identity store.
///
/// Mirrors the Postgres adapter's semantics for tests and embedded use. The
/// generation increment happens under the write lock, so concurrent logouts
/// on the same identity never under-count.
pub struct InMemoryIdentityStore {
    identities: RwLock<HashMap<Uuid, Identity>>,
    password_hasher: PasswordHasher,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self {
            identities: RwLock::new(HashMap::new()),
            password_hasher: PasswordHasher::new(),
        }
    }
}

impl Default for InMemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_key(
    identity: &Identity,
    email: Option<&EmailAddress>,
    phone: Option<&PhoneNumber>,
) -> bool {
    let email_match = email.map_or(false, |e| identity.email == *e);
    let phone_match = match (phone, &identity.phone) {
        (Some(p), Some(q)) => p == q,
        _ => false,
    };
    email_match || phone_match
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn create(&self, identity: Identity) -> Result<Identity, AuthError> {
        let mut identities = self.identities.write().await;

        let conflict = identities
            .values()
            .any(|existing| matches_key(existing, Some(&identity.email), identity.phone.as_ref()));
        if conflict {
            return Err(AuthError::IdentityAlreadyExists(
                identity.email.as_str().to_string(),
            ));
        }

        identities.insert(identity.id.0, identity.clone());
        Ok(identity)
    }

    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, AuthError> {
        let identities = self.identities.read().await;
        Ok(identities.get(&id.0).cloned())
    }

    async fn find_by_email_or_phone(
        &self,
        email: Option<EmailAddress>,
        phone: Option<PhoneNumber>,
    ) -> Result<Option<Identity>, AuthError> {
        let identities = self.identities.read().await;
        Ok(identities
            .values()
            .find(|identity| matches_key(identity, email.as_ref(), phone.as_ref()))
            .cloned())
    }

    async fn exists_by_email_or_phone(
        &self,
        email: Option<EmailAddress>,
        phone: Option<PhoneNumber>,
    ) -> Result<bool, AuthError> {
        let identities = self.identities.read().await;
        Ok(identities
            .values()
            .any(|identity| matches_key(identity, email.as_ref(), phone.as_ref())))
    }

    async fn record_login(&self, id: &IdentityId, at: DateTime<Utc>) -> Result<(), AuthError> {
        let mut identities = self.identities.write().await;
        let identity = identities
            .get_mut(&id.0)
            .ok_or_else(|| AuthError::IdentityNotFound(id.to_string()))?;

        identity.status = AccountStatus::LoggedIn;
        identity.last_authenticated_at = Some(at);
        Ok(())
    }

    async fn record_logout(&self, id: &IdentityId) -> Result<u64, AuthError> {
        let mut identities = self.identities.write().await;
        let identity = identities
            .get_mut(&id.0)
            .ok_or_else(|| AuthError::IdentityNotFound(id.to_string()))?;

        identity.status = AccountStatus::LoggedOut;
        identity.token_generation += 1;
        Ok(identity.token_generation)
    }

    async fn set_secret(&self, id: &IdentityId, new_secret: &str) -> Result<(), AuthError> {
        let secret_hash = self.password_hasher.hash(new_secret)?;

        let mut identities = self.identities.write().await;
        let identity = identities
            .get_mut(&id.0)
            .ok_or_else(|| AuthError::IdentityNotFound(id.to_string()))?;

        identity.secret_hash = secret_hash;
        Ok(())
    }
}
