use async_trait::async_trait;
use auth::PasswordHasher;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::identity::models::AccountStatus;
use crate::domain::identity::models::DisplayName;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::PhoneNumber;
use crate::identity::errors::AuthError;
use crate::identity::ports::IdentityStore;

const IDENTITY_COLUMNS: &str = "id, name, email, phone, secret_hash, status, \
     last_authenticated_at, token_generation, image, created_at";

pub struct PostgresIdentityStore {
    pool: PgPool,
    password_hasher: PasswordHasher,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            password_hasher: PasswordHasher::new(),
        }
    }
}

fn db_error(e: sqlx::Error) -> AuthError {
    AuthError::StoreError(e.to_string())
}

fn row_to_identity(row: &PgRow) -> Result<Identity, AuthError> {
    let status: String = row.try_get("status").map_err(db_error)?;
    let status = AccountStatus::parse(&status)
        .ok_or_else(|| AuthError::StoreError(format!("Unknown account status: {}", status)))?;

    let phone: Option<String> = row.try_get("phone").map_err(db_error)?;
    let phone = phone.map(PhoneNumber::new).transpose()?;

    let generation: i64 = row.try_get("token_generation").map_err(db_error)?;
    let token_generation = u64::try_from(generation)
        .map_err(|_| AuthError::StoreError(format!("Negative token generation: {}", generation)))?;

    Ok(Identity {
        id: IdentityId(row.try_get::<Uuid, _>("id").map_err(db_error)?),
        name: DisplayName::new(row.try_get("name").map_err(db_error)?)?,
        email: EmailAddress::new(row.try_get("email").map_err(db_error)?)?,
        phone,
        secret_hash: row.try_get("secret_hash").map_err(db_error)?,
        status,
        last_authenticated_at: row.try_get("last_authenticated_at").map_err(db_error)?,
        token_generation,
        image: row.try_get("image").map_err(db_error)?,
        created_at: row.try_get("created_at").map_err(db_error)?,
    })
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn create(&self, identity: Identity) -> Result<Identity, AuthError> {
        sqlx::query(
            r#"
            INSERT INTO identities (id, name, email, phone, secret_hash, status,
                last_authenticated_at, token_generation, image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(identity.id.0)
        .bind(identity.name.as_str())
        .bind(identity.email.as_str())
        .bind(identity.phone.as_ref().map(|p| p.as_str()))
        .bind(&identity.secret_hash)
        .bind(identity.status.as_str())
        .bind(identity.last_authenticated_at)
        .bind(identity.token_generation as i64)
        .bind(identity.image.as_deref())
        .bind(identity.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    if db_err.constraint() == Some("identities_email_key") {
                        return AuthError::IdentityAlreadyExists(
                            identity.email.as_str().to_string(),
                        );
                    }
                    if db_err.constraint() == Some("identities_phone_key") {
                        return AuthError::IdentityAlreadyExists(
                            identity
                                .phone
                                .as_ref()
                                .map(|p| p.as_str().to_string())
                                .unwrap_or_default(),
                        );
                    }
                }
            }
            AuthError::StoreError(e.to_string())
        })?;

        Ok(identity)
    }

    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, AuthError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM identities WHERE id = $1",
            IDENTITY_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(row_to_identity).transpose()
    }

    async fn find_by_email_or_phone(
        &self,
        email: Option<EmailAddress>,
        phone: Option<PhoneNumber>,
    ) -> Result<Option<Identity>, AuthError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM identities \
             WHERE ($1::text IS NOT NULL AND email = $1) \
                OR ($2::text IS NOT NULL AND phone = $2)",
            IDENTITY_COLUMNS
        ))
        .bind(email.as_ref().map(|e| e.as_str()))
        .bind(phone.as_ref().map(|p| p.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(row_to_identity).transpose()
    }

    async fn exists_by_email_or_phone(
        &self,
        email: Option<EmailAddress>,
        phone: Option<PhoneNumber>,
    ) -> Result<bool, AuthError> {
        let row = sqlx::query(
            "SELECT EXISTS ( \
                 SELECT 1 FROM identities \
                 WHERE ($1::text IS NOT NULL AND email = $1) \
                    OR ($2::text IS NOT NULL AND phone = $2) \
             )",
        )
        .bind(email.as_ref().map(|e| e.as_str()))
        .bind(phone.as_ref().map(|p| p.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row.try_get(0).map_err(db_error)
    }

    async fn record_login(&self, id: &IdentityId, at: DateTime<Utc>) -> Result<(), AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE identities
            SET status = $2, last_authenticated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(AccountStatus::LoggedIn.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::IdentityNotFound(id.to_string()));
        }

        Ok(())
    }

    async fn record_logout(&self, id: &IdentityId) -> Result<u64, AuthError> {
        // Single statement, so concurrent logouts each get their own
        // increment.
        let row = sqlx::query(
            r#"
            UPDATE identities
            SET status = $2, token_generation = token_generation + 1
            WHERE id = $1
            RETURNING token_generation
            "#,
        )
        .bind(id.0)
        .bind(AccountStatus::LoggedOut.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        let row = row.ok_or_else(|| AuthError::IdentityNotFound(id.to_string()))?;
        let generation: i64 = row.try_get("token_generation").map_err(db_error)?;

        u64::try_from(generation).map_err(|_| {
            AuthError::StoreError(format!("Negative token generation: {}", generation))
        })
    }

    async fn set_secret(&self, id: &IdentityId, new_secret: &str) -> Result<(), AuthError> {
        let secret_hash = self.password_hasher.hash(new_secret)?;

        let result = sqlx::query(
            r#"
            UPDATE identities
            SET secret_hash = $2
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(secret_hash)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::IdentityNotFound(id.to_string()));
        }

        Ok(())
    }
}
