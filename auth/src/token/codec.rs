use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::TokenClaims;
use super::claims::TokenPayload;
use super::errors::TokenError;
use crate::clock::Clock;

/// Tamper-evident codec for typed tokens.
///
/// Signs with HS256 (HMAC with SHA-256) using a server-held secret. The
/// codec decides cryptographic and temporal validity only: signature and
/// expiry. Kind and generation checks are business validation and stay with
/// the caller.
///
/// Expiry is compared against the injected [`Clock`] rather than the
/// library's wall-clock validation, so time is controllable in tests.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a codec over a signing secret.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be at least 256
    ///   bits for HS256; store in environment or a vault, never in code)
    /// * `clock` - Time source for issuance and expiry checks
    ///
    /// # Errors
    /// * `MissingSecret` - The secret is empty. Fatal: callers should treat
    ///   this as a startup failure, not a per-request condition.
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            clock,
        })
    }

    /// Sign a payload into a token valid for `ttl` from now.
    ///
    /// Stamps `iat = now` and `exp = now + ttl`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, payload: &TokenPayload, ttl: Duration) -> Result<String, TokenError> {
        let now = self.clock.now();

        let claims = TokenClaims {
            sub: payload.subject.clone(),
            kind: payload.kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            generation: payload.generation,
        };

        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    /// * `Malformed` - Not structurally a token, or claims do not decode
    /// * `InvalidSignature` - Signature does not verify
    /// * `Expired` - `now >= exp` per the injected clock
    pub fn parse(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against the injected clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    _ => TokenError::Malformed(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
