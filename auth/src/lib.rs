//! Credential infrastructure library
//!
//! Provides the building blocks for credential lifecycle management:
//! - Password hashing (Argon2id)
//! - Typed token issuance and verification (access / refresh / password reset)
//! - Injectable clock for expiry checks
//!
//! Services define their own orchestration on top; this crate only answers
//! "does this secret match" and "is this token cryptographically valid and
//! unexpired". Business checks (token kind, generation counters) belong to
//! the caller.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use std::sync::Arc;
//!
//! use auth::clock::SystemClock;
//! use auth::{TokenCodec, TokenKind, TokenPayload};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Arc::new(SystemClock))
//!     .unwrap();
//!
//! let token = codec
//!     .issue(&TokenPayload::access("user123", 0), Duration::minutes(15))
//!     .unwrap();
//!
//! let claims = codec.parse(&token).unwrap();
//! assert_eq!(claims.kind, TokenKind::Access);
//! assert_eq!(claims.generation, Some(0));
//! ```

pub mod clock;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::TokenClaims;
pub use token::TokenCodec;
pub use token::TokenError;
pub use token::TokenKind;
pub use token::TokenPayload;
