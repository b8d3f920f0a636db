use async_trait::async_trait;

use crate::domain::identity::models::EmailAddress;
use crate::identity::errors::NotificationError;
use crate::identity::ports::NotificationPort;

/// Notifier that records the request in the log and delivers nothing.
///
/// Development stand-in; production wiring supplies a real mail adapter
/// behind the same port.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl NotificationPort for LoggingNotifier {
    async fn send_password_reset(
        &self,
        email: &EmailAddress,
        token: &str,
        display_name: &str,
    ) -> Result<(), NotificationError> {
        tracing::info!(
            email = %email,
            display_name,
            "Password reset notification (delivery disabled)"
        );
        // The token only ever appears at debug level.
        tracing::debug!(token, "Password reset token issued");

        Ok(())
    }
}
