use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::FixedClock;
use auth::TokenCodec;
use chrono::TimeZone;
use chrono::Utc;
use identity_service::domain::identity::models::AuthenticateCommand;
use identity_service::domain::identity::models::DisplayName;
use identity_service::domain::identity::models::EmailAddress;
use identity_service::domain::identity::models::LoginKey;
use identity_service::domain::identity::models::PhoneNumber;
use identity_service::domain::identity::models::RegisterIdentityCommand;
use identity_service::domain::identity::ports::NotificationPort;
use identity_service::domain::identity::service::AuthService;
use identity_service::domain::identity::service::TokenTtls;
use identity_service::identity::errors::NotificationError;
use identity_service::repositories::InMemoryIdentityStore;

pub const TOKEN_SECRET: &[u8] = b"test-secret-key-for-token-signing-32-bytes";

/// Captured password-reset delivery.
#[derive(Debug, Clone)]
pub struct SentReset {
    pub email: String,
    pub token: String,
    pub display_name: String,
}

/// Notifier double that records deliveries and can be switched to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentReset>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentReset> {
        self.sent.lock().expect("notifier lock poisoned").clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationPort for RecordingNotifier {
    async fn send_password_reset(
        &self,
        email: &EmailAddress,
        token: &str,
        display_name: &str,
    ) -> Result<(), NotificationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError::DeliveryFailed(
                "smtp unreachable".to_string(),
            ));
        }

        self.sent
            .lock()
            .expect("notifier lock poisoned")
            .push(SentReset {
                email: email.as_str().to_string(),
                token: token.to_string(),
                display_name: display_name.to_string(),
            });

        Ok(())
    }
}

/// Test application wiring the service to an in-memory store, a recording
/// notifier, and a controllable clock.
pub struct TestApp {
    pub service: AuthService<InMemoryIdentityStore, RecordingNotifier>,
    pub store: Arc<InMemoryIdentityStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<FixedClock>,
}

impl TestApp {
    pub fn spawn() -> Self {
        init_tracing();

        let clock = Arc::new(FixedClock::at(
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        ));
        let store = Arc::new(InMemoryIdentityStore::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let codec =
            TokenCodec::new(TOKEN_SECRET, clock.clone()).expect("Failed to build token codec");

        let service = AuthService::new(
            Arc::clone(&store),
            Arc::clone(&notifier),
            codec,
            clock.clone(),
            TokenTtls::default(),
        );

        Self {
            service,
            store,
            notifier,
            clock,
        }
    }

    /// Codec sharing the app's secret and clock, for inspecting issued
    /// tokens.
    pub fn codec(&self) -> TokenCodec {
        TokenCodec::new(TOKEN_SECRET, self.clock.clone()).expect("Failed to build token codec")
    }
}

pub fn register_command(name: &str, email: &str, secret: &str) -> RegisterIdentityCommand {
    RegisterIdentityCommand::new(
        DisplayName::new(name.to_string()).unwrap(),
        EmailAddress::new(email.to_string()).unwrap(),
        None,
        secret.to_string(),
        None,
    )
}

pub fn register_command_with_phone(
    name: &str,
    email: &str,
    phone: &str,
    secret: &str,
) -> RegisterIdentityCommand {
    RegisterIdentityCommand::new(
        DisplayName::new(name.to_string()).unwrap(),
        EmailAddress::new(email.to_string()).unwrap(),
        Some(PhoneNumber::new(phone.to_string()).unwrap()),
        secret.to_string(),
        None,
    )
}

pub fn login_with_email(email: &str, secret: &str) -> AuthenticateCommand {
    AuthenticateCommand::new(
        LoginKey::Email(EmailAddress::new(email.to_string()).unwrap()),
        secret.to_string(),
    )
}

pub fn email(address: &str) -> EmailAddress {
    EmailAddress::new(address.to_string()).unwrap()
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "identity_service=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
