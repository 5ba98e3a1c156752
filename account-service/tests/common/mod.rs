use std::sync::Arc;

use account_service::authentication::models::AuthComponents;
use account_service::authentication::models::SignUpCommand;
use account_service::authentication::models::SignUpOutcome;
use account_service::authentication::ports::AuthServicePort;
use account_service::authentication::service::AuthService;
use account_service::code::models::CodeSettings;
use account_service::repositories::memory::InMemoryCodeRepository;
use account_service::repositories::memory::InMemorySessionRepository;
use account_service::repositories::memory::InMemoryUserRepository;
use account_service::repositories::session::StatelessSessionRepository;
use account_service::session::ports::SessionRepository;
use account_service::user::models::EmailAddress;
use account_service::user::models::Password;
use account_service::user::models::UserAttrs;
use account_service::user::models::UserId;
use auth::CapabilityRegistry;
use auth::CredentialVerifier;
use auth::HashCost;
use auth::ManualClock;
use auth::PasswordHasher;
use auth::Role;
use auth::TokenCodec;
use auth::TokenSettings;
use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;

pub const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Argon2 cost small enough to keep the suite fast
pub const CHEAP_COST: HashCost = HashCost {
    memory_kib: 64,
    iterations: 1,
    parallelism: 1,
};

pub type TestService<SR> = AuthService<
    InMemoryUserRepository,
    InMemoryCodeRepository<UserId>,
    InMemoryCodeRepository<EmailAddress>,
    SR,
>;

/// Authentication service wired to in-memory stores and a manual clock
pub struct TestApp<SR: SessionRepository = InMemorySessionRepository> {
    pub service: TestService<SR>,
    pub clock: Arc<ManualClock>,
    pub users: Arc<InMemoryUserRepository>,
    pub activation_codes: Arc<InMemoryCodeRepository<UserId>>,
    pub reset_codes: Arc<InMemoryCodeRepository<EmailAddress>>,
    pub sessions: Arc<SR>,
    pub codec: Arc<TokenCodec>,
    pub verifier: CredentialVerifier,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::spawn_with_role(Role::User)
    }

    /// Spawn with `default_role` handed to new sign-ups
    pub fn spawn_with_role(default_role: Role) -> Self {
        TestApp::build(
            Arc::new(InMemorySessionRepository::new()),
            default_role,
            CHEAP_COST,
        )
    }

    /// Spawn with a real hashing cost
    pub fn spawn_with_cost(cost: HashCost) -> Self {
        TestApp::build(Arc::new(InMemorySessionRepository::new()), Role::User, cost)
    }
}

impl TestApp<StatelessSessionRepository> {
    /// Spawn without server-side refresh session tracking
    pub fn spawn_stateless() -> Self {
        TestApp::build(Arc::new(StatelessSessionRepository), Role::User, CHEAP_COST)
    }
}

impl<SR: SessionRepository> TestApp<SR> {
    fn build(sessions: Arc<SR>, default_role: Role, cost: HashCost) -> Self {
        let clock = Arc::new(ManualClock::new(start()));

        let settings = TokenSettings::new(Duration::minutes(15), Duration::hours(72))
            .expect("Failed to build token settings");
        let codec = Arc::new(TokenCodec::new(
            SECRET,
            Arc::new(CapabilityRegistry::new()),
            settings,
            clock.clone(),
        ));

        let users = Arc::new(InMemoryUserRepository::new());
        let activation_codes = Arc::new(InMemoryCodeRepository::new());
        let reset_codes = Arc::new(InMemoryCodeRepository::new());

        let service = AuthService::new(
            users.clone(),
            activation_codes.clone(),
            reset_codes.clone(),
            sessions.clone(),
            AuthComponents {
                codec: codec.clone(),
                hasher: PasswordHasher::with_cost(cost).expect("Failed to build hasher"),
                codes: CodeSettings::default(),
                default_role,
                clock: clock.clone(),
            },
        );

        Self {
            service,
            verifier: CredentialVerifier::new(codec.clone(), clock.clone()),
            clock,
            users,
            activation_codes,
            reset_codes,
            sessions,
            codec,
        }
    }

    /// Sign up `email` with `password`
    pub async fn sign_up(&self, email: &str, password: &str) -> SignUpOutcome {
        self.service
            .sign_up(SignUpCommand {
                email: email_address(email),
                password: self::password(password),
                attrs: UserAttrs {
                    first_name: "Test".to_string(),
                    ..UserAttrs::default()
                },
                marketing_emails: false,
            })
            .await
            .expect("Failed to sign up")
    }

    /// Sign up and activate
    pub async fn active_user(&self, email: &str, password: &str) -> UserId {
        let outcome = self.sign_up(email, password).await;
        self.service
            .activate(&outcome.activation_code.code)
            .await
            .expect("Failed to activate");
        outcome.user.id
    }
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::with_cost(CHEAP_COST).expect("Failed to build hasher")
}

pub fn email_address(email: &str) -> EmailAddress {
    EmailAddress::new(email.to_string()).expect("Invalid test email")
}

pub fn password(password: &str) -> Password {
    Password::new(password.to_string()).expect("Invalid test password")
}
