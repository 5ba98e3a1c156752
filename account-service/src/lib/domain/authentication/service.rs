use std::sync::Arc;

use async_trait::async_trait;
use auth::Action;
use auth::Capability;
use auth::Clock;
use auth::CodeGenerator;
use auth::CredentialVerifier;
use auth::PasswordHasher;
use auth::Principal;
use auth::Resource;
use auth::Role;
use auth::TokenCodec;
use auth::TokenPair;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::AuthComponents;
use crate::domain::authentication::models::NewPassword;
use crate::domain::authentication::models::PasswordResetOutcome;
use crate::domain::authentication::models::PurgeReport;
use crate::domain::authentication::models::SignUpCommand;
use crate::domain::authentication::models::SignUpOutcome;
use crate::domain::authentication::models::SignedIn;
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::code::manager::CodeManager;
use crate::domain::code::models::Code;
use crate::domain::code::models::CodeKind;
use crate::domain::code::models::ResetCode;
use crate::domain::code::ports::CodeRepository;
use crate::domain::errors::StoreError;
use crate::domain::session::models::Session;
use crate::domain::session::ports::SessionRepository;
use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::EmailSubscriptions;
use crate::domain::user::models::Password;
use crate::domain::user::models::User;
use crate::domain::user::models::UserAttrs;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserSettings;
use crate::domain::user::models::UserStatus;
use crate::domain::user::ports::UserRepository;

const CHANGE_PASSWORD: [Capability; 1] = [Capability::new(Resource::UserPassword, Action::Update)];
const UPDATE_ATTRS: [Capability; 1] = [Capability::new(Resource::UserAttrs, Action::Update)];
const UPDATE_SETTINGS: [Capability; 1] =
    [Capability::new(Resource::UserSettings, Action::Update)];

/// Authentication orchestrator.
///
/// Owns no mutable state: every flow reads and writes through the injected
/// repositories, and the codec, hasher and code settings are fixed at
/// construction.
pub struct AuthService<UR, AR, RR, SR>
where
    UR: UserRepository,
    AR: CodeRepository<UserId>,
    RR: CodeRepository<EmailAddress>,
    SR: SessionRepository,
{
    users: Arc<UR>,
    sessions: Arc<SR>,
    activation_codes: CodeManager<UserId, AR>,
    reset_codes: CodeManager<EmailAddress, RR>,
    codec: Arc<TokenCodec>,
    verifier: CredentialVerifier,
    hasher: PasswordHasher,
    password_generator: CodeGenerator,
    default_role: Role,
    clock: Arc<dyn Clock>,
}

impl<UR, AR, RR, SR> AuthService<UR, AR, RR, SR>
where
    UR: UserRepository,
    AR: CodeRepository<UserId>,
    RR: CodeRepository<EmailAddress>,
    SR: SessionRepository,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - User persistence implementation
    /// * `activation_codes` - Activation code storage
    /// * `reset_codes` - Reset code storage
    /// * `sessions` - Refresh session tracking (or the stateless adapter)
    /// * `components` - Codec, hasher, code settings, default role and clock
    ///
    /// # Returns
    /// Configured authentication service instance
    pub fn new(
        users: Arc<UR>,
        activation_codes: Arc<AR>,
        reset_codes: Arc<RR>,
        sessions: Arc<SR>,
        components: AuthComponents,
    ) -> Self {
        let AuthComponents {
            codec,
            hasher,
            codes,
            default_role,
            clock,
        } = components;

        Self {
            users,
            sessions,
            activation_codes: CodeManager::new(
                activation_codes,
                codes.generator.clone(),
                codes.activation_window,
                CodeKind::Activation,
                clock.clone(),
            ),
            reset_codes: CodeManager::new(
                reset_codes,
                codes.generator,
                codes.reset_window,
                CodeKind::Reset,
                clock.clone(),
            ),
            verifier: CredentialVerifier::new(codec.clone(), clock.clone()),
            codec,
            hasher,
            password_generator: CodeGenerator::default(),
            default_role,
            clock,
        }
    }

    fn admit(&self, access_token: &str, required: &[Capability]) -> Result<Principal, AuthError> {
        self.verifier
            .authenticate_and_authorize(access_token, required)
            .map_err(|e| {
                tracing::warn!("Rejected access token: {}", e);
                AuthError::from(e)
            })
    }

    async fn load_user(&self, id: &UserId) -> Result<User, AuthError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(id.to_string()))
    }

    /// Issue a pair for `user` and record its refresh half.
    async fn open_session(&self, user: &User) -> Result<TokenPair, AuthError> {
        let tokens = self.codec.issue_pair(user.id.0, user.role)?;

        self.sessions
            .record(&Session::for_pair(user.id, &tokens))
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, "Failed to record session: {}", e);
                AuthError::from(e)
            })?;

        Ok(tokens)
    }
}

#[async_trait]
impl<UR, AR, RR, SR> AuthServicePort for AuthService<UR, AR, RR, SR>
where
    UR: UserRepository,
    AR: CodeRepository<UserId>,
    RR: CodeRepository<EmailAddress>,
    SR: SessionRepository,
{
    async fn sign_up(&self, command: SignUpCommand) -> Result<SignUpOutcome, AuthError> {
        if self.users.find_by_email(&command.email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self.hasher.hash(command.password.as_str())?;

        let user = User {
            id: UserId::new(),
            email: command.email,
            password_hash,
            status: UserStatus::Unconfirmed,
            role: self.default_role,
            attrs: command.attrs,
            settings: UserSettings {
                email_subscriptions: EmailSubscriptions {
                    transactional: true,
                    marketing: command.marketing_emails,
                },
            },
            created_at: self.clock.now(),
            updated_at: None,
        };

        // The unique constraint still catches a concurrent sign-up
        let email = user.email.to_string();
        let created = self.users.create(user).await.map_err(|e| match e {
            StoreError::Conflict(_) => AuthError::EmailAlreadyExists(email),
            other => AuthError::from(other),
        })?;

        let activation_code = self.activation_codes.issue(created.id).await?;

        tracing::info!(user_id = %created.id, "User signed up");

        Ok(SignUpOutcome {
            user: AuthenticatedUser::from(&created),
            activation_code,
        })
    }

    async fn activate(&self, code: &Code) -> Result<AuthenticatedUser, AuthError> {
        let redeemed = self.activation_codes.redeem(code).await.map_err(|e| {
            tracing::warn!("Activation rejected: {}", e);
            AuthError::from(e)
        })?;
        let user_id = redeemed.subject;

        let activated = match self
            .users
            .transition_status(&user_id, UserStatus::Unconfirmed, UserStatus::Active)
            .await
        {
            Ok(activated) => activated,
            Err(e) => {
                tracing::error!(user_id = %user_id, "Failed to activate user: {}", e);
                if let Err(restore) = self.activation_codes.restore(&redeemed).await {
                    tracing::error!(
                        user_id = %user_id,
                        "Failed to restore activation code: {}",
                        restore
                    );
                }
                return Err(AuthError::from(e));
            }
        };

        let user = self.load_user(&user_id).await?;
        if !activated {
            return Err(AuthError::AlreadyActive);
        }

        tracing::info!(user_id = %user_id, "User activated");

        Ok(AuthenticatedUser::from(&user))
    }

    async fn sign_in(
        &self,
        email: &EmailAddress,
        password: &Password,
    ) -> Result<SignedIn, AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            // Unknown emails pay the same hashing cost as a wrong password
            self.hasher.verify_decoy(password.as_str());
            tracing::warn!("Sign-in rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password.as_str(), &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "Sign-in rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if user.status == UserStatus::Blocked {
            tracing::warn!(user_id = %user.id, "Sign-in rejected: user is blocked");
            return Err(AuthError::UserBlocked);
        }

        let tokens = self.open_session(&user).await?;

        tracing::info!(user_id = %user.id, "User signed in");

        Ok(SignedIn {
            user: AuthenticatedUser::from(&user),
            tokens,
        })
    }

    async fn sign_out(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = self.codec.parse_refresh_token(refresh_token)?;

        // Signing out twice is not an error
        let revoked = self.sessions.consume(&claims.jti).await?;

        tracing::info!(user_id = %claims.sub, revoked, "User signed out");

        Ok(())
    }

    async fn sign_out_everywhere(&self, access_token: &str) -> Result<u64, AuthError> {
        let principal = self.admit(access_token, &[])?;
        let user_id = UserId(principal.subject());

        let revoked = self.sessions.revoke_all(&user_id).await?;

        tracing::info!(user_id = %user_id, revoked, "User signed out everywhere");

        Ok(revoked)
    }

    async fn refresh_tokens(&self, refresh_token: &str) -> Result<SignedIn, AuthError> {
        let claims = self.codec.parse_refresh_token(refresh_token).map_err(|e| {
            tracing::warn!("Refresh rejected: {}", e);
            AuthError::from(e)
        })?;

        if claims.is_expired(self.clock.now().timestamp()) {
            tracing::warn!(user_id = %claims.sub, "Refresh rejected: token expired");
            return Err(AuthError::Unauthorized("refresh token expired".to_string()));
        }

        if !self.sessions.consume(&claims.jti).await? {
            tracing::warn!(user_id = %claims.sub, "Refresh rejected: token already consumed");
            return Err(AuthError::AlreadyConsumed);
        }

        let user_id = UserId(claims.sub);
        let Some(user) = self.users.find_by_id(&user_id).await? else {
            return Err(AuthError::Unauthorized("user no longer exists".to_string()));
        };

        if user.status == UserStatus::Blocked {
            tracing::warn!(user_id = %user_id, "Refresh rejected: user is blocked");
            return Err(AuthError::Unauthorized("user is blocked".to_string()));
        }

        let tokens = self.open_session(&user).await?;

        tracing::debug!(user_id = %user_id, "Tokens refreshed");

        Ok(SignedIn {
            user: AuthenticatedUser::from(&user),
            tokens,
        })
    }

    async fn request_password_reset(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<ResetCode>, AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(None);
        };

        let reset_code = self.reset_codes.issue(user.email.clone()).await?;

        tracing::info!(user_id = %user.id, "Password reset requested");

        Ok(Some(reset_code))
    }

    async fn apply_password_reset(
        &self,
        code: &Code,
        new_password: NewPassword,
    ) -> Result<PasswordResetOutcome, AuthError> {
        let redeemed = self.reset_codes.redeem(code).await.map_err(|e| {
            tracing::warn!("Password reset rejected: {}", e);
            AuthError::from(e)
        })?;

        let Some(mut user) = self.users.find_by_email(&redeemed.subject).await? else {
            return Err(AuthError::UserNotFound(redeemed.subject.to_string()));
        };

        if user.status == UserStatus::Blocked {
            tracing::warn!(user_id = %user.id, "Password reset rejected: user is blocked");
            return Err(AuthError::UserBlocked);
        }

        let (password, generated_password) = match new_password {
            NewPassword::Supplied(password) => (password, None),
            NewPassword::Generated => {
                let password = Password::new(self.password_generator.generate())?;
                (password.clone(), Some(password))
            }
        };

        user.password_hash = self.hasher.hash(password.as_str())?;
        self.users
            .update_password_hash(&user.id, &user.password_hash)
            .await?;

        let revoked = self.sessions.revoke_all(&user.id).await?;
        let tokens = self.open_session(&user).await?;

        tracing::info!(user_id = %user.id, revoked, "Password reset applied");

        Ok(PasswordResetOutcome {
            user: AuthenticatedUser::from(&user),
            tokens,
            generated_password,
        })
    }

    async fn change_password(
        &self,
        access_token: &str,
        old_password: &Password,
        new_password: &Password,
    ) -> Result<(), AuthError> {
        let principal = self.admit(access_token, &CHANGE_PASSWORD)?;
        let user = self.load_user(&UserId(principal.subject())).await?;

        if !self.hasher.verify(old_password.as_str(), &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "Password change rejected: old password mismatch");
            return Err(AuthError::PasswordMismatch);
        }

        let password_hash = self.hasher.hash(new_password.as_str())?;
        self.users
            .update_password_hash(&user.id, &password_hash)
            .await?;

        tracing::info!(user_id = %user.id, "Password changed");

        Ok(())
    }

    async fn update_user_attrs(
        &self,
        access_token: &str,
        attrs: UserAttrs,
    ) -> Result<AuthenticatedUser, AuthError> {
        let principal = self.admit(access_token, &UPDATE_ATTRS)?;
        let user_id = UserId(principal.subject());

        self.users.update_attrs(&user_id, &attrs).await?;

        tracing::info!(user_id = %user_id, "User attributes updated");

        let user = self.load_user(&user_id).await?;
        Ok(AuthenticatedUser::from(&user))
    }

    async fn update_user_settings(
        &self,
        access_token: &str,
        settings: UserSettings,
    ) -> Result<AuthenticatedUser, AuthError> {
        let principal = self.admit(access_token, &UPDATE_SETTINGS)?;
        let user_id = UserId(principal.subject());

        self.users.update_settings(&user_id, &settings).await?;

        tracing::info!(user_id = %user_id, "User settings updated");

        let user = self.load_user(&user_id).await?;
        Ok(AuthenticatedUser::from(&user))
    }

    async fn current_user(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError> {
        let principal = self.admit(access_token, &[])?;
        let user = self.load_user(&UserId(principal.subject())).await?;

        Ok(AuthenticatedUser::from(&user))
    }

    async fn purge_expired(&self) -> Result<PurgeReport, AuthError> {
        let report = PurgeReport {
            activation_codes: self.activation_codes.purge_expired().await?,
            reset_codes: self.reset_codes.purge_expired().await?,
            sessions: self.sessions.delete_expired(self.clock.now()).await?,
        };

        tracing::info!(
            activation_codes = report.activation_codes,
            reset_codes = report.reset_codes,
            sessions = report.sessions,
            "Purged expired records"
        );

        Ok(report)
    }
}
