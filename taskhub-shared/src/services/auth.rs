/// Sign-up and log-in
///
/// # Sign-up checks
///
/// Run in this order; the first failure is reported:
///
/// 1. email syntax ("invalid Email")
/// 2. email uniqueness ("this email already exists")
/// 3. email length >= 8 ("email length should be greater than 8")
/// 4. password length >= 8 ("password length should be greater than 8")
///
/// The user and its credential are then written in one store transaction.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskhub_shared::auth::jwt::JwtIssuer;
/// use taskhub_shared::auth::password::Argon2Hasher;
/// use taskhub_shared::services::auth::{AuthService, LogIn, SignUp};
/// use taskhub_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let auth = AuthService::new(
///     Arc::new(MemoryStore::new()),
///     Arc::new(Argon2Hasher::new()?),
///     Arc::new(JwtIssuer::new("secret-key-at-least-32-bytes-long", chrono::Duration::hours(24))),
/// );
///
/// let user = auth.sign_up(SignUp {
///     email: "ada@example.com".into(),
///     password: "correct horse".into(),
///     name: None,
/// }).await?;
///
/// let token = auth.log_in(LogIn {
///     email: user.email,
///     password: "correct horse".into(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::ValidateEmail;

use super::{ServiceError, ServiceResult};
use crate::auth::jwt::{Principal, TokenIssuer};
use crate::auth::password::CredentialHasher;
use crate::models::user::{CreateUser, User};
use crate::store::{Store, StoreError};

const MIN_EMAIL_LENGTH: usize = 8;
const MIN_PASSWORD_LENGTH: usize = 8;

/// Sign-up request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Log-in request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogIn {
    pub email: String,
    pub password: String,
}

/// Log-in response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn Store>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Registers a new user
    ///
    /// # Errors
    ///
    /// - `Validation` for the checks listed in the module docs
    /// - `Conflict` if a concurrent sign-up took the email first
    pub async fn sign_up(&self, input: SignUp) -> ServiceResult<User> {
        if !input.email.validate_email() {
            return Err(ServiceError::validation("email", "invalid Email"));
        }

        if self.store.find_user_by_email(&input.email).await?.is_some() {
            return Err(ServiceError::validation("email", "this email already exists"));
        }

        if input.email.chars().count() < MIN_EMAIL_LENGTH {
            return Err(ServiceError::validation(
                "email",
                "email length should be greater than 8",
            ));
        }

        if input.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ServiceError::validation(
                "password",
                "password length should be greater than 8",
            ));
        }

        let password_hash = self.hasher.hash(&input.password)?;

        let user = self
            .store
            .create_user_with_credential(
                CreateUser {
                    email: input.email,
                    name: input.name,
                },
                password_hash,
            )
            .await
            .map_err(|e| match e {
                StoreError::Conflict(ref constraint) if constraint == "users_email_key" => {
                    ServiceError::Conflict("this email already exists".to_string())
                }
                other => other.into(),
            })?;

        info!(user_id = %user.id, "User signed up");

        Ok(user)
    }

    /// Authenticates a user and issues a token for `{id, email}`
    ///
    /// # Errors
    ///
    /// - `NotFound("customer not found")` for an unknown email
    /// - `Unauthorized("password is not valid")` on a password mismatch
    pub async fn log_in(&self, input: LogIn) -> ServiceResult<AuthToken> {
        let user = self
            .store
            .find_user_by_email(&input.email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("customer not found".to_string()))?;

        let credential = match self.store.find_credential_by_user_id(user.id).await? {
            Some(credential) => credential,
            None => {
                warn!(user_id = %user.id, "User has no credential");
                return Err(ServiceError::Unauthorized("password is not valid".to_string()));
            }
        };

        if !self.hasher.verify(&input.password, &credential.password_hash)? {
            return Err(ServiceError::Unauthorized("password is not valid".to_string()));
        }

        let token = self.tokens.sign(&Principal {
            id: user.id,
            email: user.email,
        })?;

        info!(user_id = %user.id, "User logged in");

        Ok(AuthToken { token })
    }
}
