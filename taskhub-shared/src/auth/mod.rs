/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing behind [`password::CredentialHasher`]
/// - [`jwt`]: principal tokens behind [`jwt::TokenIssuer`]
/// - [`middleware`]: bearer header parsing into an [`middleware::AuthContext`]
/// - [`authorization`]: the project membership guard
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::jwt::{JwtIssuer, Principal, TokenIssuer};
/// use taskhub_shared::auth::password::{Argon2Hasher, CredentialHasher};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hasher = Argon2Hasher::new()?;
/// let hash = hasher.hash("user_password")?;
/// assert!(hasher.verify("user_password", &hash)?);
///
/// // Token issuance
/// let issuer = JwtIssuer::new("secret-key-at-least-32-bytes-long", chrono::Duration::hours(24));
/// let token = issuer.sign(&Principal { id: Uuid::new_v4(), email: "ada@example.com".into() })?;
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod jwt;
pub mod middleware;
pub mod authorization;
