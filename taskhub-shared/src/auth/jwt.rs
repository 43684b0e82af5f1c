/// JWT token generation and validation
///
/// Tokens carry the authenticated [`Principal`] (user id and email) and
/// nothing else. In particular the password hash never enters the claims.
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "taskhub")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `email`: Email address of the principal
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::jwt::{JwtIssuer, Principal, TokenIssuer};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = JwtIssuer::new("your-secret-key-at-least-32-bytes", chrono::Duration::hours(24));
/// let principal = Principal { id: Uuid::new_v4(), email: "ada@example.com".to_string() };
///
/// let token = issuer.sign(&principal)?;
/// assert_eq!(issuer.verify(&token)?, principal);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ISSUER: &str = "taskhub";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token validation failed
    #[error("Token validation failed: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Authenticated caller identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Email of the user
    pub email: String,

    /// Issuer - Always "taskhub"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for a principal expiring after `expires_in`
    pub fn for_principal(principal: &Principal, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: principal.id,
            email: principal.email.clone(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
        }
    }

    pub fn principal(&self) -> Principal {
        Principal {
            id: self.sub,
            email: self.email.clone(),
        }
    }
}

/// Creates a JWT token from claims
///
/// Signs the token using HS256 (HMAC-SHA256) with the provided secret.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token creation fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies:
/// - Signature is valid
/// - Token hasn't expired
/// - Issuer is "taskhub"
/// - Token is not used before nbf time
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Mints and verifies principal tokens
pub trait TokenIssuer: Send + Sync {
    fn sign(&self, principal: &Principal) -> Result<String, JwtError>;

    fn verify(&self, token: &str) -> Result<Principal, JwtError>;
}

/// HS256 token issuer with a shared secret
#[derive(Clone)]
pub struct JwtIssuer {
    secret: String,
    expires_in: Duration,
}

impl JwtIssuer {
    pub fn new(secret: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            secret: secret.into(),
            expires_in,
        }
    }
}

impl std::fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("secret", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl TokenIssuer for JwtIssuer {
    fn sign(&self, principal: &Principal) -> Result<String, JwtError> {
        create_token(&Claims::for_principal(principal, self.expires_in), &self.secret)
    }

    fn verify(&self, token: &str) -> Result<Principal, JwtError> {
        validate_token(token, &self.secret).map(|claims| claims.principal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn principal() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_claims_creation() {
        let p = principal();
        let claims = Claims::for_principal(&p, Duration::hours(24));

        assert_eq!(claims.sub, p.id);
        assert_eq!(claims.email, p.email);
        assert_eq!(claims.iss, "taskhub");
        assert!(claims.exp > Utc::now().timestamp());
        assert_eq!(claims.principal(), p);
    }

    #[test]
    fn test_claims_carry_only_identity() {
        let claims = Claims::for_principal(&principal(), Duration::hours(1));
        let json = serde_json::to_value(&claims).unwrap();

        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["email", "exp", "iat", "iss", "nbf", "sub"]);
    }

    #[test]
    fn test_sign_and_verify() {
        let issuer = JwtIssuer::new(SECRET, Duration::hours(1));
        let p = principal();

        let token = issuer.sign(&p).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), p);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtIssuer::new(SECRET, Duration::hours(1))
            .sign(&principal())
            .unwrap();
        let other = JwtIssuer::new("another-secret-key-at-least-32-bytes", Duration::hours(1));

        assert!(matches!(
            other.verify(&token),
            Err(JwtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Well past the default 60s leeway
        let issuer = JwtIssuer::new(SECRET, Duration::hours(-2));
        let token = issuer.sign(&principal()).unwrap();

        assert!(matches!(issuer.verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let issuer = JwtIssuer::new(SECRET, Duration::hours(1));
        assert!(issuer.verify("not.a.jwt").is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let issuer = JwtIssuer::new(SECRET, Duration::hours(1));
        assert!(!format!("{:?}", issuer).contains(SECRET));
    }
}
