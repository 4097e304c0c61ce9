//! Authentication service implementation
//!
//! Registration, login, password hashing with argon2 and HS256 bearer tokens.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::database::repositories::UserRepository;
use crate::models::user::{LoginRequest, RegisterRequest, User, UserProfile};
use crate::utils::errors::{ChekwasError, Result};
use crate::utils::logging::log_auth_event;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const ACCOUNT_DEACTIVATED: &str = "Account has been deactivated";
pub const USER_NOT_FOUND_OR_INACTIVE: &str = "Access denied. User not found or inactive.";

/// Token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| ChekwasError::InvalidToken)
    }
}

/// Token plus the public view of the account
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(users: UserRepository, config: &AuthConfig) -> Self {
        Self {
            users,
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl: Duration::hours(config.token_ttl_hours),
        }
    }

    /// Hash a password into a PHC string
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ChekwasError::PasswordHash(e.to_string()))
    }

    /// Check a password against a stored PHC string
    pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored_hash).map_err(|e| ChekwasError::PasswordHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Sign a token for `user`
    pub fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ChekwasError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Decode and validate a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => ChekwasError::TokenExpired,
                _ => ChekwasError::InvalidToken,
            })
    }

    /// Resolve a bearer token to an active account
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.verify_token(token)?;
        let user_id = claims.user_id()?;

        match self.users.find_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => {
                debug!(user_id = %user_id, "Token for missing or inactive user");
                Err(ChekwasError::Authentication(USER_NOT_FOUND_OR_INACTIVE.to_string()))
            }
        }
    }

    /// Create an account and sign a token for it
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
        let new_user = request.validate()?;

        if self.users.find_by_email(&new_user.email).await?.is_some() {
            log_auth_event(&new_user.email, "register", false, Some("email already registered"));
            return Err(ChekwasError::Duplicate("User already exists with this email".to_string()));
        }

        let password_hash = Self::hash_password(&new_user.password)?;
        let user = self.users.create(&new_user, &password_hash).await?;
        let token = self.issue_token(&user)?;

        log_auth_event(&user.email, "register", true, None);
        Ok(AuthResponse {
            token,
            user: user.profile(),
        })
    }

    /// Check credentials and sign a token
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        let (email, password) = request.validate()?;

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                log_auth_event(&email, "login", false, Some("unknown email"));
                return Err(ChekwasError::Authentication(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !user.is_active {
            log_auth_event(&email, "login", false, Some("account deactivated"));
            return Err(ChekwasError::Authentication(ACCOUNT_DEACTIVATED.to_string()));
        }

        if !Self::verify_password(&password, &user.password_hash)? {
            log_auth_event(&email, "login", false, Some("wrong password"));
            return Err(ChekwasError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.issue_token(&user)?;
        log_auth_event(&email, "login", true, None);
        Ok(AuthResponse {
            token,
            user: user.profile(),
        })
    }
}
