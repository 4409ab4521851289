use std::collections::HashMap;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

use crate::config::UserSpec;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header must use Basic credentials")]
    MalformedHeader,

    #[error("Bad credentials")]
    BadCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Password verification did not complete: {0}")]
    Verification(String),
}

/// Username and password decoded from an `Authorization: Basic` header
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl BasicCredentials {
    pub fn from_header(value: &str) -> Result<Self, AuthError> {
        let (scheme, encoded) = value.trim().split_once(' ').ok_or(AuthError::MalformedHeader)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::MalformedHeader);
        }

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::MalformedHeader)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedHeader)?;

        // Only the first colon separates; passwords may contain more
        let (username, password) = decoded.split_once(':').ok_or(AuthError::MalformedHeader)?;
        if username.is_empty() {
            return Err(AuthError::MalformedHeader);
        }

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn to_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", self.username, self.password)))
    }
}

/// A known user with a bcrypt password hash and granted roles
#[derive(Clone)]
pub struct UserAccount {
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

impl std::fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAccount")
            .field("username", &self.username)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

impl UserAccount {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Source of user accounts for authentication
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, username: &str) -> Option<UserAccount>;
}

/// Fixed set of users held in memory, usually built from configuration
#[derive(Debug, Default)]
pub struct InMemoryUsers {
    users: HashMap<String, UserAccount>,
}

impl InMemoryUsers {
    /// Hash plaintext passwords with `cost`; values already in bcrypt form are kept
    pub fn from_specs(specs: &[UserSpec], cost: u32) -> Result<Self, AuthError> {
        let mut users = HashMap::with_capacity(specs.len());
        for spec in specs {
            let password_hash = if is_bcrypt_hash(&spec.password) {
                spec.password.clone()
            } else {
                hash_password(&spec.password, cost)?
            };
            users.insert(
                spec.username.clone(),
                UserAccount {
                    username: spec.username.clone(),
                    password_hash,
                    roles: spec.roles.clone(),
                },
            );
        }
        Ok(Self { users })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUsers {
    async fn find_user(&self, username: &str) -> Option<UserAccount> {
        self.users.get(username).cloned()
    }
}

pub fn is_bcrypt_hash(value: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"].iter().any(|p| value.starts_with(p))
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Look the user up and check the password. Unknown users and wrong passwords are
/// reported identically.
pub async fn authenticate(
    directory: &dyn UserDirectory,
    credentials: BasicCredentials,
) -> Result<UserAccount, AuthError> {
    let account = directory
        .find_user(&credentials.username)
        .await
        .ok_or(AuthError::BadCredentials)?;

    let hash = account.password_hash.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        bcrypt::verify(&credentials.password, &hash).unwrap_or(false)
    })
    .await;

    if verification_outcome(outcome)? {
        Ok(account)
    } else {
        Err(AuthError::BadCredentials)
    }
}

/// A bcrypt task that panicked or was cancelled is a server fault, not a wrong password
fn verification_outcome(outcome: Result<bool, tokio::task::JoinError>) -> Result<bool, AuthError> {
    outcome.map_err(|e| {
        tracing::error!("Password verification task failed: {}", e);
        AuthError::Verification(e.to_string())
    })
}
