use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

pub mod argon2_hasher;
pub mod bcrypt_hasher;

pub use argon2_hasher::Argon2idHasher;
pub use bcrypt_hasher::BcryptHasher;

/// How credentials are written to the store.
///
/// `Plain` keeps the credential exactly as supplied and relies on response
/// redaction. Hashing is opt-in and changes what the store holds, so it is
/// selected explicitly through configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStorage {
    #[default]
    Plain,
    Bcrypt,
    Argon2id,
}

impl std::fmt::Display for PasswordStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Bcrypt => write!(f, "bcrypt"),
            Self::Argon2id => write!(f, "argon2id"),
        }
    }
}

/// A one-way credential hashing scheme
pub trait PasswordHasher: Send + Sync {
    fn hash_password(&self, password: &str) -> AppResult<String>;

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;

    /// Whether `value` looks like a hash produced by this scheme
    fn is_hash(&self, value: &str) -> bool;

    fn storage(&self) -> PasswordStorage;
}

/// Turns raw credentials into their stored form
pub struct PasswordManager {
    storage: PasswordStorage,
    hasher: Option<Box<dyn PasswordHasher>>,
}

impl Default for PasswordManager {
    fn default() -> Self {
        Self {
            storage: PasswordStorage::Plain,
            hasher: None,
        }
    }
}

impl PasswordManager {
    pub fn new(storage: PasswordStorage) -> AppResult<Self> {
        let hasher: Option<Box<dyn PasswordHasher>> = match storage {
            PasswordStorage::Plain => None,
            PasswordStorage::Bcrypt => Some(Box::new(BcryptHasher::new())),
            PasswordStorage::Argon2id => Some(Box::new(Argon2idHasher::new()?)),
        };

        Ok(Self { storage, hasher })
    }

    pub fn storage(&self) -> PasswordStorage {
        self.storage
    }

    /// Produce the value to persist for a credential that already passed
    /// validation.
    pub fn prepare_for_storage(&self, password: &str) -> AppResult<String> {
        if password.is_empty() {
            return Err(AppError::Internal(
                "refusing to store an empty credential".to_string(),
            ));
        }

        match &self.hasher {
            Some(hasher) => hasher.hash_password(password),
            None => Ok(password.to_string()),
        }
    }

    /// Compare a raw credential against its stored form.
    ///
    /// Hashed values are recognised by format, so records written before a
    /// storage change still verify.
    pub fn verify_password(&self, password: &str, stored: &str) -> AppResult<bool> {
        let hashers: [Box<dyn PasswordHasher>; 2] =
            [Box::new(BcryptHasher::new()), Box::new(Argon2idHasher::new()?)];

        for hasher in &hashers {
            if hasher.is_hash(stored) {
                return hasher.verify_password(password, stored);
            }
        }

        Ok(password == stored)
    }
}
