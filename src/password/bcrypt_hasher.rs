use super::{PasswordHasher, PasswordStorage};
use crate::error::{AppError, AppResult};
use bcrypt::{hash, verify, DEFAULT_COST};

pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new() -> Self {
        Self { cost: DEFAULT_COST }
    }

    /// Cost must be within 4..=31.
    pub fn with_cost(cost: u32) -> AppResult<Self> {
        if !(4..=31).contains(&cost) {
            return Err(AppError::Configuration(
                "bcrypt cost must be between 4 and 31".to_string(),
            ));
        }

        Ok(Self { cost })
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Failed to hash password with bcrypt: {}", e)))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        verify(password, hash)
            .map_err(|e| AppError::Internal(format!("Failed to verify bcrypt password: {}", e)))
    }

    fn is_hash(&self, value: &str) -> bool {
        // $2a$, $2b$, $2x$, $2y$: always 60 chars with three separators
        value.starts_with("$2") && value.len() == 60 && value.matches('$').count() == 3
    }

    fn storage(&self) -> PasswordStorage {
        PasswordStorage::Bcrypt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcrypt_hash_and_verify() {
        let hasher = BcryptHasher::with_cost(4).unwrap();

        let hash = hasher.hash_password("longenough1").unwrap();

        assert_eq!(hash.len(), 60);
        assert!(hasher.is_hash(&hash));
        assert!(hasher.verify_password("longenough1", &hash).unwrap());
        assert!(!hasher.verify_password("longenough2", &hash).unwrap());
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        assert!(BcryptHasher::with_cost(3).is_err());
        assert!(BcryptHasher::with_cost(32).is_err());
        assert!(BcryptHasher::with_cost(12).is_ok());
    }

    #[test]
    fn test_bcrypt_is_hash() {
        let hasher = BcryptHasher::new();

        assert!(hasher.is_hash("$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW"));
        assert!(!hasher.is_hash("longenough1"));
        assert!(!hasher.is_hash("$argon2id$example"));
        assert!(!hasher.is_hash("$2b$12$tooshort"));
    }
}
