use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::Rng;

use bullion_shared::errors::{AppError, AppResult};

/// Checks a presented general-user credential against the stored one.
///
/// `seal` turns a freshly generated credential into its stored form.
pub trait CredentialVerifier: Send + Sync {
    fn seal(&self, credential: &str) -> AppResult<String>;
    fn verify(&self, presented: &str, stored: &str) -> AppResult<bool>;
}

/// Stores the credential as is and compares it exactly.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainCredentialVerifier;

impl CredentialVerifier for PlainCredentialVerifier {
    fn seal(&self, credential: &str) -> AppResult<String> {
        Ok(credential.to_string())
    }

    fn verify(&self, presented: &str, stored: &str) -> AppResult<bool> {
        Ok(presented == stored)
    }
}

/// Stores an Argon2 PHC string and verifies against it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2CredentialVerifier;

impl CredentialVerifier for Argon2CredentialVerifier {
    fn seal(&self, credential: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(credential.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::internal(format!("credential hashing failed: {e}")))
    }

    fn verify(&self, presented: &str, stored: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(stored)
            .map_err(|e| AppError::internal(format!("invalid credential hash: {e}")))?;
        Ok(Argon2::default()
            .verify_password(presented.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

/// Opaque random credential handed to a general user at registration.
pub fn generate_random_pass() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 12] = rng.gen();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_pass_format() {
        let a = generate_random_pass();
        let b = generate_random_pass();
        assert_eq!(a.len(), 24);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn plain_verifier_is_exact_match() {
        let v = PlainCredentialVerifier;
        let stored = v.seal("abc123XYZ").unwrap();
        assert!(v.verify("abc123XYZ", &stored).unwrap());
        assert!(!v.verify("abc123xyz", &stored).unwrap());
    }

    #[test]
    fn argon2_verifier_roundtrip() {
        let v = Argon2CredentialVerifier;
        let stored = v.seal("abc123XYZ").unwrap();
        assert_ne!(stored, "abc123XYZ");
        assert!(v.verify("abc123XYZ", &stored).unwrap());
        assert!(!v.verify("wrong", &stored).unwrap());
        assert!(v.verify("abc123XYZ", "not-a-phc-string").is_err());
    }
}
