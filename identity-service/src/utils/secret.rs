use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// A stored credential secret, as read back from either tier.
///
/// The population is mid-migration: rows written by this service carry an
/// argon2 PHC string, older rows still hold the cleartext password. The
/// PHC marker decides which comparison applies, so both can coexist
/// without a schema gate. The legacy branch is the removable one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredSecret {
    Hashed(String),
    Legacy(String),
}

const PHC_MARKER: &str = "$argon2";

impl StoredSecret {
    /// Classify a stored value. Anything without the PHC marker is
    /// treated as legacy cleartext, including malformed hash fragments.
    pub fn parse(stored: &str) -> Self {
        if stored.starts_with(PHC_MARKER) {
            StoredSecret::Hashed(stored.to_string())
        } else {
            StoredSecret::Legacy(stored.to_string())
        }
    }

    /// Compare a candidate password against the stored value.
    ///
    /// Never errors: a malformed or empty stored value simply fails.
    pub fn verify(&self, candidate: &str) -> bool {
        match self {
            StoredSecret::Hashed(encoded) => match PasswordHash::new(encoded) {
                Ok(parsed) => Argon2::default()
                    .verify_password(candidate.as_bytes(), &parsed)
                    .is_ok(),
                Err(_) => false,
            },
            StoredSecret::Legacy(plain) => !plain.is_empty() && plain == candidate,
        }
    }
}

/// Hash a password with argon2id and the crate's default parameters.
///
/// Salt generation is the only failure source; it is not recoverable.
pub fn hash_secret(secret: &str) -> Result<String, anyhow::Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    let encoded = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash secret: {}", e))?
        .to_string();

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_produces_phc_string() {
        let hash = hash_secret("correct horse").expect("hashing failed");
        assert!(hash.starts_with("$argon2"));
        assert!(matches!(StoredSecret::parse(&hash), StoredSecret::Hashed(_)));
    }

    #[test]
    fn hashed_roundtrip_verifies() {
        let hash = hash_secret("correct horse").expect("hashing failed");
        let stored = StoredSecret::parse(&hash);
        assert!(stored.verify("correct horse"));
        assert!(!stored.verify("wrong horse"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_secret("pw").unwrap();
        let b = hash_secret("pw").unwrap();
        assert_ne!(a, b);
        assert!(StoredSecret::parse(&a).verify("pw"));
        assert!(StoredSecret::parse(&b).verify("pw"));
    }

    #[test]
    fn legacy_is_exact_equality() {
        let stored = StoredSecret::parse("summer2019");
        assert!(stored.verify("summer2019"));
        assert!(!stored.verify("Summer2019"));
        assert!(!stored.verify("summer2019 "));
    }

    #[test]
    fn empty_stored_value_never_verifies() {
        let stored = StoredSecret::parse("");
        assert!(!stored.verify(""));
        assert!(!stored.verify("anything"));
    }

    #[test]
    fn malformed_hash_fails_instead_of_erroring() {
        // Carries the marker but is not a parseable PHC string.
        let stored = StoredSecret::parse("$argon2id$garbage");
        assert!(!stored.verify("anything"));
    }
}
