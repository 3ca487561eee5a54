use anyhow::{Result, anyhow};
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand_core::OsRng;

/// Checks a candidate password against a small fixed allow-list.
///
/// The plaintext secrets are hashed once at construction; every verification
/// goes through the hash comparison, never raw string equality, so a wrong
/// candidate costs the same time as a near-miss.
#[derive(Clone)]
pub struct CredentialVerifier {
    hashes: Vec<String>,
}

impl CredentialVerifier {
    pub fn new(allow_list: &[String]) -> Result<Self> {
        let mut hashes = Vec::with_capacity(allow_list.len());
        for secret in allow_list {
            let hash = hash_password(secret)
                .map_err(|err| anyhow!("failed to hash allow-list entry: {err}"))?;
            hashes.push(hash);
        }
        Ok(Self { hashes })
    }

    /// True iff the candidate matches one of the configured secrets.
    /// Short-circuits on the first match; enumeration order is not
    /// timing-sensitive, only the per-secret comparison is.
    pub fn verify(&self, candidate: &str) -> bool {
        self.hashes
            .iter()
            .any(|hash| verify_password(candidate, hash))
    }
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}
