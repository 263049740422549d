/// Password digests for user accounts
///
/// Plaintext passwords only exist inside a create or update request. They are
/// turned into an Argon2id PHC string before the user reaches storage, and
/// login compares against that digest, never against plaintext.
///
/// Parameters: 64 MB memory, 3 passes, 4 lanes, 32-byte output, random
/// 16-byte salt. They are embedded in the PHC string, so older digests keep
/// verifying if the parameters change.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let digest = hash_password("qwerty")?;
///
/// assert!(verify_password("qwerty", &digest)?);
/// assert!(!verify_password("qwertz", &digest)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, ParamsBuilder, Version,
};

const MEMORY_KIB: u32 = 65536;
const PASSES: u32 = 3;
const LANES: u32 = 4;
const OUTPUT_LEN: usize = 32;

/// Password hashing errors
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Hashing failed (bad parameters or RNG failure)
    #[error("failed to hash password: {0}")]
    Hash(String),

    /// Stored digest is not a valid PHC string
    #[error("invalid password digest: {0}")]
    InvalidDigest(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(MEMORY_KIB)
        .t_cost(PASSES)
        .p_cost(LANES)
        .output_len(OUTPUT_LEN)
        .build()
        .map_err(|e| PasswordError::Hash(format!("invalid parameters: {e}")))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a plaintext password into an Argon2id PHC string
///
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let digest = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(digest.to_string())
}

/// Checks a plaintext password against a stored digest
///
/// Returns `Ok(false)` on mismatch and an error only if the digest itself is
/// unreadable.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(digest).map_err(|e| PasswordError::InvalidDigest(e.to_string()))?;
    if parsed.hash.is_none() {
        return Err(PasswordError::InvalidDigest("digest has no hash segment".to_string()));
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::InvalidDigest(e.to_string())),
    }
}
