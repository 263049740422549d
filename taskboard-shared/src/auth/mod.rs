/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id digests for user passwords
/// - [`jwt`]: HS256 access tokens issued at login
/// - [`middleware`]: Bearer-token middleware and the `AuthContext` extractor
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let digest = hash_password("qwerty")?;
/// assert!(verify_password("qwerty", &digest)?);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
