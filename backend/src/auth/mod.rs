//! Staff authentication: password hashing, sessions and flash messages.

pub mod messages;
pub mod password;
pub mod session;

pub use messages::{FlashMessage, MessageLevel};
pub use password::{
    hash_password, hash_password_async, validate_password, verify_password, verify_password_async,
    UserAttributes,
};
pub use session::{Session, SessionStore, DEFAULT_SESSION_TTL_SECS, MAX_SESSION_TTL_SECS};

use once_cell::sync::Lazy;

use crate::db::repository::{MuseumRepository, RepositoryResult};
use crate::models::MuseumStaff;

/// Hash checked against when the username is unknown, so that a miss costs
/// as much as a wrong password.
static DUMMY_PASSWORD_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("artscope-unknown-staff").ok());

/// Check a username and password.
///
/// Returns the staff member when the password matches and the account is
/// active. Unknown users, wrong passwords and inactive accounts all yield
/// `Ok(None)`.
pub async fn authenticate<R>(
    repo: &R,
    username: &str,
    password: &str,
) -> RepositoryResult<Option<MuseumStaff>>
where
    R: MuseumRepository + ?Sized,
{
    let Some(staff) = repo.find_staff_by_username(username).await? else {
        tracing::debug!("Login attempt for unknown username '{}'", username);
        if let Some(dummy) = DUMMY_PASSWORD_HASH.as_deref() {
            verify_password_async(password.to_string(), dummy.to_string()).await;
        }
        return Ok(None);
    };
    if !verify_password_async(password.to_string(), staff.password_hash.clone()).await {
        tracing::debug!("Wrong password for '{}'", username);
        return Ok(None);
    }
    if !staff.is_active {
        tracing::info!("Rejected login for inactive account '{}'", username);
        return Ok(None);
    }
    Ok(Some(staff))
}
