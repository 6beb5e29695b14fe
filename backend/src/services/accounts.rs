//! Museum registration and staff login.

use chrono::Utc;
use tracing::{info, warn};

use super::{ServiceError, ServiceResult};
use crate::auth::{authenticate, hash_password_async};
use crate::db::repository::{FullRepository, MuseumRepository};
use crate::forms::{LoginCredentials, MuseumRegistration, StaffRegistration};
use crate::media::{MediaStorage, MUSEUM_LOGO_DIR};
use crate::models::{Museum, MuseumStaff, NewMuseum, NewStaff, StaffRole};

pub const MSG_USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Create a museum together with its first staff account.
///
/// The staff member becomes the museum's admin. A username that is already
/// in use is reported as a form error on `username`; in that case nothing is
/// stored, including the uploaded logo.
pub async fn register_museum<R>(
    repo: &R,
    media: &MediaStorage,
    museum: MuseumRegistration,
    staff: StaffRegistration,
) -> ServiceResult<(Museum, MuseumStaff)>
where
    R: FullRepository + ?Sized,
{
    if repo.find_staff_by_username(&staff.username).await?.is_some() {
        return Err(ServiceError::rejected("username", MSG_USERNAME_TAKEN));
    }

    let password_hash = hash_password_async(staff.password.clone()).await?;
    let logo = match &museum.logo {
        Some(file) => Some(media.save(MUSEUM_LOGO_DIR, &file.filename, &file.bytes).await?),
        None => None,
    };

    let new_museum = NewMuseum {
        name: museum.name,
        description: museum.description,
        location: museum.location,
        contact_email: museum.contact_email,
        website: museum.website,
        logo: logo.clone(),
    };
    let new_staff = NewStaff {
        username: staff.username,
        email: staff.email,
        first_name: staff.first_name,
        last_name: staff.last_name,
        phone: staff.phone,
        password_hash,
        role: StaffRole::Admin,
    };

    match repo.register_museum(new_museum, new_staff).await {
        Ok((museum, staff)) => {
            info!(
                "Registered museum '{}' ({}) with admin '{}'",
                museum.name, museum.id, staff.username
            );
            Ok((museum, staff))
        }
        Err(e) => {
            if let Some(path) = &logo {
                if let Err(cleanup) = media.delete(path).await {
                    warn!("Failed to remove orphaned logo {}: {}", path, cleanup);
                }
            }
            if e.is_conflict() {
                Err(ServiceError::rejected("username", MSG_USERNAME_TAKEN))
            } else {
                Err(e.into())
            }
        }
    }
}

/// Authenticate a staff member and record the login time.
///
/// Returns `Ok(None)` for unknown users, wrong passwords and inactive
/// accounts.
pub async fn login<R>(repo: &R, credentials: &LoginCredentials) -> ServiceResult<Option<MuseumStaff>>
where
    R: MuseumRepository + ?Sized,
{
    let Some(mut staff) = authenticate(repo, &credentials.username, &credentials.password).await?
    else {
        return Ok(None);
    };
    let now = Utc::now();
    repo.record_login(staff.id, now).await?;
    staff.last_login = Some(now);
    info!("Staff '{}' logged in", staff.username);
    Ok(Some(staff))
}
