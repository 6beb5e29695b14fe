//! Service layer for business logic and orchestration.
//!
//! Services sit between the HTTP handlers and the repository: they turn
//! cleaned form values into stored records, write uploaded media and build the
//! page contexts. Handlers never talk to the repository directly.

pub mod accounts;
pub mod artworks;
pub mod dashboard;

use crate::auth::password::PasswordHashError;
use crate::db::repository::RepositoryError;
use crate::forms::FormErrors;
use crate::geolocation::QrCodeError;

pub use accounts::{login, register_museum};
pub use artworks::{add_translation, check_artwork_geofence, museum_artwork, upload_artwork};
pub use dashboard::dashboard_data;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a service operation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The submission is well-formed but conflicts with stored data; shown
    /// to the user as form errors.
    #[error("Submitted data was rejected")]
    Rejected(FormErrors),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),

    #[error("Media storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error(transparent)]
    QrCode(#[from] QrCodeError),
}

impl ServiceError {
    pub fn rejected(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FormErrors::new();
        errors.add(field, message);
        ServiceError::Rejected(errors)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Repository(e) if e.is_not_found())
    }
}
