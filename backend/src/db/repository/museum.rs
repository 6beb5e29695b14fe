//! Museum and staff account persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::api::{MuseumId, StaffId};
use crate::models::{Museum, MuseumStaff, NewMuseum, NewStaff};

/// Repository trait for museums and their staff.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust and allow
/// sharing across handlers.
#[async_trait]
pub trait MuseumRepository: Send + Sync {
    /// Check if the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Create a museum and its first staff account as one atomic unit.
    ///
    /// Nothing is stored when either record is rejected.
    ///
    /// # Returns
    /// * `Ok((Museum, MuseumStaff))` - Both stored records with assigned IDs
    /// * `Err(RepositoryError::Conflict)` - If the username is already taken
    async fn register_museum(
        &self,
        museum: NewMuseum,
        staff: NewStaff,
    ) -> RepositoryResult<(Museum, MuseumStaff)>;

    /// Retrieve a museum by ID.
    async fn get_museum(&self, museum_id: MuseumId) -> RepositoryResult<Museum>;

    /// Retrieve a staff account by ID.
    async fn get_staff(&self, staff_id: StaffId) -> RepositoryResult<MuseumStaff>;

    /// Look up a staff account by exact username.
    async fn find_staff_by_username(&self, username: &str)
        -> RepositoryResult<Option<MuseumStaff>>;

    /// Stamp the last successful login time of a staff account.
    async fn record_login(&self, staff_id: StaffId, at: DateTime<Utc>) -> RepositoryResult<()>;
}
