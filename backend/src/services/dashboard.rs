//! Dashboard context for a logged-in staff member.

use super::ServiceResult;
use crate::db::repository::FullRepository;
use crate::media::MediaStorage;
use crate::models::MuseumStaff;
use crate::routes::artworks::ArtworkSummary;
use crate::routes::dashboard::{DashboardData, DASHBOARD_ARTWORK_LIMIT};

/// The staff member's museum, its most recent artworks and artwork counts.
pub async fn dashboard_data<R>(
    repo: &R,
    media: &MediaStorage,
    staff: &MuseumStaff,
) -> ServiceResult<DashboardData>
where
    R: FullRepository + ?Sized,
{
    let museum = repo.get_museum(staff.museum_id).await?;
    let artworks = repo
        .list_artworks(museum.id, Some(DASHBOARD_ARTWORK_LIMIT))
        .await?
        .iter()
        .map(|artwork| ArtworkSummary::from_artwork(artwork, media))
        .collect();
    let total_artworks = repo.count_artworks(museum.id, None).await?;
    let active_artworks = repo.count_artworks(museum.id, Some(true)).await?;

    Ok(DashboardData {
        staff_name: staff.full_name(),
        museum,
        artworks,
        total_artworks,
        active_artworks,
    })
}
