//! Artwork upload, translation and geofence check pages.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::ArtworkId;
use crate::forms::BoundForm;
use crate::geolocation::GeofenceResult;
use crate::media::MediaStorage;
use crate::models::{Artwork, ArtworkCategory, ArtworkTranslation};

pub const ARTWORK_UPLOAD_PATH: &str = "/artworks/upload/";
pub const ARTWORK_TRANSLATIONS_PATH: &str = "/artworks/{artwork_id}/translations/";
pub const ARTWORK_GEOFENCE_CHECK_PATH: &str = "/artworks/{artwork_id}/geofence-check/";

pub const UPLOAD_TEMPLATE: &str = "artworks/upload.html";
pub const TRANSLATIONS_TEMPLATE: &str = "artworks/translations.html";

/// Concrete translations page URL of one artwork.
pub fn translations_url(artwork_id: ArtworkId) -> String {
    ARTWORK_TRANSLATIONS_PATH.replace("{artwork_id}", &artwork_id.to_string())
}

/// Artwork as listed on staff pages, with media paths resolved to URLs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtworkSummary {
    pub id: ArtworkId,
    pub title: String,
    pub category: ArtworkCategory,
    pub gallery_location: Option<String>,
    pub room_number: Option<String>,
    pub tags: Vec<String>,
    pub is_on_display: bool,
    pub has_location: bool,
    pub geofence_radius_meters: u32,
    pub image_url: Option<String>,
    pub qr_code_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ArtworkSummary {
    pub fn from_artwork(artwork: &Artwork, media: &MediaStorage) -> Self {
        Self {
            id: artwork.id,
            title: artwork.title.clone(),
            category: artwork.category,
            gallery_location: artwork.gallery_location.clone(),
            room_number: artwork.room_number.clone(),
            tags: artwork.tags.clone(),
            is_on_display: artwork.is_on_display,
            has_location: artwork.location().is_some(),
            geofence_radius_meters: artwork.geofence_radius_meters,
            image_url: artwork.image.as_deref().map(|p| media.url(p)),
            qr_code_url: artwork.qr_code.as_deref().map(|p| media.url(p)),
            created_at: artwork.created_at,
        }
    }
}

/// Context of the artwork upload page.
#[derive(Debug, Clone, Serialize)]
pub struct UploadPageData {
    pub form: BoundForm,
    /// Known artist names offered in the artist datalist
    pub artists: Vec<String>,
}

/// Context of an artwork's translations page.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationPageData {
    pub artwork: ArtworkSummary,
    pub translations: Vec<ArtworkTranslation>,
    pub form: BoundForm,
}

/// Response of a staff geofence check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeofenceCheckData {
    pub artwork_id: ArtworkId,
    pub radius_meters: u32,
    #[serde(flatten)]
    pub result: GeofenceResult,
    /// Friendly distance band, present whenever a distance was computed
    pub distance_message: Option<String>,
}
