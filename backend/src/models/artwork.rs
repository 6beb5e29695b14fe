//! Artwork, artist and translation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ArtistId, ArtworkId, GeographicLocation, MuseumId, StaffId, TranslationId};

/// Geofence radius applied when the upload form leaves it blank.
pub const DEFAULT_GEOFENCE_RADIUS_METERS: u32 = 100;

crate::define_choices!(
    /// Artwork category offered by the upload form.
    ArtworkCategory {
        Painting => ("painting", "Painting"),
        Sculpture => ("sculpture", "Sculpture"),
        Photography => ("photography", "Photography"),
        Drawing => ("drawing", "Drawing"),
        Print => ("print", "Print"),
        Textile => ("textile", "Textile"),
        Ceramics => ("ceramics", "Ceramics"),
        Manuscript => ("manuscript", "Manuscript"),
        Artifact => ("artifact", "Artifact"),
        Installation => ("installation", "Installation"),
        Other => ("other", "Other"),
    }
);

crate::define_choices!(
    /// Translation languages (ISO 639-1 codes).
    Language {
        English => ("en", "English"),
        Spanish => ("es", "Spanish"),
        French => ("fr", "French"),
        German => ("de", "German"),
        Italian => ("it", "Italian"),
        Portuguese => ("pt", "Portuguese"),
        Dutch => ("nl", "Dutch"),
        Chinese => ("zh", "Chinese"),
        Japanese => ("ja", "Japanese"),
        Korean => ("ko", "Korean"),
        Arabic => ("ar", "Arabic"),
        Russian => ("ru", "Russian"),
        Hindi => ("hi", "Hindi"),
    }
);

/// An artist, looked up by name when artworks are uploaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
}

/// A catalogued artwork.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artwork {
    pub id: ArtworkId,
    pub museum_id: MuseumId,
    pub artist_id: Option<ArtistId>,
    pub title: String,
    pub description: Option<String>,
    pub category: ArtworkCategory,
    pub year_created: Option<i32>,
    pub medium: Option<String>,
    pub dimensions: Option<String>,
    pub gallery_location: Option<String>,
    pub room_number: Option<String>,
    /// Media path of the artwork image
    pub image: Option<String>,
    /// Media path of the audio narration
    pub audio_narration: Option<String>,
    pub historical_context: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geofence_radius_meters: u32,
    pub tags: Vec<String>,
    pub is_on_display: bool,
    /// Media path of the generated QR code image
    pub qr_code: Option<String>,
    pub created_by: Option<StaffId>,
    pub created_at: DateTime<Utc>,
}

impl Artwork {
    /// Stored location, if both coordinates were captured.
    pub fn location(&self) -> Option<GeographicLocation> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeographicLocation {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// Artwork fields collected by the upload form, before an ID is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtwork {
    pub museum_id: MuseumId,
    pub artist_id: Option<ArtistId>,
    pub title: String,
    pub description: Option<String>,
    pub category: ArtworkCategory,
    pub year_created: Option<i32>,
    pub medium: Option<String>,
    pub dimensions: Option<String>,
    pub gallery_location: Option<String>,
    pub room_number: Option<String>,
    pub image: Option<String>,
    pub audio_narration: Option<String>,
    pub historical_context: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geofence_radius_meters: u32,
    pub tags: Vec<String>,
    pub created_by: Option<StaffId>,
}

/// A translated title and texts for one artwork in one language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtworkTranslation {
    pub id: TranslationId,
    pub artwork_id: ArtworkId,
    pub language: Language,
    pub title: String,
    pub description: Option<String>,
    pub historical_context: Option<String>,
    pub audio_narration: Option<String>,
}

/// Translation fields collected by the translation form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTranslation {
    pub artwork_id: ArtworkId,
    pub language: Language,
    pub title: String,
    pub description: Option<String>,
    pub historical_context: Option<String>,
    pub audio_narration: Option<String>,
}
