//! Public API surface for the ArtScope backend.
//!
//! This file consolidates the identifier newtypes and the page context types
//! returned by the HTTP layer. All types derive Serialize/Deserialize for JSON
//! serialization.

pub use crate::routes::artworks::{
    ArtworkSummary, GeofenceCheckData, TranslationPageData, UploadPageData,
};
pub use crate::routes::auth::{LoginPageData, RegisterPageData};
pub use crate::routes::dashboard::DashboardData;
pub use crate::routes::landing::LandingData;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

crate::define_id_type!(
    /// Museum identifier (repository primary key).
    i64,
    MuseumId
);
crate::define_id_type!(
    /// Staff account identifier.
    i64,
    StaffId
);
crate::define_id_type!(
    /// Artist identifier.
    i64,
    ArtistId
);
crate::define_id_type!(
    /// Artwork translation identifier.
    i64,
    TranslationId
);

/// Artwork identifier.
///
/// Artworks are addressed by UUID because the identifier is printed into QR
/// codes that visitors scan.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtworkId(pub Uuid);

impl ArtworkId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        ArtworkId(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ArtworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ArtworkId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(ArtworkId)
    }
}

/// Geographic location (latitude, longitude) in decimal degrees.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeographicLocation {
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude: f64,
}

impl GeographicLocation {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, String> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err("Latitude must be between -90 and 90 degrees".to_string());
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err("Longitude must be between -180 and 180 degrees".to_string());
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}
