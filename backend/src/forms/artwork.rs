//! Artwork upload form.
//!
//! Besides the plain model fields the form carries two derived inputs:
//! `tags`, a comma-separated string cleaned into a list, and the hidden
//! `latitude` / `longitude` pair filled in by the browser's location capture.

use super::fields::{FieldCleaner, FieldSpec, Widget};
use super::{Form, FormData, FormErrors, UploadedFile};
use crate::models::{ArtworkCategory, DEFAULT_GEOFENCE_RADIUS_METERS};

pub const TITLE_MAX_LENGTH: usize = 255;
pub const MEDIUM_MAX_LENGTH: usize = 255;
pub const DIMENSIONS_MAX_LENGTH: usize = 100;
pub const GALLERY_LOCATION_MAX_LENGTH: usize = 255;
pub const ROOM_NUMBER_MAX_LENGTH: usize = 50;
pub const ARTIST_NAME_MAX_LENGTH: usize = 255;

/// Datalist id the artist input is linked to.
pub const ARTISTS_DATALIST: &str = "artists-list";

pub const MSG_PARTIAL_LOCATION: &str =
    "Both latitude and longitude are required when capturing a location.";

/// Cleaned artwork upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkUpload {
    pub title: String,
    pub description: String,
    pub category: ArtworkCategory,
    pub year_created: Option<i32>,
    pub medium: Option<String>,
    pub dimensions: Option<String>,
    pub gallery_location: Option<String>,
    pub room_number: Option<String>,
    pub image: Option<UploadedFile>,
    pub audio_narration: Option<UploadedFile>,
    pub historical_context: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geofence_radius_meters: u32,
    pub tags: Vec<String>,
    pub artist_name: Option<String>,
}

/// Split a comma-separated tag string, trimming each tag and dropping empties.
pub fn clean_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct ArtworkUploadForm;

impl Form for ArtworkUploadForm {
    type Cleaned = ArtworkUpload;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("title", "Title", Widget::TextInput)
                .required()
                .max_length(TITLE_MAX_LENGTH)
                .placeholder("Artifact Name"),
            FieldSpec::new("description", "Description", Widget::Textarea)
                .required()
                .placeholder("Detailed description for AR display")
                .rows(6),
            FieldSpec::new("category", "Category", Widget::Select)
                .required()
                .choices(ArtworkCategory::choices())
                .initial(ArtworkCategory::Painting.as_str()),
            FieldSpec::new("year_created", "Year created", Widget::NumberInput)
                .placeholder("Year"),
            FieldSpec::new("medium", "Medium", Widget::TextInput)
                .max_length(MEDIUM_MAX_LENGTH)
                .placeholder("e.g., Oil on canvas"),
            FieldSpec::new("dimensions", "Dimensions", Widget::TextInput)
                .max_length(DIMENSIONS_MAX_LENGTH)
                .placeholder("e.g., 100x80 cm"),
            FieldSpec::new("gallery_location", "Gallery location", Widget::TextInput)
                .max_length(GALLERY_LOCATION_MAX_LENGTH)
                .placeholder("Gallery/Hall Name"),
            FieldSpec::new("room_number", "Room number", Widget::TextInput)
                .max_length(ROOM_NUMBER_MAX_LENGTH)
                .placeholder("Room Number"),
            FieldSpec::new("image", "Image", Widget::FileInput).attr("accept", "image/*"),
            FieldSpec::new("audio_narration", "Audio narration", Widget::FileInput)
                .attr("accept", "audio/*"),
            FieldSpec::new("historical_context", "Historical context", Widget::Textarea)
                .placeholder("Historical background")
                .rows(4),
            FieldSpec::new("latitude", "Latitude", Widget::HiddenInput),
            FieldSpec::new("longitude", "Longitude", Widget::HiddenInput),
            FieldSpec::new("geofence_radius_meters", "Geofence radius (m)", Widget::NumberInput)
                .attr("min", "1")
                .initial(DEFAULT_GEOFENCE_RADIUS_METERS.to_string()),
            FieldSpec::new("tags", "Tags", Widget::TextInput)
                .placeholder("Tags (comma-separated)"),
            FieldSpec::new("artist_name", "Artist", Widget::TextInput)
                .max_length(ARTIST_NAME_MAX_LENGTH)
                .placeholder("Artist Name (optional)")
                .attr("list", ARTISTS_DATALIST),
        ]
    }

    fn clean(data: &FormData) -> Result<ArtworkUpload, FormErrors> {
        let mut c = FieldCleaner::new(data);

        let title = c.text("title", true, Some(TITLE_MAX_LENGTH));
        let description = c.text("description", true, None);
        let category = c.choice::<ArtworkCategory>("category", true);
        let year = c.integer("year_created", false);
        let year_created = c
            .bounded("year_created", year, i64::from(i32::MIN), i64::from(i32::MAX))
            .map(|y| y as i32);
        let medium = c.text("medium", false, Some(MEDIUM_MAX_LENGTH));
        let dimensions = c.text("dimensions", false, Some(DIMENSIONS_MAX_LENGTH));
        let gallery_location =
            c.text("gallery_location", false, Some(GALLERY_LOCATION_MAX_LENGTH));
        let room_number = c.text("room_number", false, Some(ROOM_NUMBER_MAX_LENGTH));
        let image = c.image("image", false);
        let audio_narration = c.file("audio_narration", false);
        let historical_context = c.text("historical_context", false, None);

        let lat = c.decimal("latitude", false);
        let latitude = c.bounded("latitude", lat, -90.0, 90.0);
        let lon = c.decimal("longitude", false);
        let longitude = c.bounded("longitude", lon, -180.0, 180.0);
        let location_given = [data.get("latitude"), data.get("longitude")]
            .map(|v| v.is_some_and(|s| !s.trim().is_empty()));
        if location_given[0] != location_given[1] {
            c.add_error(super::NON_FIELD_ERRORS, MSG_PARTIAL_LOCATION);
        }

        let radius = c.integer("geofence_radius_meters", false);
        let geofence_radius_meters = c
            .bounded("geofence_radius_meters", radius, 1, i64::from(u32::MAX))
            .map(|r| r as u32)
            .unwrap_or(DEFAULT_GEOFENCE_RADIUS_METERS);

        let tags = clean_tags(data.get("tags").unwrap_or(""));
        let artist_name = c.text("artist_name", false, Some(ARTIST_NAME_MAX_LENGTH));

        c.finish()?;
        Ok(ArtworkUpload {
            title: title.unwrap_or_default(),
            description: description.unwrap_or_default(),
            category: category.unwrap_or(ArtworkCategory::Painting),
            year_created,
            medium,
            dimensions,
            gallery_location,
            room_number,
            image,
            audio_narration,
            historical_context,
            latitude,
            longitude,
            geofence_radius_meters,
            tags,
            artist_name,
        })
    }
}
