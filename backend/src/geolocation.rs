//! QR codes and geofencing for artworks.
//!
//! Every stored artwork gets a QR code whose payload identifies it; a visitor
//! scanning the code is only let through when standing inside the artwork's
//! geofence, measured as the WGS-84 geodesic distance in metres.

use geographiclib_rs::{Geodesic, InverseGeodesic};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use serde::Serialize;
use std::io::{self, Cursor, Write};

use crate::models::Artwork;

/// Pixels per QR module.
pub const QR_MODULE_PIXELS: u32 = 10;

pub const MSG_ACCESS_GRANTED: &str = "Access granted";
pub const MSG_MISSING_LOCATION: &str = "Missing location data";
pub const MSG_INVALID_LOCATION: &str = "Invalid location data";

#[derive(Debug, thiserror::Error)]
pub enum QrCodeError {
    #[error("Failed to encode QR payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("Failed to build QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("Failed to write QR image: {0}")]
    Image(#[from] image::ImageError),
}

/// Data carried by an artwork's QR code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QrPayload {
    pub artwork_id: String,
    pub title: String,
    pub museum: String,
    pub url: String,
}

impl QrPayload {
    pub fn for_artwork(artwork: &Artwork, museum_name: &str) -> Self {
        let artwork_id = artwork.id.to_string();
        Self {
            url: format!("/api/artworks/{}/", artwork_id),
            artwork_id,
            title: artwork.title.clone(),
            museum: museum_name.to_string(),
        }
    }

    /// JSON text in the conventional scanner-friendly layout: `", "` and
    /// `": "` separators, non-ASCII escaped as `\uXXXX`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedAsciiFormatter);
        self.serialize(&mut ser)?;
        // Only ASCII is ever written.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

struct SpacedAsciiFormatter;

impl serde_json::ser::Formatter for SpacedAsciiFormatter {
    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// A generated QR image ready to be stored.
#[derive(Debug, Clone)]
pub struct QrCodeFile {
    /// `qr_<artwork id>.png`
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Render an artwork's QR code as a black-on-white PNG.
///
/// Error correction level L at the smallest version that fits the payload,
/// with a four-module quiet zone.
pub fn generate_qr_code(artwork: &Artwork, museum_name: &str) -> Result<QrCodeFile, QrCodeError> {
    let payload = QrPayload::for_artwork(artwork, museum_name).to_json()?;
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::L)?;
    let image = code
        .render::<Luma<u8>>()
        .dark_color(Luma([0u8]))
        .light_color(Luma([255u8]))
        .module_dimensions(QR_MODULE_PIXELS, QR_MODULE_PIXELS)
        .quiet_zone(true)
        .build();

    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

    tracing::debug!(
        "Generated QR code for artwork {} ({} bytes, version {:?})",
        artwork.id,
        bytes.len(),
        code.version()
    );

    Ok(QrCodeFile {
        filename: format!("qr_{}.png", artwork.id),
        bytes,
    })
}

/// Outcome of a geofence check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeofenceResult {
    pub allowed: bool,
    /// Metres, rounded to two decimals
    pub distance: Option<f64>,
    pub message: String,
}

impl GeofenceResult {
    fn denied(message: &str) -> Self {
        Self {
            allowed: false,
            distance: None,
            message: message.to_string(),
        }
    }
}

/// Geodesic distance in metres between two points on the WGS-84 ellipsoid.
pub fn geodesic_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Geodesic::wgs84().inverse(lat1, lon1, lat2, lon2)
}

fn valid_coordinate(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}

/// Decide whether a visitor at `(user_lat, user_lon)` is inside the geofence
/// of radius `radius_meters` around `(artwork_lat, artwork_lon)`.
///
/// A coordinate of exactly zero is a real location (the equator or the prime
/// meridian), only an absent value counts as missing.
pub fn check_geofence(
    user_lat: Option<f64>,
    user_lon: Option<f64>,
    artwork_lat: Option<f64>,
    artwork_lon: Option<f64>,
    radius_meters: f64,
) -> GeofenceResult {
    let (Some(user_lat), Some(user_lon), Some(artwork_lat), Some(artwork_lon)) =
        (user_lat, user_lon, artwork_lat, artwork_lon)
    else {
        return GeofenceResult::denied(MSG_MISSING_LOCATION);
    };
    if !valid_coordinate(user_lat, user_lon) || !valid_coordinate(artwork_lat, artwork_lon) {
        return GeofenceResult::denied(MSG_INVALID_LOCATION);
    }

    let distance = geodesic_distance(user_lat, user_lon, artwork_lat, artwork_lon);
    let allowed = distance <= radius_meters;
    let rounded = round2(distance);
    let message = if allowed {
        MSG_ACCESS_GRANTED.to_string()
    } else {
        format!("You are {}m from this artwork", format_decimal(rounded))
    };

    GeofenceResult {
        allowed,
        distance: Some(rounded),
        message,
    }
}

/// Friendly description of how far a visitor is from the museum.
pub fn get_distance_message(distance_meters: f64) -> String {
    if distance_meters < 50.0 {
        "You're very close! Look around.".to_string()
    } else if distance_meters < 100.0 {
        "You're nearby. Walk a bit closer.".to_string()
    } else if distance_meters < 500.0 {
        format!("You're {}m away from the museum.", distance_meters.trunc() as i64)
    } else if distance_meters < 1000.0 {
        format!("You're {}m away. Head to the museum.", distance_meters.trunc() as i64)
    } else {
        format!("You're {:.1}km away from the museum.", distance_meters / 1000.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Shortest decimal form that always keeps a fractional part (`12.0`, `3.5`).
fn format_decimal(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ArtworkId, MuseumId};
    use crate::models::{ArtworkCategory, DEFAULT_GEOFENCE_RADIUS_METERS};
    use chrono::Utc;

    fn artwork(title: &str) -> Artwork {
        Artwork {
            id: ArtworkId::generate(),
            museum_id: MuseumId::new(1),
            artist_id: None,
            title: title.to_string(),
            description: None,
            category: ArtworkCategory::Painting,
            year_created: None,
            medium: None,
            dimensions: None,
            gallery_location: None,
            room_number: None,
            image: None,
            audio_narration: None,
            historical_context: None,
            latitude: None,
            longitude: None,
            geofence_radius_meters: DEFAULT_GEOFENCE_RADIUS_METERS,
            tags: Vec::new(),
            is_on_display: true,
            qr_code: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_payload_layout() {
        let art = artwork("Primavera");
        let json = QrPayload::for_artwork(&art, "Uffizi").to_json().unwrap();
        assert_eq!(
            json,
            format!(
                "{{\"artwork_id\": \"{id}\", \"title\": \"Primavera\", \"museum\": \"Uffizi\", \"url\": \"/api/artworks/{id}/\"}}",
                id = art.id
            )
        );
    }

    #[test]
    fn test_payload_escapes_non_ascii() {
        let art = artwork("Café 🎨");
        let json = QrPayload::for_artwork(&art, "Musée d\"Orsay").to_json().unwrap();
        assert!(json.is_ascii());
        assert!(json.contains("Caf\\u00e9 \\ud83c\\udfa8"));
        assert!(json.contains("Mus\\u00e9e d\\\"Orsay"));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["title"], "Café 🎨");
    }

    #[test]
    fn test_generate_qr_code_png() {
        let art = artwork("The Birth of Venus");
        let file = generate_qr_code(&art, "Uffizi").unwrap();
        assert_eq!(file.filename, format!("qr_{}.png", art.id));
        assert_eq!(&file.bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let decoded = image::load_from_memory(&file.bytes).unwrap().to_luma8();
        assert_eq!(decoded.width(), decoded.height());
        assert_eq!(decoded.width() % QR_MODULE_PIXELS, 0);
        // Quiet zone is white, the finder pattern corner is black.
        assert_eq!(decoded.get_pixel(0, 0)[0], 255);
        let edge = 4 * QR_MODULE_PIXELS;
        assert_eq!(decoded.get_pixel(edge, edge)[0], 0);
    }

    #[test]
    fn test_missing_location() {
        let result = check_geofence(Some(45.0), None, Some(45.0), Some(7.0), 100.0);
        assert_eq!(result, GeofenceResult::denied(MSG_MISSING_LOCATION));
    }

    #[test]
    fn test_zero_coordinates_are_valid() {
        let result = check_geofence(Some(0.0), Some(0.0), Some(0.0), Some(0.0), 100.0);
        assert!(result.allowed);
        assert_eq!(result.distance, Some(0.0));
        assert_eq!(result.message, MSG_ACCESS_GRANTED);
    }

    #[test]
    fn test_out_of_range_location() {
        let result = check_geofence(Some(91.0), Some(0.0), Some(0.0), Some(0.0), 100.0);
        assert_eq!(result.message, MSG_INVALID_LOCATION);
        assert_eq!(result.distance, None);
    }

    #[test]
    fn test_equatorial_degree() {
        let d = geodesic_distance(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111_319.49).abs() < 0.1, "{}", d);
        let meridian = geodesic_distance(0.0, 0.0, 1.0, 0.0);
        assert!((110_570.0..110_580.0).contains(&meridian), "{}", meridian);
    }

    #[test]
    fn test_outside_radius_reports_distance() {
        let result = check_geofence(Some(0.0), Some(0.0), Some(0.0), Some(0.01), 100.0);
        assert!(!result.allowed);
        let distance = result.distance.unwrap();
        assert!((distance - 1113.19).abs() < 0.02, "{}", distance);
        assert_eq!(
            result.message,
            format!("You are {}m from this artwork", format_decimal(distance))
        );
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let d = geodesic_distance(45.0, 7.0, 45.0005, 7.0);
        let result = check_geofence(Some(45.0), Some(7.0), Some(45.0005), Some(7.0), d);
        assert!(result.allowed);
    }

    #[test]
    fn test_distance_message_bands() {
        assert_eq!(get_distance_message(0.0), "You're very close! Look around.");
        assert_eq!(get_distance_message(49.99), "You're very close! Look around.");
        assert_eq!(get_distance_message(50.0), "You're nearby. Walk a bit closer.");
        assert_eq!(get_distance_message(100.0), "You're 100m away from the museum.");
        assert_eq!(get_distance_message(499.9), "You're 499m away from the museum.");
        assert_eq!(get_distance_message(500.0), "You're 500m away. Head to the museum.");
        assert_eq!(get_distance_message(999.99), "You're 999m away. Head to the museum.");
        assert_eq!(get_distance_message(1000.0), "You're 1.0km away from the museum.");
        assert_eq!(get_distance_message(12_345.0), "You're 12.3km away from the museum.");
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(12.0), "12.0");
        assert_eq!(format_decimal(1113.19), "1113.19");
        assert_eq!(format_decimal(0.5), "0.5");
    }
}
