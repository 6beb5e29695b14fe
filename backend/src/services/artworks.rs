//! Artwork upload, translations and geofence checks.

use tracing::{debug, info, warn};

use super::{ServiceError, ServiceResult};
use crate::api::{ArtistId, ArtworkId};
use crate::db::repository::{ErrorContext, FullRepository, RepositoryError};
use crate::forms::{
    ArtworkUpload, BoundForm, FieldCleaner, FormData, FormErrors, TranslationSubmission,
    UploadedFile,
};
use crate::geolocation::{check_geofence, generate_qr_code, get_distance_message};
use crate::media::{
    MediaStorage, ARTWORK_AUDIO_DIR, ARTWORK_IMAGE_DIR, QR_CODE_DIR, TRANSLATION_AUDIO_DIR,
};
use crate::models::{
    Artwork, ArtworkTranslation, Museum, MuseumStaff, NewArtwork, NewTranslation,
};
use crate::routes::artworks::{ArtworkSummary, GeofenceCheckData, TranslationPageData};

pub const MSG_DUPLICATE_TRANSLATION: &str =
    "Artwork translation with this Artwork and Language already exists.";

/// Store an uploaded artwork under the staff member's museum and attach its
/// QR code.
///
/// The artist is looked up by name and created when unknown. Uploaded image
/// and audio files are written to media storage before the record is saved.
/// When any later step fails the files written so far and the stored record
/// are removed again.
pub async fn upload_artwork<R>(
    repo: &R,
    media: &MediaStorage,
    staff: &MuseumStaff,
    upload: ArtworkUpload,
) -> ServiceResult<Artwork>
where
    R: FullRepository + ?Sized,
{
    let museum = repo.get_museum(staff.museum_id).await?;

    let artist_id = match upload.artist_name.as_deref() {
        Some(name) => Some(repo.get_or_create_artist(name).await?.id),
        None => None,
    };

    let mut written = UploadWrites::default();
    match store_upload(repo, media, staff, &museum, artist_id, upload, &mut written).await {
        Ok(artwork) => {
            info!(
                "Artwork '{}' ({}) uploaded to museum {} by '{}'",
                artwork.title, artwork.id, museum.id, staff.username
            );
            Ok(artwork)
        }
        Err(e) => {
            warn!("Artwork upload to museum {} failed: {}", museum.id, e);
            written.roll_back(repo, media).await;
            Err(e)
        }
    }
}

/// Media files and the record an upload has written so far.
#[derive(Debug, Default)]
struct UploadWrites {
    files: Vec<String>,
    artwork: Option<ArtworkId>,
}

impl UploadWrites {
    async fn save(
        &mut self,
        media: &MediaStorage,
        dir: &str,
        file: Option<&UploadedFile>,
    ) -> ServiceResult<Option<String>> {
        let Some(file) = file else {
            return Ok(None);
        };
        let path = media.save(dir, &file.filename, &file.bytes).await?;
        self.files.push(path.clone());
        Ok(Some(path))
    }

    async fn roll_back<R>(self, repo: &R, media: &MediaStorage)
    where
        R: FullRepository + ?Sized,
    {
        if let Some(artwork_id) = self.artwork {
            if let Err(cleanup) = repo.delete_artwork(artwork_id).await {
                warn!("Failed to remove incomplete artwork {}: {}", artwork_id, cleanup);
            }
        }
        for path in &self.files {
            if let Err(cleanup) = media.delete(path).await {
                warn!("Failed to remove orphaned upload {}: {}", path, cleanup);
            }
        }
    }
}

async fn store_upload<R>(
    repo: &R,
    media: &MediaStorage,
    staff: &MuseumStaff,
    museum: &Museum,
    artist_id: Option<ArtistId>,
    upload: ArtworkUpload,
    written: &mut UploadWrites,
) -> ServiceResult<Artwork>
where
    R: FullRepository + ?Sized,
{
    let image = written
        .save(media, ARTWORK_IMAGE_DIR, upload.image.as_ref())
        .await?;
    let audio_narration = written
        .save(media, ARTWORK_AUDIO_DIR, upload.audio_narration.as_ref())
        .await?;

    let artwork = repo
        .store_artwork(NewArtwork {
            museum_id: museum.id,
            artist_id,
            title: upload.title,
            description: Some(upload.description),
            category: upload.category,
            year_created: upload.year_created,
            medium: upload.medium,
            dimensions: upload.dimensions,
            gallery_location: upload.gallery_location,
            room_number: upload.room_number,
            image,
            audio_narration,
            historical_context: upload.historical_context,
            latitude: upload.latitude,
            longitude: upload.longitude,
            geofence_radius_meters: upload.geofence_radius_meters,
            tags: upload.tags,
            created_by: Some(staff.id),
        })
        .await?;
    written.artwork = Some(artwork.id);

    let qr = generate_qr_code(&artwork, &museum.name)?;
    let qr_path = media.save(QR_CODE_DIR, &qr.filename, &qr.bytes).await?;
    written.files.push(qr_path.clone());
    Ok(repo.set_artwork_qr_code(artwork.id, qr_path).await?)
}

/// Names of every known artist, for the upload form's datalist.
pub async fn artist_names<R>(repo: &R) -> ServiceResult<Vec<String>>
where
    R: FullRepository + ?Sized,
{
    Ok(repo
        .list_artists()
        .await?
        .into_iter()
        .map(|artist| artist.name)
        .collect())
}

/// Fetch an artwork that belongs to the staff member's museum.
///
/// Artworks of other museums are reported as not found.
pub async fn museum_artwork<R>(
    repo: &R,
    staff: &MuseumStaff,
    artwork_id: ArtworkId,
) -> ServiceResult<Artwork>
where
    R: FullRepository + ?Sized,
{
    let artwork = repo.get_artwork(artwork_id).await?;
    if artwork.museum_id != staff.museum_id {
        debug!(
            "Staff '{}' requested artwork {} of museum {}",
            staff.username, artwork_id, artwork.museum_id
        );
        return Err(RepositoryError::not_found_with_context(
            format!("Artwork {} not found", artwork_id),
            ErrorContext::new("museum_artwork")
                .with_entity("artwork")
                .with_entity_id(artwork_id),
        )
        .into());
    }
    Ok(artwork)
}

/// Add a translation to an artwork. Each language may be used once.
pub async fn add_translation<R>(
    repo: &R,
    media: &MediaStorage,
    artwork: &Artwork,
    submission: TranslationSubmission,
) -> ServiceResult<ArtworkTranslation>
where
    R: FullRepository + ?Sized,
{
    let existing = repo.list_translations(artwork.id).await?;
    if existing.iter().any(|t| t.language == submission.language) {
        return Err(ServiceError::rejected(
            crate::forms::NON_FIELD_ERRORS,
            MSG_DUPLICATE_TRANSLATION,
        ));
    }

    let audio_narration = match &submission.audio_narration {
        Some(file) => Some(
            media
                .save(TRANSLATION_AUDIO_DIR, &file.filename, &file.bytes)
                .await?,
        ),
        None => None,
    };

    let stored = repo
        .store_translation(NewTranslation {
            artwork_id: artwork.id,
            language: submission.language,
            title: submission.title,
            description: submission.description,
            historical_context: submission.historical_context,
            audio_narration: audio_narration.clone(),
        })
        .await;

    match stored {
        Ok(translation) => {
            info!(
                "Added {} translation to artwork {}",
                translation.language.label(),
                artwork.id
            );
            Ok(translation)
        }
        Err(e) => {
            if let Some(path) = &audio_narration {
                if let Err(cleanup) = media.delete(path).await {
                    warn!("Failed to remove orphaned narration {}: {}", path, cleanup);
                }
            }
            if e.is_conflict() {
                Err(ServiceError::rejected(
                    crate::forms::NON_FIELD_ERRORS,
                    MSG_DUPLICATE_TRANSLATION,
                ))
            } else {
                Err(e.into())
            }
        }
    }
}

/// Context of an artwork's translations page around the given form.
pub async fn translation_page<R>(
    repo: &R,
    media: &MediaStorage,
    artwork: &Artwork,
    form: BoundForm,
) -> ServiceResult<TranslationPageData>
where
    R: FullRepository + ?Sized,
{
    Ok(TranslationPageData {
        artwork: ArtworkSummary::from_artwork(artwork, media),
        translations: repo.list_translations(artwork.id).await?,
        form,
    })
}

/// Run a geofence check of a visitor position against an artwork.
///
/// `latitude` / `longitude` are read from the submitted data; missing values
/// yield a denied result, malformed values are form errors.
pub fn check_artwork_geofence(
    artwork: &Artwork,
    data: &FormData,
) -> Result<GeofenceCheckData, FormErrors> {
    let mut cleaner = FieldCleaner::new(data);
    let latitude = cleaner.decimal("latitude", false);
    let longitude = cleaner.decimal("longitude", false);
    cleaner.finish()?;

    let result = check_geofence(
        latitude,
        longitude,
        artwork.latitude,
        artwork.longitude,
        f64::from(artwork.geofence_radius_meters),
    );
    let distance_message = result.distance.map(get_distance_message);
    Ok(GeofenceCheckData {
        artwork_id: artwork.id,
        radius_meters: artwork.geofence_radius_meters,
        result,
        distance_message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{ArtworkRepository, MuseumRepository};
    use crate::db::LocalRepository;
    use crate::geolocation::{MSG_ACCESS_GRANTED, MSG_MISSING_LOCATION};
    use crate::models::{ArtworkCategory, Language, NewMuseum, NewStaff, StaffRole};

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

    async fn register(repo: &LocalRepository, museum: &str, username: &str) -> MuseumStaff {
        let (_, staff) = repo
            .register_museum(
                NewMuseum {
                    name: museum.to_string(),
                    description: None,
                    location: None,
                    contact_email: "info@museum.org".to_string(),
                    website: None,
                    logo: None,
                },
                NewStaff {
                    username: username.to_string(),
                    email: format!("{}@museum.org", username),
                    first_name: "Anna".to_string(),
                    last_name: "Curator".to_string(),
                    phone: None,
                    password_hash: String::new(),
                    role: StaffRole::Admin,
                },
            )
            .await
            .unwrap();
        staff
    }

    fn upload(title: &str) -> ArtworkUpload {
        ArtworkUpload {
            title: title.to_string(),
            description: "Tempera on panel".to_string(),
            category: ArtworkCategory::Painting,
            year_created: Some(1482),
            medium: None,
            dimensions: None,
            gallery_location: Some("Botticelli Room".to_string()),
            room_number: Some("10".to_string()),
            image: None,
            audio_narration: None,
            historical_context: None,
            latitude: Some(43.7678),
            longitude: Some(11.2553),
            geofence_radius_meters: 50,
            tags: vec!["renaissance".to_string()],
            artist_name: Some("Sandro Botticelli".to_string()),
        }
    }

    #[tokio::test]
    async fn test_upload_creates_artist_media_and_qr() {
        let repo = LocalRepository::new();
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStorage::new(dir.path(), "/media/");
        let staff = register(&repo, "Uffizi", "anna").await;

        let mut data = upload("Primavera");
        data.image = Some(UploadedFile::new("primavera.png", PNG_MAGIC.to_vec()));
        data.audio_narration = Some(UploadedFile::new("tour.mp3", b"ID3".to_vec()));
        let artwork = upload_artwork(&repo, &media, &staff, data).await.unwrap();

        assert_eq!(artwork.museum_id, staff.museum_id);
        assert_eq!(artwork.created_by, Some(staff.id));
        assert_eq!(artwork.description.as_deref(), Some("Tempera on panel"));
        assert_eq!(artwork.image.as_deref(), Some("artworks/images/primavera.png"));
        assert_eq!(artwork.audio_narration.as_deref(), Some("artworks/audio/tour.mp3"));
        let qr = artwork.qr_code.clone().unwrap();
        assert_eq!(qr, format!("qr_codes/qr_{}.png", artwork.id));
        assert!(media.path(&qr).exists());

        assert_eq!(artist_names(&repo).await.unwrap(), vec!["Sandro Botticelli"]);
        let second = upload_artwork(&repo, &media, &staff, upload("Pallas and the Centaur"))
            .await
            .unwrap();
        assert_eq!(second.artist_id, artwork.artist_id);
        assert_eq!(repo.list_artists().await.unwrap().len(), 1);
    }

    fn with_media(title: &str) -> ArtworkUpload {
        let mut data = upload(title);
        data.image = Some(UploadedFile::new("primavera.png", PNG_MAGIC.to_vec()));
        data.audio_narration = Some(UploadedFile::new("tour.mp3", b"ID3".to_vec()));
        data
    }

    fn stored_files(root: &std::path::Path, dir: &str) -> usize {
        std::fs::read_dir(root.join(dir))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_failed_store_removes_uploaded_media() {
        let repo = LocalRepository::new();
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStorage::new(dir.path(), "/media/");
        let staff = register(&repo, "Uffizi", "anna").await;

        // The museum lookup still succeeds; `store_artwork` is the first write.
        repo.set_read_only(true);
        let mut data = with_media("Primavera");
        data.artist_name = None;
        let err = upload_artwork(&repo, &media, &staff, data).await.unwrap_err();
        assert!(matches!(err, ServiceError::Repository(_)));
        repo.set_read_only(false);

        assert_eq!(repo.artwork_count(), 0);
        assert_eq!(stored_files(dir.path(), ARTWORK_IMAGE_DIR), 0);
        assert_eq!(stored_files(dir.path(), ARTWORK_AUDIO_DIR), 0);

        // Nothing written at all when the repository is down.
        repo.set_healthy(false);
        assert!(upload_artwork(&repo, &media, &staff, with_media("Primavera"))
            .await
            .is_err());
        assert_eq!(stored_files(dir.path(), ARTWORK_IMAGE_DIR), 0);
    }

    #[tokio::test]
    async fn test_failed_audio_save_removes_image() {
        let repo = LocalRepository::new();
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStorage::new(dir.path(), "/media/");
        let staff = register(&repo, "Uffizi", "anna").await;
        std::fs::create_dir_all(dir.path().join("artworks")).unwrap();
        std::fs::write(dir.path().join(ARTWORK_AUDIO_DIR), b"in the way").unwrap();

        let err = upload_artwork(&repo, &media, &staff, with_media("Primavera"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(repo.artwork_count(), 0);
        assert_eq!(stored_files(dir.path(), ARTWORK_IMAGE_DIR), 0);
    }

    #[tokio::test]
    async fn test_failed_qr_code_rolls_back_artwork() {
        let repo = LocalRepository::new();
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStorage::new(dir.path(), "/media/");
        let staff = register(&repo, "Uffizi", "anna").await;

        // A plain file where the QR code directory belongs.
        std::fs::write(dir.path().join(QR_CODE_DIR), b"in the way").unwrap();

        let err = upload_artwork(&repo, &media, &staff, with_media("Primavera"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(repo.artwork_count(), 0);
        assert_eq!(repo.count_artworks(staff.museum_id, None).await.unwrap(), 0);
        assert_eq!(stored_files(dir.path(), ARTWORK_IMAGE_DIR), 0);
        assert_eq!(stored_files(dir.path(), ARTWORK_AUDIO_DIR), 0);
    }

    #[tokio::test]
    async fn test_artworks_of_other_museums_are_hidden() {
        let repo = LocalRepository::new();
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStorage::new(dir.path(), "/media/");
        let owner = register(&repo, "Uffizi", "anna").await;
        let other = register(&repo, "Louvre", "jean").await;
        let artwork = upload_artwork(&repo, &media, &owner, upload("Primavera"))
            .await
            .unwrap();

        assert!(museum_artwork(&repo, &owner, artwork.id).await.is_ok());
        let err = museum_artwork(&repo, &other, artwork.id).await.unwrap_err();
        assert!(err.is_not_found());
        let err = museum_artwork(&repo, &owner, ArtworkId::generate()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_translation_language_is_unique() {
        let repo = LocalRepository::new();
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStorage::new(dir.path(), "/media/");
        let staff = register(&repo, "Uffizi", "anna").await;
        let artwork = upload_artwork(&repo, &media, &staff, upload("Primavera"))
            .await
            .unwrap();

        let submission = TranslationSubmission {
            language: Language::Italian,
            title: "Primavera".to_string(),
            description: Some("Tempera su tavola".to_string()),
            historical_context: None,
            audio_narration: None,
        };
        let stored = add_translation(&repo, &media, &artwork, submission.clone())
            .await
            .unwrap();
        assert_eq!(stored.language, Language::Italian);

        let err = add_translation(&repo, &media, &artwork, submission).await.unwrap_err();
        match err {
            ServiceError::Rejected(errors) => {
                assert_eq!(errors.non_field(), [MSG_DUPLICATE_TRANSLATION.to_string()])
            }
            other => panic!("unexpected error {:?}", other),
        }

        let page = translation_page(&repo, &media, &artwork, BoundForm::unbound(Vec::new()))
            .await
            .unwrap();
        assert_eq!(page.translations.len(), 1);
        assert_eq!(page.artwork.id, artwork.id);
    }

    #[tokio::test]
    async fn test_geofence_check_against_stored_location() {
        let repo = LocalRepository::new();
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStorage::new(dir.path(), "/media/");
        let staff = register(&repo, "Uffizi", "anna").await;
        let artwork = upload_artwork(&repo, &media, &staff, upload("Primavera"))
            .await
            .unwrap();

        let at_artwork = FormData::new()
            .with("latitude", "43.7678")
            .with("longitude", "11.2553");
        let data = check_artwork_geofence(&artwork, &at_artwork).unwrap();
        assert!(data.result.allowed);
        assert_eq!(data.result.message, MSG_ACCESS_GRANTED);
        assert_eq!(
            data.distance_message.as_deref(),
            Some("You're very close! Look around.")
        );
        assert_eq!(data.radius_meters, 50);

        let far = FormData::new()
            .with("latitude", "43.7731")
            .with("longitude", "11.2560");
        let data = check_artwork_geofence(&artwork, &far).unwrap();
        assert!(!data.result.allowed);
        assert!(data.result.message.starts_with("You are "));
        assert!(data.distance_message.is_some());

        let data = check_artwork_geofence(&artwork, &FormData::new()).unwrap();
        assert_eq!(data.result.message, MSG_MISSING_LOCATION);
        assert_eq!(data.distance_message, None);

        let errors = check_artwork_geofence(&artwork, &FormData::new().with("latitude", "x"))
            .unwrap_err();
        assert!(errors.has("latitude"));
    }
}
