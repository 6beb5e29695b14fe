//! In-memory local repository implementation.
//!
//! All data lives in `HashMap`s behind a single `parking_lot::RwLock`, which
//! makes every trait method atomic: a registration either stores both the
//! museum and its staff account or nothing at all.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{ArtistId, ArtworkId, MuseumId, StaffId, TranslationId};
use crate::db::repository::*;
use crate::models::*;

/// In-memory local repository.
///
/// Cloning is cheap and clones share the same data.
///
/// # Example
/// ```
/// use artscope::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.museum_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    museums: HashMap<MuseumId, Museum>,
    staff: HashMap<StaffId, MuseumStaff>,
    artworks: HashMap<ArtworkId, Artwork>,
    artists: HashMap<ArtistId, Artist>,
    translations: HashMap<TranslationId, ArtworkTranslation>,
    /// Insertion order of artworks, breaks ties between equal timestamps
    artwork_seq: HashMap<ArtworkId, u64>,

    // ID counters
    next_museum_id: i64,
    next_staff_id: i64,
    next_artist_id: i64,
    next_translation_id: i64,
    next_artwork_seq: u64,

    // Connection health
    is_healthy: bool,
    is_read_only: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            museums: HashMap::new(),
            staff: HashMap::new(),
            artworks: HashMap::new(),
            artists: HashMap::new(),
            translations: HashMap::new(),
            artwork_seq: HashMap::new(),
            next_museum_id: 1,
            next_staff_id: 1,
            next_artist_id: 1,
            next_translation_id: 1,
            next_artwork_seq: 0,
            is_healthy: true,
            is_read_only: false,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Reject writes while reads keep working, for testing failures part way
    /// through a multi-step operation.
    pub fn set_read_only(&self, read_only: bool) {
        self.data.write().is_read_only = read_only;
    }

    /// Flip the display flag of an artwork.
    pub fn set_on_display(&self, artwork_id: ArtworkId, on_display: bool) -> RepositoryResult<()> {
        let mut data = self.data.write();
        let artwork = data.artworks.get_mut(&artwork_id).ok_or_else(|| {
            RepositoryError::not_found(format!("Artwork {} not found", artwork_id))
        })?;
        artwork.is_on_display = on_display;
        Ok(())
    }

    /// Deactivate or reactivate a staff account.
    pub fn set_staff_active(&self, staff_id: StaffId, active: bool) -> RepositoryResult<()> {
        let mut data = self.data.write();
        let staff = data
            .staff
            .get_mut(&staff_id)
            .ok_or_else(|| RepositoryError::not_found(format!("Staff {} not found", staff_id)))?;
        staff.is_active = active;
        Ok(())
    }

    /// Number of stored museums.
    pub fn museum_count(&self) -> usize {
        self.data.read().museums.len()
    }

    /// Number of stored staff accounts.
    pub fn staff_count(&self) -> usize {
        self.data.read().staff.len()
    }

    /// Number of stored artworks across all museums.
    pub fn artwork_count(&self) -> usize {
        self.data.read().artworks.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }

    fn check_writable(&self) -> RepositoryResult<()> {
        self.check_health()?;
        if self.data.read().is_read_only {
            return Err(RepositoryError::connection("Database is read-only"));
        }
        Ok(())
    }
}

fn username_taken(data: &LocalData, username: &str) -> bool {
    data.staff.values().any(|s| s.username == username)
}

#[async_trait]
impl MuseumRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn register_museum(
        &self,
        museum: NewMuseum,
        staff: NewStaff,
    ) -> RepositoryResult<(Museum, MuseumStaff)> {
        self.check_writable()?;
        let mut data = self.data.write();

        if username_taken(&data, &staff.username) {
            return Err(RepositoryError::conflict_with_context(
                format!("A user with username '{}' already exists", staff.username),
                ErrorContext::new("register_museum")
                    .with_entity("staff")
                    .with_entity_id(&staff.username),
            ));
        }

        let now = Utc::now();
        let museum_id = MuseumId::new(data.next_museum_id);
        data.next_museum_id += 1;
        let staff_id = StaffId::new(data.next_staff_id);
        data.next_staff_id += 1;

        let museum = Museum {
            id: museum_id,
            name: museum.name,
            description: museum.description,
            location: museum.location,
            contact_email: museum.contact_email,
            website: museum.website,
            logo: museum.logo,
            created_at: now,
        };
        let staff = MuseumStaff {
            id: staff_id,
            museum_id,
            username: staff.username,
            email: staff.email,
            first_name: staff.first_name,
            last_name: staff.last_name,
            phone: staff.phone,
            password_hash: staff.password_hash,
            role: staff.role,
            is_active: true,
            date_joined: now,
            last_login: None,
        };

        data.museums.insert(museum_id, museum.clone());
        data.staff.insert(staff_id, staff.clone());
        Ok((museum, staff))
    }

    async fn get_museum(&self, museum_id: MuseumId) -> RepositoryResult<Museum> {
        self.check_health()?;
        self.data
            .read()
            .museums
            .get(&museum_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Museum {} not found", museum_id),
                    ErrorContext::new("get_museum").with_entity("museum"),
                )
            })
    }

    async fn get_staff(&self, staff_id: StaffId) -> RepositoryResult<MuseumStaff> {
        self.check_health()?;
        self.data.read().staff.get(&staff_id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Staff {} not found", staff_id),
                ErrorContext::new("get_staff").with_entity("staff"),
            )
        })
    }

    async fn find_staff_by_username(
        &self,
        username: &str,
    ) -> RepositoryResult<Option<MuseumStaff>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .staff
            .values()
            .find(|s| s.username == username)
            .cloned())
    }

    async fn record_login(&self, staff_id: StaffId, at: DateTime<Utc>) -> RepositoryResult<()> {
        self.check_writable()?;
        let mut data = self.data.write();
        let staff = data
            .staff
            .get_mut(&staff_id)
            .ok_or_else(|| RepositoryError::not_found(format!("Staff {} not found", staff_id)))?;
        staff.last_login = Some(at);
        Ok(())
    }
}

#[async_trait]
impl ArtworkRepository for LocalRepository {
    async fn store_artwork(&self, artwork: NewArtwork) -> RepositoryResult<Artwork> {
        self.check_writable()?;
        let mut data = self.data.write();

        if !data.museums.contains_key(&artwork.museum_id) {
            return Err(RepositoryError::not_found_with_context(
                format!("Museum {} not found", artwork.museum_id),
                ErrorContext::new("store_artwork").with_entity("museum"),
            ));
        }

        let stored = Artwork {
            id: ArtworkId::generate(),
            museum_id: artwork.museum_id,
            artist_id: artwork.artist_id,
            title: artwork.title,
            description: artwork.description,
            category: artwork.category,
            year_created: artwork.year_created,
            medium: artwork.medium,
            dimensions: artwork.dimensions,
            gallery_location: artwork.gallery_location,
            room_number: artwork.room_number,
            image: artwork.image,
            audio_narration: artwork.audio_narration,
            historical_context: artwork.historical_context,
            latitude: artwork.latitude,
            longitude: artwork.longitude,
            geofence_radius_meters: artwork.geofence_radius_meters,
            tags: artwork.tags,
            is_on_display: true,
            qr_code: None,
            created_by: artwork.created_by,
            created_at: Utc::now(),
        };
        let seq = data.next_artwork_seq;
        data.next_artwork_seq += 1;
        data.artwork_seq.insert(stored.id, seq);
        data.artworks.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_artwork(&self, artwork_id: ArtworkId) -> RepositoryResult<Artwork> {
        self.check_health()?;
        self.data
            .read()
            .artworks
            .get(&artwork_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Artwork {} not found", artwork_id),
                    ErrorContext::new("get_artwork").with_entity("artwork"),
                )
            })
    }

    async fn set_artwork_qr_code(
        &self,
        artwork_id: ArtworkId,
        qr_code_path: String,
    ) -> RepositoryResult<Artwork> {
        self.check_writable()?;
        let mut data = self.data.write();
        let artwork = data.artworks.get_mut(&artwork_id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Artwork {} not found", artwork_id),
                ErrorContext::new("set_artwork_qr_code").with_entity("artwork"),
            )
        })?;
        artwork.qr_code = Some(qr_code_path);
        Ok(artwork.clone())
    }

    async fn delete_artwork(&self, artwork_id: ArtworkId) -> RepositoryResult<()> {
        self.check_writable()?;
        let mut data = self.data.write();
        if data.artworks.remove(&artwork_id).is_none() {
            return Err(RepositoryError::not_found_with_context(
                format!("Artwork {} not found", artwork_id),
                ErrorContext::new("delete_artwork").with_entity("artwork"),
            ));
        }
        data.artwork_seq.remove(&artwork_id);
        data.translations.retain(|_, t| t.artwork_id != artwork_id);
        Ok(())
    }

    async fn list_artworks(
        &self,
        museum_id: MuseumId,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<Artwork>> {
        self.check_health()?;
        let data = self.data.read();
        let mut artworks: Vec<Artwork> = data
            .artworks
            .values()
            .filter(|a| a.museum_id == museum_id)
            .cloned()
            .collect();
        let seq = |id: &ArtworkId| data.artwork_seq.get(id).copied().unwrap_or_default();
        artworks.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| seq(&b.id).cmp(&seq(&a.id)))
        });
        if let Some(limit) = limit {
            artworks.truncate(limit);
        }
        Ok(artworks)
    }

    async fn count_artworks(
        &self,
        museum_id: MuseumId,
        on_display: Option<bool>,
    ) -> RepositoryResult<usize> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .artworks
            .values()
            .filter(|a| a.museum_id == museum_id)
            .filter(|a| on_display.map_or(true, |flag| a.is_on_display == flag))
            .count())
    }

    async fn get_or_create_artist(&self, name: &str) -> RepositoryResult<Artist> {
        self.check_writable()?;
        let mut data = self.data.write();
        if let Some(existing) = data.artists.values().find(|a| a.name == name) {
            return Ok(existing.clone());
        }
        let artist = Artist {
            id: ArtistId::new(data.next_artist_id),
            name: name.to_string(),
        };
        data.next_artist_id += 1;
        data.artists.insert(artist.id, artist.clone());
        Ok(artist)
    }

    async fn list_artists(&self) -> RepositoryResult<Vec<Artist>> {
        self.check_health()?;
        let mut artists: Vec<Artist> = self.data.read().artists.values().cloned().collect();
        artists.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(artists)
    }

    async fn store_translation(
        &self,
        translation: NewTranslation,
    ) -> RepositoryResult<ArtworkTranslation> {
        self.check_writable()?;
        let mut data = self.data.write();

        if !data.artworks.contains_key(&translation.artwork_id) {
            return Err(RepositoryError::not_found_with_context(
                format!("Artwork {} not found", translation.artwork_id),
                ErrorContext::new("store_translation").with_entity("artwork"),
            ));
        }
        let duplicate = data.translations.values().any(|t| {
            t.artwork_id == translation.artwork_id && t.language == translation.language
        });
        if duplicate {
            return Err(RepositoryError::conflict_with_context(
                format!(
                    "Artwork {} already has a '{}' translation",
                    translation.artwork_id, translation.language
                ),
                ErrorContext::new("store_translation")
                    .with_entity("translation")
                    .with_entity_id(translation.artwork_id),
            ));
        }

        let stored = ArtworkTranslation {
            id: TranslationId::new(data.next_translation_id),
            artwork_id: translation.artwork_id,
            language: translation.language,
            title: translation.title,
            description: translation.description,
            historical_context: translation.historical_context,
            audio_narration: translation.audio_narration,
        };
        data.next_translation_id += 1;
        data.translations.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_translations(
        &self,
        artwork_id: ArtworkId,
    ) -> RepositoryResult<Vec<ArtworkTranslation>> {
        self.check_health()?;
        let mut translations: Vec<ArtworkTranslation> = self
            .data
            .read()
            .translations
            .values()
            .filter(|t| t.artwork_id == artwork_id)
            .cloned()
            .collect();
        translations.sort_by(|a, b| a.language.as_str().cmp(b.language.as_str()));
        Ok(translations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_museum(name: &str) -> NewMuseum {
        NewMuseum {
            name: name.to_string(),
            description: None,
            location: Some("Turin, Italy".to_string()),
            contact_email: "info@museum.org".to_string(),
            website: None,
            logo: None,
        }
    }

    fn new_staff(username: &str) -> NewStaff {
        NewStaff {
            username: username.to_string(),
            email: format!("{}@museum.org", username),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: None,
            password_hash: "hash".to_string(),
            role: StaffRole::Admin,
        }
    }

    fn new_artwork(museum_id: MuseumId, title: &str) -> NewArtwork {
        NewArtwork {
            museum_id,
            artist_id: None,
            title: title.to_string(),
            description: None,
            category: ArtworkCategory::Painting,
            year_created: Some(1503),
            medium: None,
            dimensions: None,
            gallery_location: None,
            room_number: None,
            image: None,
            audio_narration: None,
            historical_context: None,
            latitude: Some(45.07),
            longitude: Some(7.68),
            geofence_radius_meters: DEFAULT_GEOFENCE_RADIUS_METERS,
            tags: vec!["renaissance".to_string()],
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_register_assigns_ids_and_links_staff() {
        let repo = LocalRepository::new();
        let (museum, staff) = repo
            .register_museum(new_museum("Egizio"), new_staff("ada"))
            .await
            .unwrap();
        assert_eq!(museum.id, MuseumId::new(1));
        assert_eq!(staff.museum_id, museum.id);
        assert!(staff.is_active);
        assert!(staff.last_login.is_none());
    }

    #[tokio::test]
    async fn test_register_duplicate_username_stores_nothing() {
        let repo = LocalRepository::new();
        repo.register_museum(new_museum("First"), new_staff("ada"))
            .await
            .unwrap();

        let err = repo
            .register_museum(new_museum("Second"), new_staff("ada"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.museum_count(), 1);
        assert_eq!(repo.staff_count(), 1);
    }

    #[tokio::test]
    async fn test_unhealthy_repository_rejects_operations() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo
            .register_museum(new_museum("Egizio"), new_staff("ada"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
    }

    #[tokio::test]
    async fn test_read_only_repository_rejects_writes() {
        let repo = LocalRepository::new();
        let (museum, _) = repo
            .register_museum(new_museum("Egizio"), new_staff("ada"))
            .await
            .unwrap();
        repo.set_read_only(true);
        assert!(repo.get_museum(museum.id).await.is_ok());
        let err = repo
            .store_artwork(new_artwork(museum.id, "Stele"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
        repo.set_read_only(false);
        assert!(repo.store_artwork(new_artwork(museum.id, "Stele")).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_artworks_newest_first_with_limit() {
        let repo = LocalRepository::new();
        let (museum, _) = repo
            .register_museum(new_museum("Egizio"), new_staff("ada"))
            .await
            .unwrap();
        for i in 0..3 {
            repo.store_artwork(new_artwork(museum.id, &format!("Work {}", i)))
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let latest = repo.list_artworks(museum.id, Some(2)).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].title, "Work 2");
        assert_eq!(latest[1].title, "Work 1");
    }

    #[tokio::test]
    async fn test_count_artworks_by_display_flag() {
        let repo = LocalRepository::new();
        let (museum, _) = repo
            .register_museum(new_museum("Egizio"), new_staff("ada"))
            .await
            .unwrap();
        let a = repo.store_artwork(new_artwork(museum.id, "A")).await.unwrap();
        repo.store_artwork(new_artwork(museum.id, "B")).await.unwrap();
        repo.set_on_display(a.id, false).unwrap();

        assert_eq!(repo.count_artworks(museum.id, None).await.unwrap(), 2);
        assert_eq!(repo.count_artworks(museum.id, Some(true)).await.unwrap(), 1);
        assert_eq!(repo.count_artworks(MuseumId::new(99), None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_artwork_requires_museum() {
        let repo = LocalRepository::new();
        let err = repo
            .store_artwork(new_artwork(MuseumId::new(5), "Orphan"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_or_create_artist_is_idempotent() {
        let repo = LocalRepository::new();
        let first = repo.get_or_create_artist("Caravaggio").await.unwrap();
        let again = repo.get_or_create_artist("Caravaggio").await.unwrap();
        let other = repo.get_or_create_artist("Bernini").await.unwrap();
        assert_eq!(first.id, again.id);
        assert_ne!(first.id, other.id);

        let names: Vec<String> = repo
            .list_artists()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Bernini", "Caravaggio"]);
    }

    #[tokio::test]
    async fn test_translation_unique_per_language() {
        let repo = LocalRepository::new();
        let (museum, _) = repo
            .register_museum(new_museum("Egizio"), new_staff("ada"))
            .await
            .unwrap();
        let artwork = repo.store_artwork(new_artwork(museum.id, "Stele")).await.unwrap();

        let translation = NewTranslation {
            artwork_id: artwork.id,
            language: Language::French,
            title: "Stèle".to_string(),
            description: None,
            historical_context: None,
            audio_narration: None,
        };
        repo.store_translation(translation.clone()).await.unwrap();
        let err = repo.store_translation(translation.clone()).await.unwrap_err();
        assert!(err.is_conflict());

        let german = NewTranslation {
            language: Language::German,
            title: "Stele".to_string(),
            ..translation
        };
        repo.store_translation(german).await.unwrap();

        let stored = repo.list_translations(artwork.id).await.unwrap();
        let languages: Vec<Language> = stored.iter().map(|t| t.language).collect();
        assert_eq!(languages, vec![Language::German, Language::French]);
    }

    #[tokio::test]
    async fn test_delete_artwork_drops_translations() {
        let repo = LocalRepository::new();
        let (museum, _) = repo
            .register_museum(new_museum("Egizio"), new_staff("ada"))
            .await
            .unwrap();
        let artwork = repo.store_artwork(new_artwork(museum.id, "Stele")).await.unwrap();
        let kept = repo.store_artwork(new_artwork(museum.id, "Papyrus")).await.unwrap();
        repo.store_translation(NewTranslation {
            artwork_id: artwork.id,
            language: Language::French,
            title: "Stèle".to_string(),
            description: None,
            historical_context: None,
            audio_narration: None,
        })
        .await
        .unwrap();

        repo.delete_artwork(artwork.id).await.unwrap();
        assert!(repo.get_artwork(artwork.id).await.unwrap_err().is_not_found());
        assert!(repo.list_translations(artwork.id).await.unwrap().is_empty());
        assert_eq!(repo.artwork_count(), 1);
        assert_eq!(repo.list_artworks(museum.id, None).await.unwrap()[0].id, kept.id);

        let err = repo.delete_artwork(artwork.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_set_qr_code_and_record_login() {
        let repo = LocalRepository::new();
        let (museum, staff) = repo
            .register_museum(new_museum("Egizio"), new_staff("ada"))
            .await
            .unwrap();
        let artwork = repo.store_artwork(new_artwork(museum.id, "Stele")).await.unwrap();

        let updated = repo
            .set_artwork_qr_code(artwork.id, "qr_codes/qr.png".to_string())
            .await
            .unwrap();
        assert_eq!(updated.qr_code.as_deref(), Some("qr_codes/qr.png"));

        let now = Utc::now();
        repo.record_login(staff.id, now).await.unwrap();
        assert_eq!(repo.get_staff(staff.id).await.unwrap().last_login, Some(now));
    }
}
