//! Artwork, artist and translation persistence.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{ArtworkId, MuseumId};
use crate::models::{Artist, Artwork, ArtworkTranslation, NewArtwork, NewTranslation};

/// Repository trait for the artwork catalogue.
#[async_trait]
pub trait ArtworkRepository: Send + Sync {
    /// Store a new artwork and return it with its generated ID.
    async fn store_artwork(&self, artwork: NewArtwork) -> RepositoryResult<Artwork>;

    /// Retrieve an artwork by ID.
    async fn get_artwork(&self, artwork_id: ArtworkId) -> RepositoryResult<Artwork>;

    /// Attach the media path of a generated QR code to an artwork.
    async fn set_artwork_qr_code(
        &self,
        artwork_id: ArtworkId,
        qr_code_path: String,
    ) -> RepositoryResult<Artwork>;

    /// Remove an artwork together with its translations.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the artwork does not exist
    async fn delete_artwork(&self, artwork_id: ArtworkId) -> RepositoryResult<()>;

    /// List the artworks of a museum, newest first.
    ///
    /// # Arguments
    /// * `museum_id` - Owning museum
    /// * `limit` - Maximum number of artworks returned; `None` for all
    async fn list_artworks(
        &self,
        museum_id: MuseumId,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<Artwork>>;

    /// Count the artworks of a museum.
    ///
    /// # Arguments
    /// * `on_display` - When set, count only artworks whose display flag matches
    async fn count_artworks(
        &self,
        museum_id: MuseumId,
        on_display: Option<bool>,
    ) -> RepositoryResult<usize>;

    /// Return the artist with this exact name, creating it when missing.
    async fn get_or_create_artist(&self, name: &str) -> RepositoryResult<Artist>;

    /// List all known artists ordered by name.
    async fn list_artists(&self) -> RepositoryResult<Vec<Artist>>;

    /// Store a translation.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the artwork does not exist
    /// * `Err(RepositoryError::Conflict)` - If the artwork already has a
    ///   translation in that language
    async fn store_translation(
        &self,
        translation: NewTranslation,
    ) -> RepositoryResult<ArtworkTranslation>;

    /// List the translations of an artwork in language order.
    async fn list_translations(
        &self,
        artwork_id: ArtworkId,
    ) -> RepositoryResult<Vec<ArtworkTranslation>>;
}
