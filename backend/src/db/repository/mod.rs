//! Repository traits for abstracting persistence.
//!
//! The traits are split by aggregate: [`MuseumRepository`] owns museums and
//! staff accounts, [`ArtworkRepository`] owns artworks, artists and
//! translations. [`FullRepository`] combines both and is what the HTTP layer
//! holds.

pub mod artwork;
pub mod error;
pub mod museum;

pub use artwork::ArtworkRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use museum::MuseumRepository;

/// Every repository trait the application needs.
pub trait FullRepository: MuseumRepository + ArtworkRepository {}

impl<T> FullRepository for T where T: MuseumRepository + ArtworkRepository {}
