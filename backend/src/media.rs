//! File storage for uploads and generated QR codes.
//!
//! Files are written below a media root and addressed by their path relative
//! to it (`qr_codes/qr_<id>.png`); the HTTP layer serves the root read-only
//! under the configured URL prefix.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

pub const MUSEUM_LOGO_DIR: &str = "museum_logos";
pub const ARTWORK_IMAGE_DIR: &str = "artworks/images";
pub const ARTWORK_AUDIO_DIR: &str = "artworks/audio";
pub const TRANSLATION_AUDIO_DIR: &str = "translations/audio";
pub const QR_CODE_DIR: &str = "qr_codes";

const MAX_NAME_ATTEMPTS: usize = 16;

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let mut url_prefix = url_prefix.into();
        if !url_prefix.ends_with('/') {
            url_prefix.push('/');
        }
        Self {
            root: root.into(),
            url_prefix,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Public URL of a stored file.
    pub fn url(&self, relative: &str) -> String {
        format!("{}{}", self.url_prefix, relative.trim_start_matches('/'))
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Write `bytes` under `dir` and return the stored path relative to the
    /// media root.
    ///
    /// The client name is reduced to a safe base name. An existing file is
    /// never overwritten: a short random suffix is added to the stem instead.
    pub async fn save(&self, dir: &str, filename: &str, bytes: &[u8]) -> io::Result<String> {
        let target_dir = self.root.join(dir);
        fs::create_dir_all(&target_dir).await?;

        let name = sanitize_filename(filename);
        let mut candidate = name.clone();
        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = target_dir.join(&candidate);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    let relative = format!("{}/{}", dir.trim_matches('/'), candidate);
                    tracing::debug!("Stored {} ({} bytes)", relative, bytes.len());
                    return Ok(relative);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    candidate = with_random_suffix(&name);
                }
                Err(e) => return Err(e),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Could not find a free name for '{}' in {}", name, dir),
        ))
    }

    /// Remove a stored file, ignoring files that are already gone.
    pub async fn delete(&self, relative: &str) -> io::Result<()> {
        match fs::remove_file(self.path(relative)).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Base name of a client file name with anything but letters, digits, `.`,
/// `-` and `_` replaced by `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

fn with_random_suffix(name: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(7).collect();
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, suffix, ext),
        _ => format!("{}_{}", name, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("venus.jpg"), "venus.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\photos\\la nascita.png"), "la_nascita.png");
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
    }

    #[test]
    fn test_random_suffix_keeps_extension() {
        let name = with_random_suffix("venus.jpg");
        assert!(name.starts_with("venus_"));
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), "venus_.jpg".len() + 7);
    }

    #[test]
    fn test_url() {
        let storage = MediaStorage::new("/srv/media", "/media");
        assert_eq!(storage.url_prefix(), "/media/");
        assert_eq!(storage.url("qr_codes/qr_1.png"), "/media/qr_codes/qr_1.png");
    }

    #[tokio::test]
    async fn test_save_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "/media/");

        let first = storage.save(QR_CODE_DIR, "qr_a.png", b"one").await.unwrap();
        let second = storage.save(QR_CODE_DIR, "qr_a.png", b"two").await.unwrap();
        assert_eq!(first, "qr_codes/qr_a.png");
        assert_ne!(first, second);
        assert_eq!(std::fs::read(storage.path(&first)).unwrap(), b"one");
        assert_eq!(std::fs::read(storage.path(&second)).unwrap(), b"two");

        storage.delete(&second).await.unwrap();
        storage.delete(&second).await.unwrap();
        assert!(!storage.path(&second).exists());
    }
}
