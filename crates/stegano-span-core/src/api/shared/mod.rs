use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::cipher::PasswordCipher;
use crate::error::SteganoError;
use crate::locks::ImageLocks;
use crate::media::png_images;
use crate::result::Result;

mod password;

pub use password::*;

/// The carrier images of one api call, given one by one or as a whole folder
#[derive(Debug, Default, Clone)]
pub(crate) struct ImageSelection {
    files: Vec<PathBuf>,
    folder: Option<PathBuf>,
}

impl ImageSelection {
    pub fn add(&mut self, image: impl AsRef<Path>) {
        self.files.push(image.as_ref().to_path_buf());
    }

    pub fn set_folder(&mut self, folder: impl AsRef<Path>) {
        self.folder = Some(folder.as_ref().to_path_buf());
    }

    /// Explicit files first, then the PNG files of the folder sorted by name.
    ///
    /// A file selected more than once is kept at its first position only, two copies of one
    /// file would be filled as two images and the later save would wipe out the earlier one.
    pub fn resolve(&self) -> Result<Vec<PathBuf>> {
        let mut candidates = self.files.clone();
        if let Some(folder) = &self.folder {
            candidates.extend(png_images(folder)?);
        }

        let mut seen = HashSet::new();
        let mut images = Vec::with_capacity(candidates.len());
        for image in candidates {
            if seen.insert(identity(&image)?) {
                images.push(image);
            } else {
                debug!("Skipping {image:?}, it is selected already");
            }
        }
        if images.is_empty() {
            return Err(SteganoError::MissingImages);
        }

        Ok(images)
    }
}

/// the canonical path of an existing file, the absolute one otherwise
fn identity(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(canonical) => Ok(canonical),
        Err(_) => std::path::absolute(path).map_err(|source| SteganoError::ReadError { source }),
    }
}

pub(crate) fn cipher_for(password: &Password) -> Result<Option<PasswordCipher>> {
    password.as_deref().map(PasswordCipher::new).transpose()
}

/// runs `f` under the given locks, or right away without any
pub(crate) fn with_write_locks<T>(
    locks: Option<&Arc<ImageLocks>>,
    images: &[PathBuf],
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    match locks {
        Some(locks) => locks.with_write_all(images, f)?,
        None => f(),
    }
}

pub(crate) fn with_read_locks<T>(
    locks: Option<&Arc<ImageLocks>>,
    images: &[PathBuf],
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    match locks {
        Some(locks) => locks.with_read_all(images, f)?,
        None => f(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_require_at_least_one_image() {
        assert!(matches!(
            ImageSelection::default().resolve(),
            Err(SteganoError::MissingImages)
        ));
    }

    #[test]
    fn should_list_explicit_images_before_the_folder() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("b.png"), b"")?;
        std::fs::write(dir.path().join("a.png"), b"")?;

        let mut selection = ImageSelection::default();
        selection.add("z.png");
        selection.set_folder(dir.path());

        assert_eq!(
            selection.resolve()?,
            vec![
                PathBuf::from("z.png"),
                dir.path().join("a.png"),
                dir.path().join("b.png")
            ]
        );

        Ok(())
    }

    #[test]
    fn should_select_a_file_only_once() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("a.png"), b"")?;
        std::fs::write(dir.path().join("b.png"), b"")?;

        let mut selection = ImageSelection::default();
        selection.add(dir.path().join("b.png"));
        selection.add(dir.path().join(".").join("b.png"));
        selection.add("missing.png");
        selection.add("./missing.png");
        selection.set_folder(dir.path());

        assert_eq!(
            selection.resolve()?,
            vec![
                dir.path().join("b.png"),
                PathBuf::from("missing.png"),
                dir.path().join("a.png"),
            ]
        );

        Ok(())
    }
}
