use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SteganoError;
use crate::result::Result;

use super::types::is_png;

/// all PNG files directly inside `dir`, sorted by file name
pub fn png_images(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut images = fs::read_dir(dir.as_ref())
        .map_err(|source| SteganoError::ReadError { source })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_png(path))
        .collect::<Vec<_>>();
    images.sort();

    Ok(images)
}
