use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::locks::ImageLocks;
use crate::media::ImageFile;
use crate::options::SpanOptions;
use crate::result::Result;
use crate::scanner::{batch_capacity, BatchCapacity};

use super::shared::{with_read_locks, ImageSelection};

pub fn prepare() -> CapacityApi {
    CapacityApi::default()
}

/// Space accounting of image files, `batch.reports[i]` belongs to `images[i]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCapacity {
    pub images: Vec<PathBuf>,
    pub batch: BatchCapacity,
}

#[derive(Default, Debug)]
pub struct CapacityApi {
    images: ImageSelection,
    options: SpanOptions,
    locks: Option<Arc<ImageLocks>>,
}

impl CapacityApi {
    pub fn with_options(mut self, options: SpanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_image(mut self, image: impl AsRef<Path>) -> Self {
        self.images.add(image);
        self
    }

    pub fn with_images<P: AsRef<Path>>(mut self, images: &[P]) -> Self {
        for image in images {
            self.images.add(image);
        }
        self
    }

    pub fn from_image_folder(mut self, folder: impl AsRef<Path>) -> Self {
        self.images.set_folder(folder);
        self
    }

    pub fn with_locks(mut self, locks: Arc<ImageLocks>) -> Self {
        self.locks = Some(locks);
        self
    }

    pub fn execute(self) -> Result<FileCapacity> {
        let paths = self.images.resolve()?;
        let options = self.options;

        let batch = with_read_locks(self.locks.as_ref(), &paths, || {
            let images = paths
                .iter()
                .map(ImageFile::open)
                .collect::<Result<Vec<_>>>()?;

            Ok(batch_capacity(&images, &options))
        })?;

        Ok(FileCapacity {
            images: paths,
            batch,
        })
    }
}
