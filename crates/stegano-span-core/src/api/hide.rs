use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::cipher::PayloadCipher;
use crate::encoder::{HiddenMessage, SpanEncoder};
use crate::error::SteganoError;
use crate::locks::ImageLocks;
use crate::media::ImageFile;
use crate::options::SpanOptions;
use crate::result::Result;
use crate::Persist;

use super::shared::{cipher_for, with_write_locks, ImageSelection, Password};

pub fn prepare() -> HideApi {
    HideApi::default()
}

#[derive(Default, Debug)]
pub struct HideApi {
    message: Option<Vec<u8>>,
    images: ImageSelection,
    output_folder: Option<PathBuf>,
    password: Password,
    options: SpanOptions,
    locks: Option<Arc<ImageLocks>>,
}

impl HideApi {
    pub fn with_options(mut self, options: SpanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_message(mut self, message: impl AsRef<[u8]>) -> Self {
        self.message = Some(message.as_ref().to_vec());
        self
    }

    pub fn use_message<S: AsRef<[u8]>>(mut self, message: Option<S>) -> Self {
        self.message = message.map(|m| m.as_ref().to_vec());
        self
    }

    /// Adds one carrier image, images are filled in the order they are added
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

    /// Uses all PNG files of a folder as carriers, sorted by file name
    pub fn from_image_folder(mut self, folder: impl AsRef<Path>) -> Self {
        self.images.set_folder(folder);
        self
    }

    /// Modified images are written into this folder under their file name, instead of
    /// overwriting the carriers
    pub fn into_output_folder(mut self, output_folder: impl AsRef<Path>) -> Self {
        self.output_folder = Some(output_folder.as_ref().to_path_buf());
        self
    }

    /// Set the password used for encrypting the message
    /// If `None` is passed, no password will be used, leads to no encryption used
    pub fn using_password<P: Into<Password>>(mut self, password: P) -> Self {
        self.password = password.into();
        self
    }

    /// Serializes access to the carriers with other api calls that share the same locks
    pub fn with_locks(mut self, locks: Arc<ImageLocks>) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Execute the hide process and blocks until all modified images are written
    pub fn execute(self) -> Result<HiddenMessage> {
        let Some(message) = self.message else {
            return Err(SteganoError::MissingMessage);
        };
        let paths = self.images.resolve()?;
        let cipher = cipher_for(&self.password)?;
        let output_folder = self.output_folder;
        let options = self.options;

        with_write_locks(self.locks.as_ref(), &paths, || {
            let mut images = paths
                .iter()
                .map(ImageFile::open)
                .collect::<Result<Vec<_>>>()?;

            let hidden = SpanEncoder::new(options)
                .use_cipher(cipher.as_ref().map(|c| c as &dyn PayloadCipher))
                .hide(&message, &mut images)?;

            for i in &hidden.modified {
                let image = &mut images[*i];
                let target = output_folder
                    .as_ref()
                    .zip(image.path().file_name())
                    .map(|(folder, file_name)| folder.join(file_name));
                match target {
                    Some(target) => {
                        debug!("Writing {:?} to {target:?}", image.path());
                        image.save_as(&target)?;
                    }
                    None => image.save()?,
                }
            }

            Ok(hidden)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::RgbImage;
    use crate::test_utils::noisy_image;
    use tempfile::TempDir;

    fn carriers(dir: &Path, count: usize) -> Result<Vec<PathBuf>> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("carrier-{i}.png"));
                ImageFile::from_image(&path, noisy_image(16, 16)).save()?;
                Ok(path)
            })
            .collect()
    }

    fn load(path: &Path) -> Result<RgbImage> {
        Ok(ImageFile::open(path)?.into_image())
    }

    #[test]
    fn illustrate_api_usage() -> Result<()> {
        let dir = TempDir::new()?;
        carriers(dir.path(), 3)?;

        let hidden = prepare()
            .with_message("Hello, World!")
            .from_image_folder(dir.path())
            .using_password("SuperSecret42")
            .execute()?;

        assert_eq!(hidden.modified, vec![0]);

        Ok(())
    }

    #[test]
    fn should_leave_carriers_alone_with_an_output_folder() -> Result<()> {
        let dir = TempDir::new()?;
        let out = TempDir::new()?;
        let paths = carriers(dir.path(), 2)?;
        let before = load(&paths[0])?;

        prepare()
            .with_message(vec![0x42u8; 200])
            .with_images(&paths)
            .into_output_folder(out.path())
            .execute()?;

        assert_eq!(load(&paths[0])?, before);
        assert!(out.path().join("carrier-0.png").exists());
        assert!(out.path().join("carrier-1.png").exists());

        Ok(())
    }

    #[test]
    fn should_fill_a_carrier_selected_twice_only_once() -> Result<()> {
        let dir = TempDir::new()?;
        let paths = carriers(dir.path(), 2)?;
        let message = vec![0x17u8; 300];

        let hidden = prepare()
            .with_message(&message)
            .with_image(&paths[0])
            .from_image_folder(dir.path())
            .execute()?;
        assert_eq!(hidden.modified, vec![0, 1]);

        let messages = crate::api::unveil::prepare()
            .from_image_folder(dir.path())
            .execute()?;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, message);

        Ok(())
    }

    #[test]
    fn should_not_double_the_free_space_of_a_carrier_selected_twice() -> Result<()> {
        let dir = TempDir::new()?;
        let paths = carriers(dir.path(), 1)?;

        let result = prepare()
            .with_message(vec![0u8; 300])
            .with_image(&paths[0])
            .from_image_folder(dir.path())
            .execute();

        assert!(matches!(result, Err(SteganoError::Capacity { .. })));

        Ok(())
    }

    #[test]
    fn should_complain_about_missing_inputs() -> Result<()> {
        assert!(matches!(
            prepare().with_image("a.png").execute(),
            Err(SteganoError::MissingMessage)
        ));
        assert!(matches!(
            prepare().with_message("hi").execute(),
            Err(SteganoError::MissingImages)
        ));

        Ok(())
    }

    #[test]
    fn should_respect_shared_locks() -> Result<()> {
        let dir = TempDir::new()?;
        let paths = carriers(dir.path(), 1)?;
        let locks = Arc::new(ImageLocks::new());

        prepare()
            .with_message("first")
            .with_images(&paths)
            .with_locks(locks.clone())
            .execute()?;
        prepare()
            .with_message("second")
            .with_images(&paths)
            .with_locks(locks.clone())
            .execute()?;

        assert_eq!(locks.len(), 1);

        Ok(())
    }
}
