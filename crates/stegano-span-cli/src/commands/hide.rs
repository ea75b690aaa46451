use std::fs;
use std::path::PathBuf;

use clap::Args;
use stegano_span_core::{SpanOptions, SteganoError};

use crate::cli::ImageArgs;
use crate::CliResult;

/// Hides a message spread over PNG images
#[derive(Args, Debug)]
pub struct HideArgs {
    /// Password used to encrypt the message, asked for if not given
    #[arg(short, long, value_name = "password")]
    pub password: Option<String>,

    #[command(flatten)]
    pub images: ImageArgs,

    /// Modified images are stored in that folder instead of overwriting the carriers
    #[arg(short = 'o', long = "out", value_name = "output folder")]
    pub output_folder: Option<PathBuf>,

    /// File whose content is hidden
    #[arg(
        short = 'd',
        long = "data",
        value_name = "data file",
        required_unless_present = "message"
    )]
    pub data_file: Option<PathBuf>,

    /// A text message that will be hidden
    #[arg(short, long, value_name = "text message", conflicts_with = "data_file")]
    pub message: Option<String>,
}

impl HideArgs {
    pub fn run(self, options: SpanOptions) -> CliResult<()> {
        let message = match (self.message, &self.data_file) {
            (Some(message), _) => message.into_bytes(),
            (None, Some(file)) => fs::read(file).map_err(|source| SteganoError::ReadError { source })?,
            (None, None) => return Err(SteganoError::MissingMessage),
        };
        let password = if self.password.is_none() {
            crate::cli::ask_for_password(true)
        } else {
            self.password
        };

        let mut api = stegano_span_core::api::hide::prepare()
            .with_options(options)
            .with_message(message)
            .with_images(&self.images.images)
            .using_password(password);
        if let Some(folder) = self.images.folder {
            api = api.from_image_folder(folder);
        }
        if let Some(output_folder) = self.output_folder {
            api = api.into_output_folder(output_folder);
        }

        let hidden = api.execute()?;
        println!(
            "Hid message {:#010x} ({} bytes) in {} image(s)",
            hidden.message_id,
            hidden.total_length,
            hidden.modified.len()
        );

        Ok(())
    }
}
