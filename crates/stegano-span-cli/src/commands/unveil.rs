use std::path::PathBuf;

use clap::Args;
use stegano_span_core::SpanOptions;

use crate::cli::ImageArgs;
use crate::CliResult;

/// Unveils all messages from PNG images
#[derive(Args, Debug)]
pub struct UnveilArgs {
    /// Password used to decrypt the messages, asked for if not given
    #[arg(short, long, value_name = "password")]
    pub password: Option<String>,

    #[command(flatten)]
    pub images: ImageArgs,

    /// Messages are stored as files in that folder, instead of printed
    #[arg(short = 'o', long = "out", value_name = "output folder")]
    pub output_folder: Option<PathBuf>,
}

impl UnveilArgs {
    pub fn run(self, options: SpanOptions) -> CliResult<()> {
        let password = if self.password.is_none() {
            crate::cli::ask_for_password(false)
        } else {
            self.password
        };

        let mut api = stegano_span_core::api::unveil::prepare()
            .with_options(options)
            .from_secret_files(&self.images.images)
            .using_password(password);
        if let Some(folder) = self.images.folder {
            api = api.from_image_folder(folder);
        }
        let print = self.output_folder.is_none();
        if let Some(output_folder) = self.output_folder {
            api = api.into_output_folder(output_folder);
        }

        for message in api.execute()? {
            match message.text() {
                Ok(text) if print => println!("{text}"),
                Err(_) if print => println!(
                    "<message {:#010x} with {} bytes of binary data>",
                    message.message_id,
                    message.content.len()
                ),
                _ => {}
            }
        }

        Ok(())
    }
}
