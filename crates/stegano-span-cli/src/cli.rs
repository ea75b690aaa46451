use clap::{Args, Parser, Subcommand};
use dialoguer::Password;
use stegano_span_core::{BitsPerChannel, Placement, SpanOptions};

use crate::commands::*;
use crate::CliResult;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Number of low bits per color channel that carry data, 1 to 4
    #[arg(long = "bits", value_name = "bits", default_value_t = 2, global = true)]
    pub bits_per_channel: u8,

    /// Order in which images are filled: `sequential` or `widest-first`
    #[arg(long, value_name = "placement", default_value = "sequential", global = true)]
    pub placement: Placement,

    /// Give up scanning an image after that many bytes without a segment header
    #[arg(long, value_name = "bytes", global = true)]
    pub max_resync_window: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    pub fn options(&self) -> CliResult<SpanOptions> {
        Ok(SpanOptions::default()
            .with_bits_per_channel(BitsPerChannel::new(self.bits_per_channel)?)
            .with_placement(self.placement)
            .with_max_resync_window(self.max_resync_window))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Hide(hide::HideArgs),
    Unveil(unveil::UnveilArgs),
    Capacity(capacity::CapacityArgs),
}

/// The carrier images of a command
#[derive(Args, Debug)]
pub struct ImageArgs {
    /// PNG image(s), used in the given order
    #[arg(short = 'i', long = "in", value_name = "image files", num_args = 1..)]
    pub images: Vec<std::path::PathBuf>,

    /// Folder whose PNG images are used, sorted by file name
    #[arg(
        short = 'f',
        long = "folder",
        value_name = "image folder",
        required_unless_present = "images"
    )]
    pub folder: Option<std::path::PathBuf>,
}

/// Prompts for a password on the terminal, an empty input means no password.
pub fn ask_for_password(with_confirmation: bool) -> Option<String> {
    let mut prompt = Password::new()
        .with_prompt("Password (leave empty for none)")
        .allow_empty_password(true);
    if with_confirmation {
        prompt = prompt.with_confirmation("Repeat password", "Error: the passwords don't match.");
    }

    prompt.interact().ok().filter(|p| !p.is_empty())
}
