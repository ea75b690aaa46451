use clap::Args;
use stegano_span_core::SpanOptions;

use crate::cli::ImageArgs;
use crate::CliResult;

/// Shows how many bytes PNG images can still carry
#[derive(Args, Debug)]
pub struct CapacityArgs {
    #[command(flatten)]
    pub images: ImageArgs,
}

impl CapacityArgs {
    pub fn run(self, options: SpanOptions) -> CliResult<()> {
        let mut api = stegano_span_core::api::capacity::prepare()
            .with_options(options)
            .with_images(&self.images.images);
        if let Some(folder) = self.images.folder {
            api = api.from_image_folder(folder);
        }

        let capacity = api.execute()?;
        for (path, report) in capacity.images.iter().zip(&capacity.batch.reports) {
            println!(
                "{}: capacity {} bytes | used {} bytes | available {} bytes",
                path.display(),
                report.capacity_bytes,
                report.used_bytes,
                report.available_bytes
            );
        }
        println!(
            "total: capacity {} bytes | used {} bytes | available {} bytes",
            capacity.batch.total_capacity, capacity.batch.total_used, capacity.batch.total_available
        );

        Ok(())
    }
}
