use argh::FromArgs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stegano_span_core::scanner::scan;
use stegano_span_core::{BitsPerChannel, ImageFile, SpanOptions};
use tabled::{Table, Tabled};

#[derive(FromArgs)]
/// Inspecting png image files
struct SteganoInspectArgs {
    /// inspect the segments hidden in the given png files
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum Command {
    Segments(SegmentsArgs),
}

#[derive(FromArgs, PartialEq, Debug)]
/// Shows the segment headers found in png files
#[argh(subcommand, name = "segments")]
struct SegmentsArgs {
    /// low bits per color channel, 1 to 4
    #[argh(option, default = "2")]
    bits: u8,

    /// the png image files to inspect
    #[argh(positional)]
    png_files: Vec<PathBuf>,
}

#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "at byte")]
    offset: usize,
    #[tabled(rename = "length")]
    length: usize,
    #[tabled(rename = "message id")]
    message_id: String,
    #[tabled(rename = "total length")]
    total_length: u64,
    #[tabled(rename = "offset in message")]
    current_offset: u64,
    #[tabled(rename = "hash")]
    truncated_hash: String,
}

fn main() -> ExitCode {
    let args: SteganoInspectArgs = argh::from_env();

    match &args.command {
        Command::Segments(args) => {
            let bits = match BitsPerChannel::new(args.bits) {
                Ok(bits) => bits,
                Err(e) => {
                    eprintln!("{e}");
                    return ExitCode::FAILURE;
                }
            };
            let options = SpanOptions::default().with_bits_per_channel(bits);

            let mut code = ExitCode::SUCCESS;
            for file in &args.png_files {
                if let Err(e) = print_segments(file, &options) {
                    eprintln!("{}: {e}", file.display());
                    code = ExitCode::FAILURE;
                }
            }
            code
        }
    }
}

fn print_segments(file: &Path, options: &SpanOptions) -> stegano_span_core::Result<()> {
    let image = ImageFile::open(file)?;
    let scanned = scan(&image, options);
    let report = scanned.report();

    println!("# Segments of `{}`", file.display());
    println!();
    println!(
        "capacity {} bytes | used {} bytes | available {} bytes",
        report.capacity_bytes, report.used_bytes, report.available_bytes
    );
    println!();
    if scanned.segments.is_empty() {
        println!("no segments found");
    } else {
        let rows = scanned.segments.iter().map(|s| SegmentRow {
            offset: s.offset,
            length: s.length,
            message_id: format!("{:#010x}", s.header.message_id),
            total_length: s.header.total_length,
            current_offset: s.header.current_offset,
            truncated_hash: s.header.truncated_hash.to_string(),
        });
        println!("{}", Table::new(rows));
    }
    println!();

    Ok(())
}
