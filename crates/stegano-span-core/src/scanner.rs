//! # Capacity and segment scanner
//!
//! Finds the segments that are already hidden inside an image, and derives from them how
//! much space is left for new ones.

use std::time::Instant;

use log::debug;

use crate::bit_plane::{extract, raw_capacity};
use crate::header::{SegmentHeader, HEADER_SIZE};
use crate::media::RasterImage;
use crate::options::{BitsPerChannel, SpanOptions};

/// payload bytes a single segment can carry in an otherwise empty image
pub fn capacity<I: RasterImage + ?Sized>(image: &I, k: BitsPerChannel) -> usize {
    raw_capacity(image.channels().len(), k).saturating_sub(HEADER_SIZE)
}

/// A segment found inside the raw byte stream of one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLocation {
    /// byte position of the header in the raw stream
    pub offset: usize,
    /// header plus chunk length in bytes
    pub length: usize,
    pub header: SegmentHeader,
}

impl SegmentLocation {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// the message bytes this segment carries
    pub fn chunk<'r>(&self, raw: &'r [u8]) -> &'r [u8] {
        &raw[self.offset + HEADER_SIZE..self.end()]
    }
}

/// The raw byte stream of an image together with the segments found in it
#[derive(Debug, Clone)]
pub struct ScannedImage {
    pub raw: Vec<u8>,
    pub segments: Vec<SegmentLocation>,
}

impl ScannedImage {
    pub fn report(&self) -> CapacityReport {
        let raw_bytes = self.raw.len();
        let capacity_bytes = raw_bytes.saturating_sub(HEADER_SIZE);

        // without a header at the very start the image counts as unused
        let (used_bytes, append_offset) = match self.segments.first() {
            Some(first) if first.offset == 0 => (
                self.segments.iter().map(|s| s.length).sum(),
                self.segments.last().map(|s| s.end()).unwrap_or(0),
            ),
            _ => (0, 0),
        };

        CapacityReport {
            capacity_bytes,
            used_bytes,
            available_bytes: raw_bytes
                .saturating_sub(append_offset)
                .saturating_sub(HEADER_SIZE),
            append_offset,
            raw_bytes,
        }
    }
}

/// Space accounting of one image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapacityReport {
    /// payload bytes the image could carry when empty
    pub capacity_bytes: usize,
    /// bytes taken by existing segments, headers included
    pub used_bytes: usize,
    /// payload bytes a new segment can still carry
    pub available_bytes: usize,
    /// byte position in the raw stream where a new segment goes
    pub append_offset: usize,
    /// all bytes the image carries, headers included
    pub raw_bytes: usize,
}

impl CapacityReport {
    /// true if one more header fits behind the existing segments
    pub fn can_host_segment(&self) -> bool {
        self.raw_bytes >= self.append_offset + HEADER_SIZE
    }
}

/// Space accounting over a list of images, the reports keep the order of the images
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchCapacity {
    pub total_capacity: usize,
    pub total_used: usize,
    pub total_available: usize,
    pub reports: Vec<CapacityReport>,
}

/// extracts the raw byte stream of an image and walks all segment headers in it
pub fn scan<I: RasterImage + ?Sized>(image: &I, options: &SpanOptions) -> ScannedImage {
    let k = options.bits_per_channel;
    let channels = image.channels();
    let raw = extract(channels, k, raw_capacity(channels.len(), k));
    let segments = scan_raw(&raw, options.max_resync_window);

    ScannedImage { raw, segments }
}

pub fn find_segments<I: RasterImage + ?Sized>(
    image: &I,
    options: &SpanOptions,
) -> Vec<SegmentLocation> {
    scan(image, options).segments
}

pub fn report<I: RasterImage + ?Sized>(image: &I, options: &SpanOptions) -> CapacityReport {
    scan(image, options).report()
}

pub fn batch_capacity<I: RasterImage>(images: &[I], options: &SpanOptions) -> BatchCapacity {
    let start = Instant::now();
    debug!("Calculating capacity of {} images", images.len());

    let mut batch = BatchCapacity::default();
    for (i, image) in images.iter().enumerate() {
        let report = report(image, options);
        debug!(
            "  - image #{i} ({}x{}): capacity {} bytes | used {} bytes | available {} bytes",
            image.width(),
            image.height(),
            report.capacity_bytes,
            report.used_bytes,
            report.available_bytes
        );
        batch.total_capacity += report.capacity_bytes;
        batch.total_used += report.used_bytes;
        batch.total_available += report.available_bytes;
        batch.reports.push(report);
    }

    debug!(
        "Total capacity {} bytes, used {} bytes, available {} bytes, took {:?}",
        batch.total_capacity,
        batch.total_used,
        batch.total_available,
        start.elapsed()
    );

    batch
}

/// Walks the raw stream from the start. Whatever does not parse as a header is skipped
/// byte by byte, at most `max_resync_window` bytes in a row if set.
fn scan_raw(raw: &[u8], max_resync_window: Option<usize>) -> Vec<SegmentLocation> {
    let mut segments = Vec::new();
    let mut offset = 0;
    let mut misses = 0;

    while raw.len() - offset >= HEADER_SIZE {
        match SegmentHeader::parse(&raw[offset..offset + HEADER_SIZE]) {
            Ok(header) => {
                let room = (raw.len() - offset - HEADER_SIZE) as u64;
                let chunk = room.min(header.remaining_length()) as usize;
                let location = SegmentLocation {
                    offset,
                    length: HEADER_SIZE + chunk,
                    header,
                };
                offset = location.end();
                misses = 0;
                segments.push(location);
            }
            Err(_) => {
                offset += 1;
                misses += 1;
                if max_resync_window.is_some_and(|window| misses > window) {
                    debug!("Giving up scanning after {misses} bytes without a header");
                    break;
                }
            }
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_plane::{embed, embed_at};
    use crate::integrity::TruncatedHash;
    use crate::test_utils::{noisy_image, prepare_5x5_image};

    fn segment(total: u64, offset: u64, chunk: &[u8]) -> Vec<u8> {
        let mut bytes =
            SegmentHeader::new(total, offset, TruncatedHash::of(b"x"), 42).to_bytes().to_vec();
        bytes.extend_from_slice(chunk);
        bytes
    }

    #[test]
    fn should_compute_capacity_from_the_channel_count() {
        let img = noisy_image(10, 10);
        // 300 channels
        let expected = [37 - 36, 75 - 36, 112 - 36, 150 - 36];
        for (bits, expected) in (1..=4).zip(expected) {
            assert_eq!(capacity(&img, BitsPerChannel::new(bits).unwrap()), expected);
        }
    }

    #[test]
    fn should_floor_capacity_at_zero() {
        let img = prepare_5x5_image();
        // 75 channels with one bit carry 9 bytes only
        assert_eq!(capacity(&img, BitsPerChannel::new(1).unwrap()), 0);
    }

    #[test]
    fn should_report_an_untouched_image_as_fully_available() {
        let img = noisy_image(20, 20);
        let options = SpanOptions::default();
        let report = report(&img, &options);

        assert_eq!(report.used_bytes, 0);
        assert_eq!(report.append_offset, 0);
        assert_eq!(report.capacity_bytes, capacity(&img, options.bits_per_channel));
        assert_eq!(report.available_bytes, report.capacity_bytes);
    }

    #[test]
    fn should_find_consecutive_segments() {
        let mut img = noisy_image(20, 20);
        let options = SpanOptions::default();
        let k = options.bits_per_channel;

        let first = segment(5, 0, b"hello");
        let second = segment(3, 0, b"abc");
        embed(img.channels_mut(), k, &first).unwrap();
        embed_at(img.channels_mut(), k, first.len(), &second).unwrap();

        let scanned = scan(&img, &options);
        let offsets: Vec<_> = scanned.segments.iter().map(|s| (s.offset, s.length)).collect();
        assert_eq!(offsets, vec![(0, 41), (41, 39)]);
        assert_eq!(scanned.segments[0].chunk(&scanned.raw), b"hello");
        assert_eq!(scanned.segments[1].chunk(&scanned.raw), b"abc");

        let report = scanned.report();
        assert_eq!(report.used_bytes, 80);
        assert_eq!(report.append_offset, 80);
        assert_eq!(report.available_bytes, report.capacity_bytes - 80);
    }

    #[test]
    fn should_cut_a_segment_at_the_end_of_the_image() {
        let mut img = noisy_image(10, 10);
        let options = SpanOptions::default();
        let raw = raw_capacity(img.channels().len(), options.bits_per_channel);
        let chunk = vec![7u8; raw - HEADER_SIZE];

        // the message continues in another image
        embed(img.channels_mut(), options.bits_per_channel, &segment(1_000, 0, &chunk)).unwrap();

        let segments = find_segments(&img, &options);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].length, raw);

        let report = report(&img, &options);
        assert_eq!(report.available_bytes, 0);
        assert!(!report.can_host_segment());
    }

    #[test]
    fn should_resync_over_noise_between_segments() {
        let mut img = noisy_image(20, 20);
        let options = SpanOptions::default();
        let k = options.bits_per_channel;

        let first = segment(2, 0, b"hi");
        embed(img.channels_mut(), k, &first).unwrap();
        embed_at(img.channels_mut(), k, first.len(), b"garbage").unwrap();
        embed_at(img.channels_mut(), k, first.len() + 7, &segment(2, 0, b"yo")).unwrap();

        let offsets: Vec<_> = find_segments(&img, &options)
            .iter()
            .map(|s| s.offset)
            .collect();
        assert_eq!(offsets, vec![0, 45]);
    }

    #[test]
    fn should_ignore_usage_without_a_header_at_the_start() {
        let mut img = noisy_image(20, 20);
        let options = SpanOptions::default();
        embed_at(
            img.channels_mut(),
            options.bits_per_channel,
            10,
            &segment(2, 0, b"hi"),
        )
        .unwrap();

        let scanned = scan(&img, &options);
        assert_eq!(scanned.segments.len(), 1);
        assert_eq!(scanned.report().used_bytes, 0);
        assert_eq!(scanned.report().append_offset, 0);
    }

    #[test]
    fn should_stop_after_the_resync_window() {
        let mut img = noisy_image(20, 20);
        let options = SpanOptions::default();
        embed_at(
            img.channels_mut(),
            options.bits_per_channel,
            10,
            &segment(2, 0, b"hi"),
        )
        .unwrap();

        let found = |window| {
            find_segments(&img, &options.clone().with_max_resync_window(window)).len()
        };
        assert_eq!(found(Some(9)), 0);
        // skipping exactly 10 bytes reaches the header
        assert_eq!(found(Some(10)), 1);
        assert_eq!(found(None), 1);
    }

    #[test]
    fn should_not_resync_with_a_zero_window() {
        let mut img = noisy_image(20, 20);
        let options = SpanOptions::default().with_max_resync_window(Some(0));
        let k = options.bits_per_channel;
        embed(img.channels_mut(), k, &segment(2, 0, b"hi")).unwrap();
        embed_at(img.channels_mut(), k, 39, &segment(2, 0, b"yo")).unwrap();

        // the segment at the start is found, the one behind a single byte gap is not
        assert_eq!(find_segments(&img, &options).len(), 1);
    }

    #[test]
    fn should_be_idempotent() {
        let mut images = vec![noisy_image(12, 12), noisy_image(15, 9)];
        let options = SpanOptions::default();
        embed(
            images[1].channels_mut(),
            options.bits_per_channel,
            &segment(4, 0, b"data"),
        )
        .unwrap();

        let first = batch_capacity(&images, &options);
        let second = batch_capacity(&images, &options);
        assert_eq!(first, second);
        assert_eq!(first.reports.len(), 2);
        assert_eq!(first.total_used, 40);
        assert_eq!(
            first.total_capacity,
            first.reports.iter().map(|r| r.capacity_bytes).sum::<usize>()
        );
        assert_eq!(first.total_available, first.total_capacity - 40);
    }
}
