//! # Spanning encoder
//!
//! Splits one message into segments and hides them in a list of images. Every image keeps
//! the segments it already carries, new segments are appended behind them.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use log::{debug, info};

use crate::bit_plane::embed_at;
use crate::cipher::PayloadCipher;
use crate::error::SteganoError;
use crate::header::{SegmentHeader, HEADER_SIZE};
use crate::integrity::TruncatedHash;
use crate::media::RasterImage;
use crate::options::{Placement, SpanOptions};
use crate::result::Result;
use crate::scanner::{report, CapacityReport};

/// Next message id, seeded from the clock once per process and counting up from there,
/// so ids of subsequent calls never repeat within a process.
pub fn next_message_id() -> u32 {
    static SEED: OnceLock<u32> = OnceLock::new();
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let seed = *SEED.get_or_init(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| (d.as_secs() as u32).rotate_left(16) ^ d.subsec_nanos())
            .unwrap_or_default()
    });

    seed.wrapping_add(COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Outcome of hiding one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenMessage {
    pub message_id: u32,
    /// length of the body as hidden, after encryption
    pub total_length: usize,
    /// indices of the images that received a segment, in writing order
    pub modified: Vec<usize>,
}

/// one segment to be written: image index, position in the body and chunk length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placed {
    image: usize,
    body_offset: usize,
    len: usize,
}

pub struct SpanEncoder<'c> {
    options: SpanOptions,
    cipher: Option<&'c dyn PayloadCipher>,
    message_id: Option<u32>,
}

impl<'c> SpanEncoder<'c> {
    pub fn new(options: SpanOptions) -> Self {
        Self {
            options,
            cipher: None,
            message_id: None,
        }
    }

    pub fn with_cipher(self, cipher: &'c dyn PayloadCipher) -> Self {
        self.use_cipher(Some(cipher))
    }

    /// If `None` is passed, the message is hidden without encryption
    pub fn use_cipher(mut self, cipher: Option<&'c dyn PayloadCipher>) -> Self {
        self.cipher = cipher;
        self
    }

    /// Use a fixed message id instead of [`next_message_id`]
    pub fn with_message_id(mut self, message_id: u32) -> Self {
        self.message_id = Some(message_id);
        self
    }

    /// Hides `message` in `images`.
    ///
    /// Nothing is written if the message does not fit, the capacity check happens upfront.
    pub fn hide<I: RasterImage>(&self, message: &[u8], images: &mut [I]) -> Result<HiddenMessage> {
        let start = Instant::now();
        let hash = TruncatedHash::of(message);
        let body = match self.cipher {
            Some(cipher) => cipher.encrypt(message)?,
            None => message.to_vec(),
        };

        let reports: Vec<CapacityReport> = images
            .iter()
            .map(|image| report(image, &self.options))
            .collect();
        let plan = plan_segments(&reports, self.options.placement, body.len())?;

        let message_id = self.message_id.unwrap_or_else(next_message_id);
        let k = self.options.bits_per_channel;
        let mut modified = Vec::with_capacity(plan.len());

        for placed in plan {
            let header = SegmentHeader::new(
                body.len() as u64,
                placed.body_offset as u64,
                hash,
                message_id,
            );
            let mut segment = Vec::with_capacity(HEADER_SIZE + placed.len);
            segment.extend_from_slice(&header.to_bytes());
            segment.extend_from_slice(&body[placed.body_offset..placed.body_offset + placed.len]);

            let append_offset = reports[placed.image].append_offset;
            embed_at(
                images[placed.image].channels_mut(),
                k,
                append_offset,
                &segment,
            )?;
            debug!(
                "Wrote {} bytes of message {message_id:#010x} at offset {} into image #{} at byte {append_offset}",
                placed.len, placed.body_offset, placed.image
            );
            modified.push(placed.image);
        }

        info!(
            "Hid message {message_id:#010x} with {} bytes in {} images, took {:?}",
            body.len(),
            modified.len(),
            start.elapsed()
        );

        Ok(HiddenMessage {
            message_id,
            total_length: body.len(),
            modified,
        })
    }
}

fn placement_order(reports: &[CapacityReport], placement: Placement) -> Vec<usize> {
    let mut order: Vec<usize> = (0..reports.len()).collect();
    if placement == Placement::WidestFirst {
        // stable, equally wide images keep their order
        order.sort_by(|a, b| reports[*b].available_bytes.cmp(&reports[*a].available_bytes));
    }
    order
}

/// Decides which image receives which part of a body of `body_len` bytes.
fn plan_segments(
    reports: &[CapacityReport],
    placement: Placement,
    body_len: usize,
) -> Result<Vec<Placed>> {
    let available: usize = reports.iter().map(|r| r.available_bytes).sum();
    let order = placement_order(reports, placement);

    if body_len == 0 {
        // an empty message still needs room for its header
        return order
            .into_iter()
            .find(|i| reports[*i].can_host_segment())
            .map(|image| {
                vec![Placed {
                    image,
                    body_offset: 0,
                    len: 0,
                }]
            })
            .ok_or(SteganoError::Capacity {
                required: HEADER_SIZE,
                available: 0,
            });
    }

    if body_len > available {
        return Err(SteganoError::Capacity {
            required: body_len,
            available,
        });
    }

    let mut plan = Vec::new();
    let mut written = 0;
    for image in order {
        if written == body_len {
            break;
        }
        let len = reports[image].available_bytes.min(body_len - written);
        if len == 0 {
            continue;
        }
        plan.push(Placed {
            image,
            body_offset: written,
            len,
        });
        written += len;
    }

    Ok(plan)
}
