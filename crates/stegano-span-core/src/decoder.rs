//! # Spanning decoder
//!
//! Collects the segments of all images, groups them by message and reassembles every message
//! whose chunks cover its whole body. Images may be passed in any order.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use log::{debug, info, warn};

use crate::cipher::PayloadCipher;
use crate::error::SteganoError;
use crate::header::SegmentHeader;
use crate::integrity::TruncatedHash;
use crate::media::RasterImage;
use crate::options::SpanOptions;
use crate::result::Result;
use crate::scanner::scan;

/// Identifies the segments that belong to one message.
///
/// Two messages that happen to share an id stay apart, as long as their length or hash differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageKey {
    pub message_id: u32,
    pub total_length: u64,
    pub truncated_hash: TruncatedHash,
}

impl From<&SegmentHeader> for MessageKey {
    fn from(header: &SegmentHeader) -> Self {
        Self {
            message_id: header.message_id,
            total_length: header.total_length,
            truncated_hash: header.truncated_hash,
        }
    }
}

/// A message that was reassembled, decrypted and verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedMessage {
    pub message_id: u32,
    pub content: Vec<u8>,
}

impl RevealedMessage {
    /// the content as UTF-8 text
    pub fn text(&self) -> Result<String> {
        Ok(String::from_utf8(self.content.clone())?)
    }
}

/// A complete message that was dropped, because it failed to decrypt or verify
#[derive(Debug)]
pub struct MessageFailure {
    pub key: MessageKey,
    pub error: SteganoError,
}

/// A message of which some chunks were not found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncompleteMessage {
    pub key: MessageKey,
    /// bytes available from the start of the body without a gap
    pub collected: u64,
}

/// Everything the decoder found, messages appear in the order their first segment was seen
#[derive(Debug, Default)]
pub struct RevealReport {
    pub messages: Vec<RevealedMessage>,
    pub failures: Vec<MessageFailure>,
    pub incomplete: Vec<IncompleteMessage>,
}

impl RevealReport {
    pub fn into_messages(self) -> Vec<RevealedMessage> {
        self.messages
    }
}

/// The chunks of one message, by their offset inside the body.
///
/// Nothing of the size of `total_length` is allocated before the chunks actually cover it,
/// a forged header cannot make the decoder reserve memory.
#[derive(Debug, Default)]
struct Assembly {
    fragments: BTreeMap<u64, Vec<u8>>,
}

impl Assembly {
    /// the first chunk seen for an offset wins
    fn insert(&mut self, offset: u64, chunk: &[u8]) {
        self.fragments
            .entry(offset)
            .or_insert_with(|| chunk.to_vec());
    }

    fn collected(&self) -> u64 {
        let mut end = 0;
        for (offset, chunk) in &self.fragments {
            if *offset > end {
                break;
            }
            end = end.max(offset + chunk.len() as u64);
        }
        end
    }

    fn is_complete(&self, total_length: u64) -> bool {
        self.collected() >= total_length
    }

    fn assemble(self, total_length: u64) -> Vec<u8> {
        let total = total_length as usize;
        let mut body = vec![0u8; total];
        for (offset, chunk) in self.fragments {
            let start = offset as usize;
            if start >= total {
                continue;
            }
            let len = chunk.len().min(total - start);
            body[start..start + len].copy_from_slice(&chunk[..len]);
        }
        body
    }
}

pub struct SpanDecoder<'c> {
    options: SpanOptions,
    cipher: Option<&'c dyn PayloadCipher>,
}

impl<'c> SpanDecoder<'c> {
    pub fn new(options: SpanOptions) -> Self {
        Self {
            options,
            cipher: None,
        }
    }

    pub fn with_cipher(self, cipher: &'c dyn PayloadCipher) -> Self {
        self.use_cipher(Some(cipher))
    }

    pub fn use_cipher(mut self, cipher: Option<&'c dyn PayloadCipher>) -> Self {
        self.cipher = cipher;
        self
    }

    /// Reveals every message found in `images`.
    ///
    /// Damaged or foreign messages never fail the whole call, they end up in
    /// [`RevealReport::failures`] and [`RevealReport::incomplete`] instead.
    pub fn reveal<I: RasterImage>(&self, images: &[I]) -> RevealReport {
        let start = Instant::now();
        let mut order: Vec<MessageKey> = Vec::new();
        let mut assemblies: HashMap<MessageKey, Assembly> = HashMap::new();

        for (i, image) in images.iter().enumerate() {
            let scanned = scan(image, &self.options);
            debug!("Found {} segments in image #{i}", scanned.segments.len());

            for segment in &scanned.segments {
                let key = MessageKey::from(&segment.header);
                let assembly = assemblies.entry(key).or_insert_with(|| {
                    order.push(key);
                    Assembly::default()
                });
                if assembly.is_complete(key.total_length) {
                    continue;
                }
                assembly.insert(segment.header.current_offset, segment.chunk(&scanned.raw));
            }
        }

        let mut report = RevealReport::default();
        for key in order {
            let Some(assembly) = assemblies.remove(&key) else {
                continue;
            };
            if !assembly.is_complete(key.total_length) {
                let collected = assembly.collected();
                warn!(
                    "Message {:#010x} is incomplete, {collected} of {} bytes found",
                    key.message_id, key.total_length
                );
                report.incomplete.push(IncompleteMessage { key, collected });
                continue;
            }

            let body = assembly.assemble(key.total_length);
            match self.finish(&key, body) {
                Ok(content) => report.messages.push(RevealedMessage {
                    message_id: key.message_id,
                    content,
                }),
                Err(error) => {
                    warn!("Dropping message {:#010x}: {error}", key.message_id);
                    report.failures.push(MessageFailure { key, error });
                }
            }
        }

        info!(
            "Revealed {} messages from {} images, took {:?}",
            report.messages.len(),
            images.len(),
            start.elapsed()
        );

        report
    }

    fn finish(&self, key: &MessageKey, body: Vec<u8>) -> Result<Vec<u8>> {
        let content = match self.cipher {
            Some(cipher) => cipher.decrypt(&body)?,
            None => body,
        };

        if key.truncated_hash.verify(&content) {
            Ok(content)
        } else {
            Err(SteganoError::Integrity {
                message_id: key.message_id,
            })
        }
    }
}
