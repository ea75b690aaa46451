//! # Segment header
//!
//! Every segment embedded in an image starts with this fixed size record, that makes the
//! image self describing. All integers are big endian.
//!
//! | bytes  | field            |
//! |--------|------------------|
//! | 0..4   | magic `STEG`     |
//! | 4      | version (1)      |
//! | 5..13  | `total_length`   |
//! | 13..21 | `current_offset` |
//! | 21..29 | `truncated_hash` |
//! | 29..33 | `message_id`     |
//! | 33..36 | reserved, zero   |

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};

use crate::error::FormatError;
use crate::integrity::TruncatedHash;

pub const MAGIC: [u8; 4] = *b"STEG";
pub const VERSION: u8 = 1;
pub const HEADER_SIZE: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentHeader {
    /// length of the whole (possibly encrypted) message body
    pub total_length: u64,
    /// position of this segment's chunk inside the message body
    pub current_offset: u64,
    /// first bytes of the content hash of the plaintext
    pub truncated_hash: TruncatedHash,
    /// groups all segments of one message
    pub message_id: u32,
}

impl SegmentHeader {
    pub fn new(
        total_length: u64,
        current_offset: u64,
        truncated_hash: TruncatedHash,
        message_id: u32,
    ) -> Self {
        Self {
            total_length,
            current_offset,
            truncated_hash,
            message_id,
        }
    }

    /// bytes of the message body that follow `current_offset`
    pub fn remaining_length(&self) -> u64 {
        self.total_length - self.current_offset
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        // the fields take less than HEADER_SIZE bytes, the buffer cannot run out of space
        let _ = self.write_fields(&mut &mut buf[..]);

        buf
    }

    fn write_fields(&self, w: &mut impl Write) -> std::io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_u8(VERSION)?;
        w.write_u64::<BigEndian>(self.total_length)?;
        w.write_u64::<BigEndian>(self.current_offset)?;
        w.write_all(self.truncated_hash.as_bytes())?;
        w.write_u32::<BigEndian>(self.message_id)
    }

    fn read_fields(r: &mut impl Read) -> std::io::Result<Self> {
        let total_length = r.read_u64::<BigEndian>()?;
        let current_offset = r.read_u64::<BigEndian>()?;
        let mut hash = [0u8; TruncatedHash::LEN];
        r.read_exact(&mut hash)?;
        let message_id = r.read_u32::<BigEndian>()?;

        Ok(Self::new(
            total_length,
            current_offset,
            TruncatedHash::from(hash),
            message_id,
        ))
    }

    /// Parses a header, any noise that is not a header leads to a [`FormatError`].
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() != HEADER_SIZE {
            return Err(FormatError::InvalidLength {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        if bytes[..MAGIC.len()] != MAGIC {
            return Err(FormatError::InvalidMagic);
        }
        let version = bytes[MAGIC.len()];
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }

        let header = Self::read_fields(&mut Cursor::new(&bytes[MAGIC.len() + 1..])).map_err(
            |_| FormatError::InvalidLength {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            },
        )?;

        let empty = header.total_length == 0 && header.current_offset == 0;
        if !empty && header.current_offset >= header.total_length {
            return Err(FormatError::OffsetOutOfRange {
                total_length: header.total_length,
                current_offset: header.current_offset,
            });
        }

        Ok(header)
    }
}
