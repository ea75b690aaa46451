//! # Bit plane codec
//!
//! Maps a byte stream onto the low `k` bits of a flat array of color channels and back.
//!
//! The bits of the data are consumed most significant bit first. Every channel takes the
//! next `k` of those bits, the first of them lands in the least significant bit of the channel.
//! When [`embed`] ends inside a channel, the rest of that channel gets zero bits as padding,
//! [`embed_at`] leaves those bits alone.
//!
//! ```rust
//! use stegano_span_core::bit_plane::{embed, extract};
//! use stegano_span_core::BitsPerChannel;
//!
//! let mut channels = vec![0xffu8; 16];
//! let k = BitsPerChannel::new(2).unwrap();
//!
//! embed(&mut channels, k, b"Hi").unwrap();
//! assert_eq!(extract(&channels, k, 2), b"Hi");
//! // only the 8 channels carrying data were touched
//! assert_eq!(&channels[8..], &[0xff; 8]);
//! ```

use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::error::SteganoError;
use crate::options::BitsPerChannel;
use crate::result::Result;

/// number of whole bytes `channel_count` channels can carry
pub fn raw_capacity(channel_count: usize, k: BitsPerChannel) -> usize {
    channel_count * k.get() as usize / 8
}

/// hides `data` at the very start of `channels`, the last channel is padded with zero bits
pub fn embed(channels: &mut [u8], k: BitsPerChannel, data: &[u8]) -> Result<()> {
    write_stream(channels, k, 0, data, Tail::ZeroPad)
}

/// hides `data` at byte position `byte_offset` of the raw stream the channels carry.
///
/// Only the bits of `data` are written, stream bits before and after it stay as they are,
/// even if they share a channel with the first or last bits of `data`.
pub fn embed_at(
    channels: &mut [u8],
    k: BitsPerChannel,
    byte_offset: usize,
    data: &[u8],
) -> Result<()> {
    write_stream(channels, k, byte_offset, data, Tail::Keep)
}

/// what happens to the bits of the last channel behind the data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tail {
    ZeroPad,
    Keep,
}

fn write_stream(
    channels: &mut [u8],
    k: BitsPerChannel,
    byte_offset: usize,
    data: &[u8],
    tail: Tail,
) -> Result<()> {
    let available = raw_capacity(channels.len(), k);
    let required = byte_offset.saturating_add(data.len());
    if required > available {
        return Err(SteganoError::Capacity {
            required,
            available,
        });
    }

    let bits = k.get() as usize;
    let mut reader = BitReader::endian(data, BigEndian);
    let mut remaining = data.len() * 8;
    let start = byte_offset * 8;
    let mut slot = start % bits;

    for channel in channels[start / bits..].iter_mut() {
        if remaining == 0 {
            break;
        }
        let end = bits.min(slot + remaining);
        let mut group = 0u8;
        for bit in slot..end {
            if reader.read_bit()? {
                group |= 1 << bit;
            }
        }
        remaining -= end - slot;

        let upto: u8 = match tail {
            Tail::ZeroPad if remaining == 0 => k.mask(),
            _ => (1 << end) - 1,
        };
        let written = upto & !((1u8 << slot) - 1);
        *channel = (*channel & !written) | group;
        slot = 0;
    }

    Ok(())
}

/// reads `byte_count` bytes from the start of `channels`.
///
/// If the channels carry fewer bytes than asked for, only the complete bytes are returned.
pub fn extract(channels: &[u8], k: BitsPerChannel, byte_count: usize) -> Vec<u8> {
    let byte_count = byte_count.min(raw_capacity(channels.len(), k));
    let mut bytes = Vec::with_capacity(byte_count);
    if byte_count == 0 {
        return bytes;
    }

    let mut byte = 0u8;
    let mut filled = 0;
    for channel in channels {
        for slot in 0..k.get() {
            byte = (byte << 1) | ((channel >> slot) & 1);
            filled += 1;
            if filled == 8 {
                bytes.push(byte);
                if bytes.len() == byte_count {
                    return bytes;
                }
                byte = 0;
                filled = 0;
            }
        }
    }

    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_k() -> impl Iterator<Item = BitsPerChannel> {
        (1..=4).map(|b| BitsPerChannel::new(b).unwrap())
    }

    #[test]
    fn should_place_msb_first_bits_lsb_first_into_channels() {
        let mut channels = vec![0u8; 4];
        embed(&mut channels, BitsPerChannel::default(), &[0b1011_0010]).unwrap();

        // stream 1 0 | 1 1 | 0 0 | 1 0 ; first stream bit goes to bit 0 of a channel
        assert_eq!(channels, vec![0b01, 0b11, 0b00, 0b01]);
    }

    #[test]
    fn should_only_touch_the_low_bits() {
        let mut channels = vec![0b1010_1010u8; 8];
        embed(&mut channels, BitsPerChannel::new(1).unwrap(), &[0xff]).unwrap();

        assert!(channels.iter().all(|c| *c == 0b1010_1011));
    }

    #[test]
    fn should_leave_channels_after_the_data_untouched() {
        let mut channels = vec![0xffu8; 10];
        embed(&mut channels, BitsPerChannel::new(4).unwrap(), &[0x00]).unwrap();

        assert_eq!(&channels[..2], &[0xf0, 0xf0]);
        assert_eq!(&channels[2..], &[0xff; 8]);
    }

    #[test]
    fn should_zero_pad_the_last_channel() {
        let mut channels = vec![0xffu8; 3];
        // 8 bits with k = 3 need 3 channels, the last one only gets 2 data bits
        embed(&mut channels, BitsPerChannel::new(3).unwrap(), &[0xff]).unwrap();

        assert_eq!(channels, vec![0xff, 0xff, 0b1111_1011]);
    }

    #[test]
    fn should_round_trip_for_every_k() {
        let data: Vec<u8> = (0..=255).collect();
        for k in all_k() {
            let mut channels = vec![0x5au8; 256 * 8];
            embed(&mut channels, k, &data).unwrap();
            assert_eq!(extract(&channels, k, data.len()), data, "k = {k}");
        }
    }

    #[test]
    fn should_reject_data_bigger_than_the_channels() {
        let mut channels = vec![0u8; 12];
        let original = channels.clone();
        let result = embed(&mut channels, BitsPerChannel::default(), &[0u8; 4]);

        match result {
            Err(SteganoError::Capacity {
                required,
                available,
            }) => {
                assert_eq!(required, 4);
                assert_eq!(available, 3);
            }
            other => panic!("expected a capacity error, got {other:?}"),
        }
        assert_eq!(channels, original);
    }

    #[test]
    fn should_fill_the_channels_exactly() {
        let k = BitsPerChannel::new(3).unwrap();
        let mut channels = vec![0u8; 16];
        let capacity = raw_capacity(channels.len(), k);
        assert_eq!(capacity, 6);

        let data = b"ABCDEF";
        embed(&mut channels, k, data).unwrap();
        assert_eq!(extract(&channels, k, capacity), data);
    }

    #[test]
    fn should_return_fewer_bytes_when_reading_past_the_end() {
        let channels = vec![0u8; 10];
        let k = BitsPerChannel::default();

        assert_eq!(extract(&channels, k, 100).len(), 2);
        assert!(extract(&channels, k, 0).is_empty());
    }

    #[test]
    fn should_append_behind_existing_data_without_touching_it() {
        for k in all_k() {
            let mut channels = vec![0xa5u8; 64];
            embed(&mut channels, k, b"abc").unwrap();
            embed_at(&mut channels, k, 3, b"defg").unwrap();

            assert_eq!(extract(&channels, k, 7), b"abcdefg", "k = {k}");
        }
    }

    #[test]
    fn should_keep_the_stream_bits_behind_an_unaligned_end() {
        let k = BitsPerChannel::new(3).unwrap();
        let mut channels = vec![0u8; 32];
        embed(&mut channels, k, &[0xff; 10]).unwrap();
        // byte 4 starts at bit 32 and ends at bit 40, both inside a channel
        embed_at(&mut channels, k, 4, &[0x00]).unwrap();

        assert_eq!(
            extract(&channels, k, 10),
            vec![0xff, 0xff, 0xff, 0xff, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn should_overwrite_in_the_middle_of_the_stream() {
        for k in all_k() {
            for offset in 0..8 {
                let mut channels = vec![0u8; 128];
                embed(&mut channels, k, &[0xff; 12]).unwrap();
                embed_at(&mut channels, k, offset, b"xyz").unwrap();

                let mut expected = vec![0xff; 12];
                expected[offset..offset + 3].copy_from_slice(b"xyz");
                assert_eq!(extract(&channels, k, 12), expected, "k = {k}, offset {offset}");
            }
        }
    }

    #[test]
    fn should_reject_appending_past_the_end() {
        let k = BitsPerChannel::default();
        let mut channels = vec![0u8; 16];

        assert!(embed_at(&mut channels, k, 3, b"ab").is_err());
        assert!(embed_at(&mut channels, k, 2, b"ab").is_ok());
    }
}
