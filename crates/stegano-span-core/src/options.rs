use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::SteganoError;

/// Number of low bits used in every color channel, always within 1 to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitsPerChannel(u8);

impl BitsPerChannel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(bits: u8) -> Result<Self, SteganoError> {
        if (Self::MIN..=Self::MAX).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(SteganoError::InvalidBitsPerChannel(bits))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// mask that selects the bits of a channel that carry data
    pub fn mask(self) -> u8 {
        (1 << self.0) - 1
    }
}

impl Default for BitsPerChannel {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u8> for BitsPerChannel {
    type Error = SteganoError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl Display for BitsPerChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decides in which order the images receive the chunks of a message.
///
/// Both policies produce the same on-image format, every segment header carries its own
/// offset, so a message written with either policy is read by the same decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placement {
    /// Fill the images in the given order, each one until its free space is exhausted.
    #[default]
    SequentialFill,
    /// Fill the images with the most free space first, ties keep the given order.
    WidestFirst,
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "sequential-fill" => Ok(Self::SequentialFill),
            "widest" | "widest-first" => Ok(Self::WidestFirst),
            other => Err(format!(
                "unknown placement `{other}`, expected `sequential` or `widest-first`"
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanOptions {
    /// How many low bits of every color channel carry data.
    ///
    /// Note this number influences the capacity directly, and must be the same for hiding and unveiling.
    pub bits_per_channel: BitsPerChannel,

    /// The order in which images are filled when hiding
    pub placement: Placement,

    /// Upper bound of consecutive bytes the segment scanner skips while looking for the next
    /// header, a header `window` bytes behind the last segment is still found.
    /// `Some(0)` disables resync, `None` scans until the end of the image.
    pub max_resync_window: Option<usize>,
}

impl SpanOptions {
    pub fn with_bits_per_channel(mut self, bits_per_channel: BitsPerChannel) -> Self {
        self.bits_per_channel = bits_per_channel;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_max_resync_window(mut self, window: Option<usize>) -> Self {
        self.max_resync_window = window;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_one_to_four_bits() {
        for bits in 1..=4 {
            assert_eq!(BitsPerChannel::new(bits).unwrap().get(), bits);
        }
    }

    #[test]
    fn should_reject_zero_and_more_than_four_bits() {
        for bits in [0, 5, 8, 255] {
            match BitsPerChannel::try_from(bits) {
                Err(SteganoError::InvalidBitsPerChannel(b)) => assert_eq!(b, bits),
                other => panic!("unexpected result for {bits}: {other:?}"),
            }
        }
    }

    #[test]
    fn should_build_masks() {
        let masks: Vec<u8> = (1..=4)
            .map(|b| BitsPerChannel::new(b).unwrap().mask())
            .collect();
        assert_eq!(masks, vec![0b1, 0b11, 0b111, 0b1111]);
    }

    #[test]
    fn should_default_to_two_bits_and_sequential_fill() {
        let opts = SpanOptions::default();
        assert_eq!(opts.bits_per_channel.get(), 2);
        assert_eq!(opts.placement, Placement::SequentialFill);
        assert_eq!(opts.max_resync_window, None);
    }

    #[test]
    fn should_parse_placements() {
        assert_eq!(
            "sequential".parse::<Placement>().unwrap(),
            Placement::SequentialFill
        );
        assert_eq!(
            "Widest-First".parse::<Placement>().unwrap(),
            Placement::WidestFirst
        );
        assert!("random".parse::<Placement>().is_err());
    }
}
