//! 33-bit system clock reference values.
//!
//! An SCR is stored as five big-endian bytes. Only the lowest bit of the
//! first byte is ever set, so plain lexicographic byte comparison gives the
//! numeric order of the clock.

use crate::header::PACK_HEADER_LEN;
use crate::CLOCK_HZ;
use std::fmt;
use std::time::Duration;

/// Number of significant bits in a system clock reference.
pub const SCR_BITS: u32 = 33;

/// Largest representable clock value.
pub const SCR_MAX: u64 = (1 << SCR_BITS) - 1;

/// Positions of the SCR bits inside a pack header as `(byte, bit)` pairs.
///
/// Index 0 is the least significant bit of the clock. The gaps (bit 2 of
/// bytes 4, 6 and 8) are marker bits.
#[rustfmt::skip]
pub(crate) const SCR_BIT_LOCATIONS: [(usize, u8); SCR_BITS as usize] = [
    (8, 3), (8, 4), (8, 5), (8, 6), (8, 7),
    (7, 0), (7, 1), (7, 2), (7, 3), (7, 4), (7, 5), (7, 6), (7, 7),
    (6, 0), (6, 1), (6, 3), (6, 4), (6, 5), (6, 6), (6, 7),
    (5, 0), (5, 1), (5, 2), (5, 3), (5, 4), (5, 5), (5, 6), (5, 7),
    (4, 0), (4, 1), (4, 3), (4, 4), (4, 5),
];

/// A 33-bit MPEG system clock reference in 90 kHz ticks.
///
/// Ordering is the unsigned big-endian comparison of the five stored bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp([u8; 5]);

impl Timestamp {
    /// The zero timestamp.
    pub const ZERO: Self = Self([0; 5]);

    /// Extract the SCR bits from the first nine bytes of a pack header.
    ///
    /// The marker bits are not checked here; use
    /// [`header::extract`](crate::header::extract) for untrusted blocks.
    /// Returns `None` if the header is shorter than nine bytes.
    pub fn from_bits(header: &[u8]) -> Option<Self> {
        if header.len() < PACK_HEADER_LEN {
            return None;
        }

        let mut bytes = [0u8; 5];
        for (i, &(byte, bit)) in SCR_BIT_LOCATIONS.iter().enumerate() {
            let value = (header[byte] >> bit) & 1;
            bytes[4 - i / 8] |= value << (i % 8);
        }

        Some(Self(bytes))
    }

    /// Write the SCR bits into a pack header, leaving every other bit alone.
    ///
    /// This is the inverse of [`Timestamp::from_bits`].
    pub fn write_bits(&self, header: &mut [u8]) -> crate::Result<()> {
        if header.len() < PACK_HEADER_LEN {
            return Err(crate::Error::BufferUnderflow {
                need: PACK_HEADER_LEN,
                have: header.len(),
            });
        }

        for (i, &(byte, bit)) in SCR_BIT_LOCATIONS.iter().enumerate() {
            let value = (self.0[4 - i / 8] >> (i % 8)) & 1;
            header[byte] = (header[byte] & !(1 << bit)) | (value << bit);
        }

        Ok(())
    }

    /// Widen a 32-bit tick count. The top byte is always zero.
    pub const fn from_integer(value: u32) -> Self {
        let [b1, b2, b3, b4] = value.to_be_bytes();
        Self([0, b1, b2, b3, b4])
    }

    /// Build a timestamp from a tick count, keeping the low 33 bits.
    pub const fn from_ticks(ticks: u64) -> Self {
        let ticks = ticks & SCR_MAX;
        Self([
            (ticks >> 32) as u8,
            (ticks >> 24) as u8,
            (ticks >> 16) as u8,
            (ticks >> 8) as u8,
            ticks as u8,
        ])
    }

    /// Clock value in ticks.
    pub const fn ticks(&self) -> u64 {
        let b = self.0;
        ((b[0] as u64) << 32)
            | ((b[1] as u64) << 24)
            | ((b[2] as u64) << 16)
            | ((b[3] as u64) << 8)
            | b[4] as u64
    }

    /// Raw big-endian representation.
    pub const fn as_bytes(&self) -> &[u8; 5] {
        &self.0
    }

    /// Absolute difference between two timestamps.
    ///
    /// The smaller value is subtracted from the larger one byte by byte,
    /// carrying the borrow from the least significant byte upwards, so the
    /// result never underflows.
    pub fn difference(self, other: Self) -> Self {
        let (big, small) = if self >= other {
            (self, other)
        } else {
            (other, self)
        };

        let mut bytes = [0u8; 5];
        let mut borrow = 0u8;
        for i in (0..5).rev() {
            let (value, under1) = big.0[i].overflowing_sub(small.0[i]);
            let (value, under2) = value.overflowing_sub(borrow);
            bytes[i] = value;
            borrow = u8::from(under1 || under2);
        }
        debug_assert_eq!(borrow, 0);

        Self(bytes)
    }

    /// Wall-clock length of this many ticks.
    pub fn as_duration(&self) -> Duration {
        let ticks = self.ticks();
        let secs = ticks / CLOCK_HZ;
        let nanos = (ticks % CLOCK_HZ) * 1_000_000_000 / CLOCK_HZ;
        Duration::new(secs, nanos as u32)
    }
}

impl From<u32> for Timestamp {
    fn from(value: u32) -> Self {
        Self::from_integer(value)
    }
}

impl From<Timestamp> for u64 {
    fn from(value: Timestamp) -> Self {
        value.ticks()
    }
}

impl fmt::Display for Timestamp {
    /// Formats as `HH:MM:SS.mmm`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ticks = self.ticks();
        let millis = (ticks % CLOCK_HZ) * 1000 / CLOCK_HZ;
        let secs = ticks / CLOCK_HZ;
        write!(
            f,
            "{:02}:{:02}:{:02}.{:03}",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60,
            millis
        )
    }
}

#[cfg(feature = "serialize")]
impl serde::Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.ticks())
    }
}

#[cfg(feature = "serialize")]
impl<'de> serde::Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ticks = <u64 as serde::Deserialize>::deserialize(deserializer)?;
        if ticks > SCR_MAX {
            return Err(serde::de::Error::custom(format!(
                "clock value {} exceeds 33 bits",
                ticks
            )));
        }
        Ok(Self::from_ticks(ticks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_1: [u8; 9] = [0x00, 0x00, 0x01, 0xBA, 0x44, 0x06, 0x75, 0xFA, 0x9C];
    const HEADER_2: [u8; 9] = [0x00, 0x00, 0x01, 0xBA, 0x65, 0xC6, 0x04, 0x2F, 0x84];

    #[test]
    fn test_from_bits_known_headers() {
        let t1 = Timestamp::from_bits(&HEADER_1).unwrap();
        let t2 = Timestamp::from_bits(&HEADER_2).unwrap();

        assert_eq!(t1.as_bytes(), &[0x00, 0x00, 0x67, 0x3F, 0x53]);
        assert_eq!(t2.as_bytes(), &[0x01, 0x1C, 0x60, 0x05, 0xF0]);
        assert_eq!(t1, Timestamp::from_integer(6_766_419));
        assert_eq!(t2.ticks(), 4_771_022_320);
    }

    #[test]
    fn test_from_bits_short_header() {
        assert_eq!(Timestamp::from_bits(&HEADER_1[..8]), None);
        assert_eq!(Timestamp::from_bits(&[]), None);
    }

    #[test]
    fn test_compare() {
        let t1 = Timestamp::from_bits(&HEADER_1).unwrap();
        let t2 = Timestamp::from_bits(&HEADER_2).unwrap();

        assert_eq!(t1.cmp(&t1), std::cmp::Ordering::Equal);
        assert!(t1 < t2);
        assert!(t2 > t1);
        // Top byte dominates every lower byte.
        assert!(Timestamp::from_ticks(1 << 32) > Timestamp::from_integer(u32::MAX));
    }

    #[test]
    fn test_difference_known_values() {
        let t1 = Timestamp::from_bits(&HEADER_1).unwrap();
        let t2 = Timestamp::from_bits(&HEADER_2).unwrap();

        let d1 = t1.difference(t2);
        let d2 = t2.difference(t1);
        assert_eq!(d1, d2);
        assert_eq!(d1.as_bytes(), &[0x01, 0x1B, 0xF8, 0xC6, 0x9D]);

        // 07 00 34 34 - 05 00 88 88 borrows across two zero bytes.
        let a = Timestamp::from_integer(117_453_876);
        let b = Timestamp::from_integer(83_921_032);
        assert_eq!(a.difference(b), Timestamp::from_integer(33_532_844));
    }

    #[test]
    fn test_difference_identity_and_zero() {
        let t = Timestamp::from_integer(90_000);
        assert_eq!(t.difference(t), Timestamp::ZERO);
        assert_eq!(t.difference(Timestamp::ZERO), t);
        assert_eq!(
            Timestamp::from_ticks(SCR_MAX).difference(Timestamp::ZERO),
            Timestamp::from_ticks(SCR_MAX)
        );
    }

    #[test]
    fn test_write_bits_preserves_markers() {
        let mut header = [0x00, 0x00, 0x01, 0xBA, 0x44, 0x00, 0x04, 0x00, 0x04];
        let t = Timestamp::from_bits(&HEADER_2).unwrap();
        t.write_bits(&mut header).unwrap();

        assert_eq!(header, HEADER_2);
        assert_eq!(Timestamp::from_bits(&header), Some(t));
    }

    #[test]
    fn test_write_bits_short_buffer() {
        let mut header = [0u8; 4];
        let err = Timestamp::from_integer(1).write_bits(&mut header).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::BufferUnderflow { need: 9, have: 4 }
        ));
    }

    #[test]
    fn test_from_ticks_masks_to_33_bits() {
        assert_eq!(Timestamp::from_ticks(SCR_MAX + 1), Timestamp::ZERO);
        assert_eq!(Timestamp::from_ticks(SCR_MAX).as_bytes()[0], 0x01);
        assert_eq!(Timestamp::from_ticks(12_345).ticks(), 12_345);
    }

    #[test]
    fn test_display_and_duration() {
        let t = Timestamp::from_integer(90_000 * 3_723 + 45_000);
        assert_eq!(t.to_string(), "01:02:03.500");
        assert_eq!(t.as_duration(), Duration::from_millis(3_723_500));
        assert_eq!(Timestamp::ZERO.to_string(), "00:00:00.000");
    }
}
