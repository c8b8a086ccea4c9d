use core::cmp::Ordering;
use core::ops::{Add, Mul, Neg, Not, Sub};
use core::{fmt, str};

use thiserror::Error;

#[cfg(feature = "random")]
use rand::{
    distributions::{Distribution, Standard},
    Rng,
};

/// Errors raised by 64-bit integer operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Int64Error {
    /// The divisor of a division or remainder operation was zero.
    #[error("division by zero")]
    DivisionByZero,
    /// A radix other than 10 or 16 was requested for rendering.
    #[error("unsupported radix {0}")]
    UnsupportedRadix(u32),
}

macro_rules! signed64 {
    ($i:ident) => {
        impl $i {
            /// The smallest representable value.
            pub const MIN: $i = $i(i64::MIN);
            /// The largest representable value.
            pub const MAX: $i = $i(i64::MAX);
            /// Zero.
            pub const ZERO: $i = $i(0);
            /// One.
            pub const ONE: $i = $i(1);
            /// Negative one.
            pub const NEG_ONE: $i = $i(-1);

            /// Wire size of the type in bytes.
            pub const LEN: usize = 8;

            /// Builds from a host integer, sign-extending into the high half.
            pub const fn from_int(value: i32) -> Self {
                Self(value as i64)
            }

            /// Reassembles from the two signed 32-bit halves, without
            /// interpretation.
            pub const fn from_bits(low: i32, high: i32) -> Self {
                Self(((high as i64) << 32) | (low as u32 as i64))
            }

            /// Converts a floating-point value, truncating towards zero.
            ///
            /// NaN and both infinities map to zero; values at or beyond the
            /// representable range saturate at [`Self::MIN`] / [`Self::MAX`].
            pub fn from_number(value: f64) -> Self {
                if value.is_nan() || value.is_infinite() {
                    Self::ZERO
                } else if value <= i64::MIN as f64 {
                    Self::MIN
                } else if value >= i64::MAX as f64 {
                    Self::MAX
                } else if value < 0.0 {
                    Self::from_number(-value).negate()
                } else {
                    Self(value as i64)
                }
            }

            /// The closest floating-point representation of this value.
            pub fn to_number(self) -> f64 {
                self.0 as f64
            }

            /// The underlying signed 64-bit value.
            pub const fn as_i64(self) -> i64 {
                self.0
            }

            /// The low signed 32-bit half.
            pub const fn low(self) -> i32 {
                self.0 as i32
            }

            /// The high signed 32-bit half.
            pub const fn high(self) -> i32 {
                (self.0 >> 32) as i32
            }

            /// Truncates to the low 32 bits.
            pub const fn to_int(self) -> i32 {
                self.0 as i32
            }

            /// Whether the value is zero.
            pub const fn is_zero(self) -> bool {
                self.0 == 0
            }

            /// Whether the value is strictly negative.
            pub const fn is_negative(self) -> bool {
                self.0 < 0
            }

            /// Whether the low bit is set.
            pub const fn is_odd(self) -> bool {
                (self.0 & 1) == 1
            }

            /// Two's-complement negation. `MIN` negates to itself.
            pub const fn negate(self) -> Self {
                Self(self.0.wrapping_neg())
            }

            /// Truncated signed division.
            ///
            /// `MIN / -1` wraps to `MIN`, consistent with two's-complement
            /// overflow.
            pub fn divide(self, other: Self) -> Result<Self, Int64Error> {
                if other.is_zero() {
                    return Err(Int64Error::DivisionByZero);
                }
                Ok(Self(self.0.wrapping_div(other.0)))
            }

            /// Remainder consistent with [`Self::divide`].
            pub fn modulo(self, other: Self) -> Result<Self, Int64Error> {
                if other.is_zero() {
                    return Err(Int64Error::DivisionByZero);
                }
                Ok(Self(self.0.wrapping_rem(other.0)))
            }

            /// Three-way comparison returning -1, 0 or 1.
            pub fn compare(self, other: Self) -> i32 {
                match self.cmp(&other) {
                    Ordering::Less => -1,
                    Ordering::Equal => 0,
                    Ordering::Greater => 1,
                }
            }

            /// Arithmetic right shift; the count is taken modulo 64.
            pub const fn shift_right(self, count: u32) -> Self {
                Self(self.0 >> (count & 63))
            }

            /// Logical left shift; the count is taken modulo 64.
            pub const fn shift_left(self, count: u32) -> Self {
                Self(self.0 << (count & 63))
            }

            /// Renders in the given radix. Only 10 and 16 are supported.
            pub fn to_string_radix(self, radix: u32) -> Result<String, Int64Error> {
                match radix {
                    10 => Ok(self.0.to_string()),
                    16 => {
                        // Widen so negating MIN cannot overflow.
                        let value = self.0 as i128;
                        if value < 0 {
                            Ok(format!("-{:x}", -value))
                        } else {
                            Ok(format!("{:x}", value))
                        }
                    }
                    radix => Err(Int64Error::UnsupportedRadix(radix)),
                }
            }

            /// Encodes the value as the little-endian wire pair
            /// `(low, high)`.
            pub const fn to_le_bytes(self) -> [u8; 8] {
                self.0.to_le_bytes()
            }

            /// Decodes from the little-endian wire pair.
            pub const fn from_le_bytes(bytes: [u8; 8]) -> Self {
                Self(i64::from_le_bytes(bytes))
            }
        }

        impl From<i64> for $i {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$i> for i64 {
            fn from(value: $i) -> i64 {
                value.0
            }
        }

        impl From<i32> for $i {
            fn from(value: i32) -> Self {
                Self::from_int(value)
            }
        }

        impl Add for $i {
            type Output = $i;

            #[inline(always)]
            fn add(self, rhs: $i) -> $i {
                $i(self.0.wrapping_add(rhs.0))
            }
        }

        impl Sub for $i {
            type Output = $i;

            #[inline(always)]
            fn sub(self, rhs: $i) -> $i {
                $i(self.0.wrapping_sub(rhs.0))
            }
        }

        impl Mul for $i {
            type Output = $i;

            #[inline(always)]
            fn mul(self, rhs: $i) -> $i {
                $i(self.0.wrapping_mul(rhs.0))
            }
        }

        impl Neg for $i {
            type Output = $i;

            fn neg(self) -> $i {
                self.negate()
            }
        }

        impl Not for $i {
            type Output = $i;

            fn not(self) -> $i {
                $i(!self.0)
            }
        }

        impl fmt::Display for $i {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl fmt::Debug for $i {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($i), "({})"), self.0)
            }
        }

        impl fmt::LowerHex for $i {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::LowerHex::fmt(&self.0, f)
            }
        }

        impl str::FromStr for $i {
            type Err = core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<i64>().map(Self)
            }
        }

        #[cfg(feature = "random")]
        impl Distribution<$i> for Standard {
            fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> $i {
                $i(rng.gen())
            }
        }
    };
}

/// Signed 64-bit integer of the BDoc value model.
///
/// Stored natively; the two signed 32-bit halves of the wire form are
/// available through [`Int64::low`], [`Int64::high`] and
/// [`Int64::from_bits`]. All arithmetic wraps modulo 2⁶⁴ except
/// [`Int64::divide`], which reports a zero divisor.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[repr(transparent)]
pub struct Int64(i64);

signed64!(Int64);

/// Internal timestamp of the BDoc value model.
///
/// Shares the representation and arithmetic of [`Int64`] but is a distinct
/// type so a decoded timestamp re-encodes under its own tag.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[repr(transparent)]
pub struct Timestamp(i64);

signed64!(Timestamp);

impl Timestamp {
    /// Composes from the opaque `(low, high)` pair carried on the wire.
    pub const fn from_pair(low: u32, high: u32) -> Self {
        Self::from_bits(low as i32, high as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_round_trip() {
        for value in [0i64, 1, -1, i64::MIN, i64::MAX, 0x0123_4567_89ab_cdef] {
            let long = Int64::from(value);
            assert_eq!(Int64::from_bits(long.low(), long.high()), long);
        }
    }

    #[test]
    fn from_int_sign_extends() {
        assert_eq!(Int64::from_int(-1).high(), -1);
        assert_eq!(Int64::from_int(-1).low(), -1);
        assert_eq!(Int64::from_int(7).high(), 0);
        assert_eq!(Int64::from_int(7).low(), 7);
    }

    #[test]
    fn from_number_edges() {
        assert_eq!(Int64::from_number(f64::NAN), Int64::ZERO);
        assert_eq!(Int64::from_number(f64::INFINITY), Int64::ZERO);
        assert_eq!(Int64::from_number(f64::NEG_INFINITY), Int64::ZERO);
        assert_eq!(Int64::from_number(-1e300), Int64::MIN);
        assert_eq!(Int64::from_number(1e300), Int64::MAX);
        assert_eq!(Int64::from_number(-2.9), Int64::from(-2));
        assert_eq!(Int64::from_number(2.9), Int64::from(2));
        assert_eq!(Int64::from_number(4294967296.0), Int64::from(1i64 << 32));
    }

    #[test]
    fn negate_min_saturates() {
        assert_eq!(Int64::MIN.negate(), Int64::MIN);
        assert_eq!((-Int64::from(5)), Int64::from(-5));
        assert_eq!(Int64::from(5).negate().negate(), Int64::from(5));
    }

    #[test]
    fn arithmetic_matches_host() {
        let pairs = [
            (0i64, 0i64),
            (1, -1),
            (i64::MAX, 1),
            (i64::MIN, -1),
            (123_456_789_012, -987_654_321),
            (-5, 3),
        ];
        for (a, b) in pairs {
            let (x, y) = (Int64::from(a), Int64::from(b));
            assert_eq!((x + y).as_i64(), a.wrapping_add(b));
            assert_eq!((x - y).as_i64(), a.wrapping_sub(b));
            assert_eq!((x * y).as_i64(), a.wrapping_mul(b));
            if b != 0 {
                assert_eq!(x.divide(y).unwrap().as_i64(), a.wrapping_div(b));
                assert_eq!(x.modulo(y).unwrap().as_i64(), a.wrapping_rem(b));
            }
        }
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            Int64::ONE.divide(Int64::ZERO),
            Err(Int64Error::DivisionByZero)
        );
        assert_eq!(
            Int64::ONE.modulo(Int64::ZERO),
            Err(Int64Error::DivisionByZero)
        );
    }

    #[test]
    fn division_overflow_wraps() {
        assert_eq!(Int64::MIN.divide(Int64::NEG_ONE), Ok(Int64::MIN));
    }

    #[test]
    fn compare_signs() {
        assert_eq!(Int64::from(-1).compare(Int64::from(1)), -1);
        assert_eq!(Int64::from(1).compare(Int64::from(-1)), 1);
        assert_eq!(Int64::from(42).compare(Int64::from(42)), 0);
        assert_eq!(Int64::MIN.compare(Int64::MAX), -1);
    }

    #[test]
    fn shifts() {
        let value = Int64::from(-8);
        // Arithmetic right shift preserves the sign.
        assert_eq!(value.shift_right(1), Int64::from(-4));
        // Count is modulo 64.
        assert_eq!(value.shift_right(64), value);
        assert_eq!(value.shift_left(64), value);
        // Left-then-right of a shifted value clears the low bits.
        let value = Int64::from(0b1011);
        assert_eq!(value.shift_right(2).shift_left(2), Int64::from(0b1000));
    }

    #[test]
    fn radix_rendering() {
        assert_eq!(Int64::from(255).to_string_radix(10).unwrap(), "255");
        assert_eq!(Int64::from(255).to_string_radix(16).unwrap(), "ff");
        assert_eq!(Int64::from(-255).to_string_radix(16).unwrap(), "-ff");
        assert_eq!(
            Int64::MIN.to_string_radix(16).unwrap(),
            "-8000000000000000"
        );
        assert_eq!(
            Int64::MIN.to_string_radix(10).unwrap(),
            "-9223372036854775808"
        );
        assert_eq!(
            Int64::from(10).to_string_radix(2),
            Err(Int64Error::UnsupportedRadix(2))
        );
    }

    #[test]
    fn wire_bytes_are_little_endian_pair() {
        let long = Int64::from_bits(0x0403_0201, 0x0807_0605);
        assert_eq!(
            long.to_le_bytes(),
            [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]
        );
        assert_eq!(Int64::from_le_bytes(long.to_le_bytes()), long);
    }

    #[test]
    fn timestamp_pair() {
        let ts = Timestamp::from_pair(0xffff_ffff, 0);
        assert_eq!(ts.as_i64(), u32::MAX as i64);
        assert_eq!(ts.low(), -1);
        assert_eq!(ts.high(), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_transparent() {
        let long = Int64::from(-42);
        assert_eq!(serde_json::to_string(&long).unwrap(), "-42");
        let back: Int64 = serde_json::from_str("-42").unwrap();
        assert_eq!(back, long);
    }
}
