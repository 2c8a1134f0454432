use crate::error::TypesError;
use crate::WORD_BYTES;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// 256-bit unsigned machine word.
///
/// Stored as 4 x u64 in little-endian limb order.
/// Arithmetic wraps modulo 2^256; carries and borrows are propagated
/// explicitly across limbs, so no value outside [0, 2^256) is observable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct U256([u64; 4]); // [low, mid_low, mid_high, high] little-endian limbs

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..4).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl U256 {
    pub const ZERO: Self = Self([0, 0, 0, 0]);
    pub const ONE: Self = Self([1, 0, 0, 0]);
    pub const MAX: Self = Self([u64::MAX, u64::MAX, u64::MAX, u64::MAX]);

    pub const fn from_limbs(limbs: [u64; 4]) -> Self {
        Self(limbs)
    }

    /// Create from a u64 value
    pub const fn from_u64(val: u64) -> Self {
        Self([val, 0, 0, 0])
    }

    /// Create from a u128 value
    pub const fn from_u128(val: u128) -> Self {
        let low = val as u64;
        let high = (val >> 64) as u64;
        Self([low, high, 0, 0])
    }

    /// Machine boolean: one for true, zero for false.
    pub const fn from_bool(flag: bool) -> Self {
        if flag {
            Self::ONE
        } else {
            Self::ZERO
        }
    }

    /// Addition returning the wrapped sum and whether a carry fell off the top.
    pub fn overflowing_add(&self, rhs: &Self) -> (Self, bool) {
        let mut result = [0u64; 4];
        let mut carry = false;

        for i in 0..4 {
            let (sum1, overflow1) = self.0[i].overflowing_add(rhs.0[i]);
            let (sum2, overflow2) = sum1.overflowing_add(carry as u64);
            result[i] = sum2;
            carry = overflow1 | overflow2;
        }

        (Self(result), carry)
    }

    /// Subtraction returning the wrapped difference and whether a borrow was needed.
    pub fn overflowing_sub(&self, rhs: &Self) -> (Self, bool) {
        let mut result = [0u64; 4];
        let mut borrow = false;

        for i in 0..4 {
            let (diff1, underflow1) = self.0[i].overflowing_sub(rhs.0[i]);
            let (diff2, underflow2) = diff1.overflowing_sub(borrow as u64);
            result[i] = diff2;
            borrow = underflow1 | underflow2;
        }

        (Self(result), borrow)
    }

    /// Addition modulo 2^256
    pub fn wrapping_add(&self, rhs: &Self) -> Self {
        self.overflowing_add(rhs).0
    }

    /// Subtraction modulo 2^256
    pub fn wrapping_sub(&self, rhs: &Self) -> Self {
        self.overflowing_sub(rhs).0
    }

    /// Checked addition
    pub fn checked_add(&self, rhs: &Self) -> Option<Self> {
        match self.overflowing_add(rhs) {
            (sum, false) => Some(sum),
            (_, true) => None,
        }
    }

    /// Multiply by a small factor, reporting overflow.
    pub fn overflowing_mul_u64(&self, rhs: u64) -> (Self, bool) {
        let mut result = [0u64; 4];
        let mut carry = 0u128;

        for i in 0..4 {
            let product = (self.0[i] as u128) * (rhs as u128) + carry;
            result[i] = product as u64;
            carry = product >> 64;
        }

        (Self(result), carry != 0)
    }

    /// Divide by a small non-zero divisor, returning quotient and remainder.
    pub fn div_rem_u64(&self, divisor: u64) -> Option<(Self, u64)> {
        if divisor == 0 {
            return None;
        }

        let mut quotient = [0u64; 4];
        let mut rem = 0u128;

        for i in (0..4).rev() {
            let acc = (rem << 64) | self.0[i] as u128;
            quotient[i] = (acc / divisor as u128) as u64;
            rem = acc % divisor as u128;
        }

        Some((Self(quotient), rem as u64))
    }

    /// Logical shift right; shifts of 256 or more yield zero.
    pub fn shift_right(&self, shift: u32) -> Self {
        if shift >= 256 {
            return Self::ZERO;
        }

        let limb_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;

        let mut result = [0u64; 4];

        for i in 0..(4 - limb_shift) {
            let src = i + limb_shift;
            result[i] = self.0[src] >> bit_shift;

            if bit_shift > 0 && src + 1 < 4 {
                result[i] |= self.0[src + 1] << (64 - bit_shift);
            }
        }

        Self(result)
    }

    /// Shift right by a word-sized amount.
    pub fn shr_word(&self, shift: &Self) -> Self {
        match shift.to_u64() {
            Some(s) if s < 256 => self.shift_right(s as u32),
            _ => Self::ZERO,
        }
    }

    /// Get bit at position
    pub fn bit(&self, pos: u32) -> bool {
        if pos >= 256 {
            return false;
        }
        let limb = (pos / 64) as usize;
        let bit = pos % 64;
        (self.0[limb] >> bit) & 1 != 0
    }

    /// Sign bit under a two's complement reading.
    pub fn is_negative(&self) -> bool {
        self.bit(255)
    }

    /// Signed (two's complement) less-than.
    pub fn slt(&self, rhs: &Self) -> bool {
        match (self.is_negative(), rhs.is_negative()) {
            (true, false) => true,
            (false, true) => false,
            _ => self < rhs,
        }
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&l| l == 0)
    }

    /// Value as u64, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0[1] != 0 || self.0[2] != 0 || self.0[3] != 0 {
            None
        } else {
            Some(self.0[0])
        }
    }

    /// Value as usize, if it fits. Offsets and jump targets go through here.
    pub fn to_usize(&self) -> Option<usize> {
        self.to_u64().and_then(|v| usize::try_from(v).ok())
    }

    /// Convert to big-endian bytes
    pub fn to_be_bytes(&self) -> [u8; WORD_BYTES] {
        let mut bytes = [0u8; WORD_BYTES];
        for i in 0..4 {
            let limb_bytes = self.0[3 - i].to_be_bytes();
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&limb_bytes);
        }
        bytes
    }

    /// Convert from big-endian bytes
    pub fn from_be_bytes(bytes: [u8; WORD_BYTES]) -> Self {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let mut limb_bytes = [0u8; 8];
            limb_bytes.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            limbs[3 - i] = u64::from_be_bytes(limb_bytes);
        }
        Self(limbs)
    }

    /// Big-endian bytes of at most 32, left-padded with zeros.
    pub fn from_be_slice(bytes: &[u8]) -> Result<Self, TypesError> {
        if bytes.len() > WORD_BYTES {
            return Err(TypesError::WordTooLong(bytes.len()));
        }
        let mut padded = [0u8; WORD_BYTES];
        padded[WORD_BYTES - bytes.len()..].copy_from_slice(bytes);
        Ok(Self::from_be_bytes(padded))
    }

    /// Parse from decimal string
    pub fn from_decimal_str(s: &str) -> Result<Self, TypesError> {
        if s.is_empty() {
            return Err(TypesError::InvalidU256String(s.to_string()));
        }

        let mut result = Self::ZERO;

        for c in s.chars() {
            let digit = c
                .to_digit(10)
                .ok_or_else(|| TypesError::InvalidU256String(s.to_string()))?;
            let (scaled, overflow) = result.overflowing_mul_u64(10);
            if overflow {
                return Err(TypesError::U256Overflow);
            }
            result = scaled
                .checked_add(&Self::from_u64(digit as u64))
                .ok_or(TypesError::U256Overflow)?;
        }

        Ok(result)
    }
}

impl From<u64> for U256 {
    fn from(val: u64) -> Self {
        Self::from_u64(val)
    }
}

impl From<u128> for U256 {
    fn from(val: u128) -> Self {
        Self::from_u128(val)
    }
}

impl From<u32> for U256 {
    fn from(val: u32) -> Self {
        Self::from_u64(val as u64)
    }
}

impl From<u8> for U256 {
    fn from(val: u8) -> Self {
        Self::from_u64(val as u64)
    }
}

impl From<usize> for U256 {
    fn from(val: usize) -> Self {
        Self::from_u64(val as u64)
    }
}

impl From<bool> for U256 {
    fn from(flag: bool) -> Self {
        Self::from_bool(flag)
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }

        let mut n = *self;
        let mut digits = Vec::new();

        while !n.is_zero() {
            let Some((q, r)) = n.div_rem_u64(10) else {
                return Err(fmt::Error);
            };
            digits.push(b'0' + r as u8);
            n = q;
        }
        digits.reverse();

        f.write_str(&String::from_utf8_lossy(&digits))
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256({})", self)
    }
}

impl fmt::LowerHex for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_be_bytes()))
    }
}

impl FromStr for U256 {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            // Odd-length hex is accepted by left-padding one nibble.
            let bytes = if digits.len() % 2 == 1 {
                hex::decode(format!("0{}", digits))?
            } else {
                hex::decode(digits)?
            };
            if bytes.len() > WORD_BYTES {
                return Err(TypesError::U256Overflow);
            }
            Self::from_be_slice(&bytes)
        } else {
            Self::from_decimal_str(s)
        }
    }
}

impl Add for U256 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.wrapping_add(&rhs)
    }
}

impl Sub for U256 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.wrapping_sub(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_u256_zero_one_max() {
        assert_eq!(U256::ZERO, U256([0, 0, 0, 0]));
        assert_eq!(U256::ONE, U256([1, 0, 0, 0]));
        assert_eq!(U256::MAX, U256([u64::MAX, u64::MAX, u64::MAX, u64::MAX]));
    }

    #[test]
    fn test_u256_from_u128() {
        let val: u128 = 0x1234567890abcdef_1122334455667788;
        let u256 = U256::from(val);
        assert_eq!(u256.0[0], 0x1122334455667788);
        assert_eq!(u256.0[1], 0x1234567890abcdef);
        assert_eq!(u256.0[2], 0);
        assert_eq!(u256.0[3], 0);
    }

    #[test]
    fn test_u256_add_carries_across_limbs() {
        let a = U256::from(u64::MAX);
        assert_eq!(a + U256::ONE, U256([0, 1, 0, 0]));
    }

    #[test]
    fn test_u256_add_wraps() {
        assert_eq!(U256::MAX + U256::ONE, U256::ZERO);
        assert_eq!(U256::MAX.overflowing_add(&U256::from(2u64)), (U256::ONE, true));
        assert!(U256::MAX.checked_add(&U256::ONE).is_none());
    }

    #[test]
    fn test_u256_sub_wraps() {
        assert_eq!(U256::ZERO - U256::ONE, U256::MAX);
        assert_eq!(U256::from(300u64) - U256::from(200u64), U256::from(100u64));
        assert_eq!(U256::ONE.overflowing_sub(&U256::from(2u64)), (U256::MAX, true));
    }

    #[test]
    fn test_u256_sub_borrows_across_limbs() {
        let a = U256([0, 1, 0, 0]);
        assert_eq!(a - U256::ONE, U256::from(u64::MAX));
    }

    #[test]
    fn test_u256_shr_extracts_selector() {
        let mut word = [0u8; 32];
        word[..4].copy_from_slice(&[0xcd, 0xfe, 0xad, 0x2e]);
        word[4] = 0xff;
        let value = U256::from_be_bytes(word);
        assert_eq!(value.shift_right(0xe0), U256::from(0xcdfead2eu64));
        assert_eq!(value.shr_word(&U256::from(0xe0u64)), U256::from(0xcdfead2eu64));
    }

    #[test]
    fn test_u256_shift_out_of_range() {
        assert_eq!(U256::MAX.shift_right(256), U256::ZERO);
        assert_eq!(U256::MAX.shift_right(255), U256::ONE);
        assert_eq!(U256::MAX.shr_word(&U256::MAX), U256::ZERO);
    }

    #[test]
    fn test_u256_signed_less_than() {
        let minus_one = U256::MAX;
        assert!(minus_one.slt(&U256::ZERO));
        assert!(!U256::ZERO.slt(&minus_one));
        assert!(U256::from(31u64).slt(&U256::from(32u64)));
        assert!(!U256::from(32u64).slt(&U256::from(32u64)));
        // Unsigned order disagrees for negative values.
        assert!(minus_one > U256::ZERO);
    }

    #[test]
    fn test_u256_to_usize() {
        assert_eq!(U256::from(0x80u64).to_usize(), Some(0x80));
        assert_eq!(U256([0, 1, 0, 0]).to_usize(), None);
        assert_eq!(U256::MAX.to_usize(), None);
    }

    #[test]
    fn test_u256_from_be_slice() {
        assert_eq!(U256::from_be_slice(&[0x01, 0x00]).unwrap(), U256::from(256u64));
        assert_eq!(U256::from_be_slice(&[]).unwrap(), U256::ZERO);
        assert!(matches!(
            U256::from_be_slice(&[0u8; 33]),
            Err(TypesError::WordTooLong(33))
        ));
    }

    #[test]
    fn test_u256_decimal_display() {
        assert_eq!(format!("{}", U256::ZERO), "0");
        assert_eq!(format!("{}", U256::from(12345u64)), "12345");
        assert_eq!(
            format!("{}", U256::MAX),
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
    }

    #[test]
    fn test_u256_lower_hex() {
        assert_eq!(
            format!("{:x}", U256::from(42u64)),
            "0x000000000000000000000000000000000000000000000000000000000000002a"
        );
    }

    #[test]
    fn test_u256_from_str() {
        assert_eq!(U256::from_str("0").unwrap(), U256::ZERO);
        assert_eq!(U256::from_str("12345").unwrap(), U256::from(12345u64));
        assert_eq!(U256::from_str("0x00").unwrap(), U256::ZERO);
        assert_eq!(U256::from_str("0xFF").unwrap(), U256::from(255u64));
        assert_eq!(U256::from_str("0x2a").unwrap(), U256::from(42u64));
        assert_eq!(U256::from_str("0xabc").unwrap(), U256::from(0xabcu64));
        assert!(U256::from_str("").is_err());
        assert!(U256::from_str("12a").is_err());
        assert!(matches!(
            U256::from_str(&format!("0x{}", "11".repeat(33))),
            Err(TypesError::U256Overflow)
        ));
    }

    #[test]
    fn test_u256_decimal_overflow() {
        let max = U256::MAX.to_string();
        assert_eq!(U256::from_str(&max).unwrap(), U256::MAX);
        let too_big = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(matches!(U256::from_str(too_big), Err(TypesError::U256Overflow)));
    }

    #[test]
    fn test_u256_ordering() {
        assert!(U256::from(100u64) > U256::from(50u64));
        assert!(U256([0, 0, 0, 1]) > U256([u64::MAX, u64::MAX, u64::MAX, 0]));
    }

    proptest! {
        #[test]
        fn prop_add_then_sub_is_identity(a in any::<[u64; 4]>(), b in any::<[u64; 4]>()) {
            let (a, b) = (U256::from_limbs(a), U256::from_limbs(b));
            prop_assert_eq!((a + b) - b, a);
        }

        #[test]
        fn prop_add_matches_u128_below_limb_boundary(a in any::<u64>(), b in any::<u64>()) {
            let sum = U256::from(a) + U256::from(b);
            prop_assert_eq!(sum, U256::from(a as u128 + b as u128));
        }

        #[test]
        fn prop_display_parses_back(limbs in any::<[u64; 4]>()) {
            let value = U256::from_limbs(limbs);
            prop_assert_eq!(U256::from_str(&value.to_string()).unwrap(), value);
            prop_assert_eq!(U256::from_str(&format!("{:x}", value)).unwrap(), value);
        }
    }
}
