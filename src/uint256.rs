//! Checked 256-bit unsigned arithmetic for targets and chain work

use serde::{Deserialize, Serialize};

/// 256-bit unsigned integer as four little-endian-ordered 64-bit limbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct U256([u64; 4]);

impl U256 {
    pub const ZERO: U256 = U256([0; 4]);
    pub const ONE: U256 = U256([1, 0, 0, 0]);
    pub const MAX: U256 = U256([u64::MAX; 4]);

    /// Build from limbs, least significant first.
    pub const fn from_limbs(limbs: [u64; 4]) -> Self {
        U256(limbs)
    }

    pub const fn from_u64(value: u64) -> Self {
        U256([value, 0, 0, 0])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&limb| limb == 0)
    }

    /// Least significant 64 bits.
    pub fn get_low_64(&self) -> u64 {
        self.0[0]
    }

    /// Interpret 32 bytes as a little-endian integer.
    pub fn from_le_bytes(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            *limb = u64::from_le_bytes(chunk);
        }
        U256(limbs)
    }

    pub fn to_le_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, &limb) in self.0.iter().enumerate() {
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_le_bytes());
        }
        bytes
    }

    /// Position of the highest set bit, or `None` for zero.
    pub fn highest_set_bit(&self) -> Option<u32> {
        for (i, &limb) in self.0.iter().enumerate().rev() {
            if limb != 0 {
                return Some(i as u32 * 64 + (63 - limb.leading_zeros()));
            }
        }
        None
    }

    pub fn shl(&self, shift: u32) -> Self {
        if shift >= 256 {
            return U256::ZERO;
        }

        let mut result = U256::ZERO;
        let limb_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;

        for i in 0..4 {
            if i + limb_shift < 4 {
                result.0[i + limb_shift] |= self.0[i] << bit_shift;
                if bit_shift > 0 && i + limb_shift + 1 < 4 {
                    result.0[i + limb_shift + 1] |= self.0[i] >> (64 - bit_shift);
                }
            }
        }

        result
    }

    pub fn shr(&self, shift: u32) -> Self {
        if shift >= 256 {
            return U256::ZERO;
        }

        let mut result = U256::ZERO;
        let limb_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;

        for i in limb_shift..4 {
            result.0[i - limb_shift] |= self.0[i] >> bit_shift;
            if bit_shift > 0 && i > limb_shift {
                result.0[i - limb_shift - 1] |= self.0[i] << (64 - bit_shift);
            }
        }

        result
    }

    pub fn checked_add(&self, rhs: U256) -> Option<Self> {
        let mut result = U256::ZERO;
        let mut carry = 0u64;

        for i in 0..4 {
            let (sum, overflow_a) = self.0[i].overflowing_add(rhs.0[i]);
            let (sum, overflow_b) = sum.overflowing_add(carry);
            result.0[i] = sum;
            carry = u64::from(overflow_a) + u64::from(overflow_b);
        }

        if carry > 0 {
            return None;
        }
        Some(result)
    }

    pub fn checked_sub(&self, rhs: U256) -> Option<Self> {
        let mut result = U256::ZERO;
        let mut borrow = 0u64;

        for i in 0..4 {
            let (diff, underflow_a) = self.0[i].overflowing_sub(rhs.0[i]);
            let (diff, underflow_b) = diff.overflowing_sub(borrow);
            result.0[i] = diff;
            borrow = u64::from(underflow_a) + u64::from(underflow_b);
        }

        if borrow > 0 {
            return None;
        }
        Some(result)
    }

    /// Multiply by a 64-bit factor, `None` on overflow past 256 bits.
    pub fn checked_mul_u64(&self, rhs: u64) -> Option<Self> {
        let mut result = U256::ZERO;
        let mut carry = 0u128;

        for i in 0..4 {
            let product = (self.0[i] as u128) * (rhs as u128) + carry;
            result.0[i] = product as u64;
            carry = product >> 64;
        }

        if carry > 0 {
            return None;
        }
        Some(result)
    }

    /// Truncating division by a 64-bit divisor.
    ///
    /// A zero divisor yields `U256::MAX` as an error indicator; callers
    /// divide by protocol constants that are never zero.
    pub fn div_u64(&self, rhs: u64) -> Self {
        if rhs == 0 {
            return U256::MAX;
        }

        let mut remainder = 0u128;
        let mut result = U256::ZERO;

        for i in (0..4).rev() {
            let dividend = (remainder << 64) | (self.0[i] as u128);
            result.0[i] = (dividend / (rhs as u128)) as u64;
            remainder = dividend % (rhs as u128);
        }

        result
    }

    /// Truncating division by a full-width divisor, via shift-and-subtract.
    ///
    /// A zero divisor yields `U256::MAX` as an error indicator.
    pub fn div(&self, rhs: U256) -> Self {
        if rhs.is_zero() {
            return U256::MAX;
        }
        let (Some(num_bits), Some(div_bits)) = (self.highest_set_bit(), rhs.highest_set_bit())
        else {
            return U256::ZERO;
        };
        if num_bits < div_bits {
            return U256::ZERO;
        }

        let mut quotient = U256::ZERO;
        let mut remainder = *self;
        let mut shift = num_bits - div_bits;
        let mut divisor = rhs.shl(shift);

        loop {
            if let Some(diff) = remainder.checked_sub(divisor) {
                remainder = diff;
                quotient.0[(shift / 64) as usize] |= 1u64 << (shift % 64);
            }
            if shift == 0 {
                break;
            }
            shift -= 1;
            divisor = divisor.shr(1);
        }

        quotient
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        for (a, b) in self.0.iter().rev().zip(other.0.iter().rev()) {
            match a.cmp(b) {
                std::cmp::Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        std::cmp::Ordering::Equal
    }
}
