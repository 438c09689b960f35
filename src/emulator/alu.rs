//! Arithmetic primitives shared by the register file and the executors.
//!
//! Everything here works on plain bit patterns and an explicit bit width, the
//! same way the datapath does: there is no overflow error, only a carry bit.

/// The outcome of [`add_with_carry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sum {
    pub result: u32,
    /// Carry out of the most significant bit (0 or 1)
    pub carry: u8,
}

/// Full adder over three single bits, returns `(sum, carry_out)`.
fn bit_sum(a: u32, b: u32, carry_in: u32) -> (u32, u32) {
    let xor = a ^ b;
    let sum = xor ^ carry_in;
    let carry_out = (a & b) | (xor & carry_in);
    (sum, carry_out)
}

/// Adds `a` and `b` bit by bit over `bits` bits.
///
/// Only the low `bits` bits of each operand take part, so a negative operand
/// can be passed as its two's complement pattern (`x.wrapping_neg()`). The
/// carry is the unsigned overflow out of the width, whatever the operands
/// mean as signed numbers.
pub fn add_with_carry(mut a: u32, mut b: u32, bits: u8) -> Sum {
    debug_assert!((1..=32).contains(&bits), "bit width must be 1..=32");

    let mut carry = 0;
    let mut result = 0;

    for i in 0..u32::from(bits) {
        let a_bit = a & 1;
        let b_bit = b & 1;
        a >>= 1;
        b >>= 1;

        let (sum, carry_out) = bit_sum(a_bit, b_bit, carry);
        result |= sum << i;
        carry = carry_out;
    }

    tracing::trace!(result, carry, bits, "add_with_carry");

    Sum {
        result,
        carry: carry as u8,
    }
}

/// All-ones mask of the given width.
fn mask(bits: u8) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

/// Interprets `pattern` as a two's complement number `bits` wide.
pub fn decode_signed(pattern: u32, bits: u8) -> i32 {
    if is_negative(pattern, bits) {
        // one's complement of (pattern - 1) over the full width
        let magnitude = (pattern.wrapping_sub(1) ^ mask(bits)) & mask(bits);
        -i64::from(magnitude) as i32
    } else {
        pattern as i32
    }
}

/// True when the sign bit (bit `bits - 1`) of `value` is set.
pub fn is_negative(value: u32, bits: u8) -> bool {
    (value >> (bits - 1)) & 1 == 1
}
