//! Constant encoding.
//!
//! Turns a boolean, an integer or a verilog-style string into the unsigned
//! bit pattern a constant wire carries, together with its width. Negative
//! integers are stored as their two's complement pattern at the given width.

use crate::{WireError, WireResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::num::IntErrorKind;

lazy_static! {
    // <optional '-'><width>'<rest>, single quote only once
    static ref VERILOG_CONST_RE: Regex = Regex::new(r"^(-)?([0-9]+)'([^']*)$").unwrap();
}

/// Widest pattern a constant magnitude can hold.
pub const MAX_MAGNITUDE_BITS: usize = u128::BITS as usize;

/// A literal a constant can be made from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// `true` / `false`, always one bit.
    Bool(bool),
    /// Any signed integer.
    Int(i128),
    /// Unsigned integers, including those above `i128::MAX`.
    UInt(u128),
    /// `"<width>'<base><digits>"`, e.g. `8'hFF`, `4'b1_010`, `-4'd3`.
    Verilog(String),
}

impl Literal {
    /// True for negative integers and negative verilog strings.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        match self {
            Self::Int(v) => *v < 0,
            Self::Verilog(s) => s.contains('-'),
            Self::Bool(_) | Self::UInt(_) => false,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Verilog(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! literal_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Literal {
            fn from(value: $t) -> Self {
                Self::Int(value as i128)
            }
        })*
    };
}

macro_rules! literal_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Literal {
            fn from(value: $t) -> Self {
                Self::UInt(value as u128)
            }
        })*
    };
}

literal_from_signed!(i8, i16, i32, i64, i128, isize);
literal_from_unsigned!(u8, u16, u32, u64, u128, usize);

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::Verilog(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::Verilog(value)
    }
}

/// Result of encoding a [`Literal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EncodedConst {
    /// Unsigned bit pattern.
    pub magnitude: u128,
    /// Width in bits.
    pub bitwidth: usize,
}

/// Minimum number of bits needed to write `value` in binary. Zero takes one bit.
#[must_use]
pub const fn bit_length(value: u128) -> usize {
    let bits = (u128::BITS - value.leading_zeros()) as usize;
    if bits == 0 { 1 } else { bits }
}

/// True when `magnitude < 2^bitwidth`.
#[must_use]
pub const fn fits_in(magnitude: u128, bitwidth: usize) -> bool {
    bitwidth >= MAX_MAGNITUDE_BITS || magnitude >> bitwidth == 0
}

const fn low_mask(bitwidth: usize) -> u128 {
    if bitwidth >= MAX_MAGNITUDE_BITS {
        u128::MAX
    } else {
        (1u128 << bitwidth) - 1
    }
}

/// Read `magnitude` back as a two's complement number of `bitwidth` bits.
///
/// Returns `None` for widths of zero or above 128.
#[must_use]
pub const fn decode_signed(magnitude: u128, bitwidth: usize) -> Option<i128> {
    if bitwidth == 0 || bitwidth > MAX_MAGNITUDE_BITS {
        return None;
    }
    let value = magnitude & low_mask(bitwidth);
    let shift = (MAX_MAGNITUDE_BITS - bitwidth) as u32;
    Some(((value << shift) as i128) >> shift)
}

/// Check an optional width argument.
///
/// # Errors
/// [`WireError::InvalidBitwidth`] for `Some(0)`.
pub const fn validate_bitwidth(bitwidth: Option<usize>) -> WireResult<Option<usize>> {
    match bitwidth {
        Some(0) => Err(WireError::InvalidBitwidth(0)),
        other => Ok(other),
    }
}

/// Encode `literal` into a `(magnitude, bitwidth)` pair.
///
/// The magnitude is not checked against the width here for non-negative
/// integers; [`checked_constant`] does that.
///
/// # Errors
/// Any shape or range error described on [`WireError`] for literals.
pub fn encode_literal(literal: &Literal, bitwidth: Option<usize>) -> WireResult<EncodedConst> {
    let bitwidth = validate_bitwidth(bitwidth)?;
    match literal {
        Literal::Bool(b) => encode_bool(*b, bitwidth),
        Literal::Int(v) if *v >= 0 => Ok(encode_unsigned(*v as u128, bitwidth)),
        Literal::Int(v) => encode_negative(*v, bitwidth),
        Literal::UInt(v) => Ok(encode_unsigned(*v, bitwidth)),
        Literal::Verilog(s) => parse_verilog(s, bitwidth),
    }
}

/// Encode `literal` and re-validate the result against its width.
///
/// A non-negative magnitude that overflows is the caller's mistake; a
/// pattern computed from a negative value that overflows is ours.
///
/// # Errors
/// Everything [`encode_literal`] reports, plus [`WireError::ConstantOverflow`]
/// and [`WireError::Internal`].
pub fn checked_constant(literal: &Literal, bitwidth: Option<usize>) -> WireResult<EncodedConst> {
    let encoded = encode_literal(literal, bitwidth)?;
    if encoded.bitwidth == 0 {
        return Err(WireError::internal(format!(
            "constant {literal} encoded with zero width"
        )));
    }
    if !fits_in(encoded.magnitude, encoded.bitwidth) {
        if literal.is_negative() {
            return Err(WireError::internal(format!(
                "two's complement pattern {} of {} does not fit {} bits",
                encoded.magnitude, literal, encoded.bitwidth
            )));
        }
        return Err(WireError::ConstantOverflow {
            value: literal.to_string(),
            bitwidth: encoded.bitwidth,
        });
    }
    Ok(encoded)
}

const fn encode_bool(value: bool, bitwidth: Option<usize>) -> WireResult<EncodedConst> {
    match bitwidth {
        None | Some(1) => Ok(EncodedConst {
            magnitude: value as u128,
            bitwidth: 1,
        }),
        Some(other) => Err(WireError::BoolBitwidth(other)),
    }
}

const fn encode_unsigned(value: u128, bitwidth: Option<usize>) -> EncodedConst {
    let bitwidth = match bitwidth {
        Some(w) => w,
        None => bit_length(value),
    };
    EncodedConst {
        magnitude: value,
        bitwidth,
    }
}

fn encode_negative(value: i128, bitwidth: Option<usize>) -> WireResult<EncodedConst> {
    let Some(bitwidth) = bitwidth else {
        return Err(WireError::NegativeWithoutBitwidth(value));
    };
    if bitwidth > MAX_MAGNITUDE_BITS {
        return Err(WireError::ConstantTooWide(bitwidth));
    }
    // representable iff every bit from the sign bit upwards is set
    if value >> (bitwidth - 1) != -1 {
        return Err(WireError::NegativeOverflow {
            value: value.to_string(),
            bitwidth,
        });
    }
    Ok(EncodedConst {
        magnitude: (value as u128) & low_mask(bitwidth),
        bitwidth,
    })
}

fn parse_verilog(text: &str, bitwidth: Option<usize>) -> WireResult<EncodedConst> {
    if bitwidth.is_some() {
        return Err(WireError::BitwidthWithStringLiteral(text.to_string()));
    }
    let malformed = || WireError::MalformedLiteral(text.to_string());

    let lowered = text.to_lowercase();
    let caps = VERILOG_CONST_RE.captures(&lowered).ok_or_else(malformed)?;
    let mut negative = caps.get(1).is_some();
    let bitwidth: usize = caps[2].parse().map_err(|_| malformed())?;
    let mut rest = caps.get(3).map_or("", |m| m.as_str());

    if rest.starts_with('s') {
        return Err(WireError::SignedLiteral(text.to_string()));
    }
    let base = match rest.chars().next() {
        Some('b') => 2,
        Some('o') => 8,
        Some('d') => 10,
        Some('h' | 'x') => 16,
        _ => 10,
    };
    if rest.starts_with(['b', 'o', 'd', 'h', 'x']) {
        rest = &rest[1..];
    }
    if let Some(digits) = rest.strip_prefix('-') {
        if negative {
            return Err(malformed());
        }
        negative = true;
        rest = digits;
    }

    let digits: String = rest.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() {
        return Err(malformed());
    }
    if bitwidth == 0 {
        return Err(WireError::InvalidBitwidth(0));
    }
    let num = u128::from_str_radix(&digits, base).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => WireError::ConstantOverflow {
            value: text.to_string(),
            bitwidth,
        },
        _ => malformed(),
    })?;

    if !negative || num == 0 {
        return Ok(EncodedConst {
            magnitude: num,
            bitwidth,
        });
    }
    if bitwidth > MAX_MAGNITUDE_BITS {
        return Err(WireError::ConstantTooWide(bitwidth));
    }
    if num >> (bitwidth - 1) != 0 {
        return Err(WireError::NegativeOverflow {
            value: text.to_string(),
            bitwidth,
        });
    }
    let magnitude = if bitwidth == MAX_MAGNITUDE_BITS {
        0u128.wrapping_sub(num)
    } else {
        (1u128 << bitwidth) - num
    };
    Ok(EncodedConst {
        magnitude,
        bitwidth,
    })
}
