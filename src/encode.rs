//! Encoding of [`Value`] trees into order-preserving byte buffers.
//!
//! A buffer starts with the value's tag byte. Numbers and timestamps are
//! fixed-width scalars with their bits munged so unsigned byte comparison
//! matches numeric order. Variable-width scalars are written raw at the top
//! level, where end-of-buffer delimits them, and in shifted form inside
//! composites, where a `0x00` terminator delimits them. Composites always
//! carry their own `0x00` terminator.
//!
//! The shift discipline for embedded scalar payloads: bytes `0x00..=0xFD`
//! are written incremented by one, while `0xFE` and `0xFF` are written as an
//! `0xFF` escape followed by the byte itself. Every shifted byte lands in
//! `0x01..=0xFF`, so the terminator stays unambiguous, and the mapping is
//! strictly monotone, so payload order survives.

use crate::{
    error::{Error, Result},
    tag::Tag,
    value::{canonical_elems, canonical_pairs, Value},
    Timestamp, MAX_DEPTH,
};

/// Ends every composite and every embedded variable-width scalar. Sorts
/// below all tag bytes and all shifted payload bytes.
pub(crate) const TERMINATOR: u8 = 0x00;
/// Escape prefix for the two payload bytes the shift cannot reach.
pub(crate) const ESCAPE: u8 = 0xff;

/// Encode a value into an owned buffer, with the default nesting limit of
/// [`MAX_DEPTH`].
///
/// Two buffers produced by this function compare under plain unsigned byte
/// order exactly as their source values compare under [`Value::cmp`].
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    encode_with_depth(value, MAX_DEPTH)
}

/// Encode a value, failing with [`Error::TooDeep`] once composite nesting
/// exceeds `max_depth`.
pub fn encode_with_depth(value: &Value, max_depth: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match *value {
        // At the top level nothing follows a variable-width scalar, so the
        // payload goes in raw and unterminated.
        Value::Binary(ref v) => {
            buf.push(Tag::Bytes.into());
            buf.extend_from_slice(v);
        }
        Value::String(ref v) => {
            buf.push(Tag::Text.into());
            buf.extend_from_slice(v.as_bytes());
        }
        Value::Code(ref v) => {
            buf.push(Tag::Code.into());
            buf.extend_from_slice(v.as_bytes());
        }
        // Legal here and nowhere else: a bare upper bound for range scans.
        Value::High => buf.push(Tag::High.into()),
        _ => encode_embedded(&mut buf, value, 0, max_depth)?,
    }
    Ok(buf)
}

/// The half-open byte range covering the list `prefix` and every list that
/// extends it.
///
/// The lower bound is the encoding of `prefix` itself; the upper bound is
/// the list's shared byte prefix followed by the `High` tag, which sorts
/// after any further child a longer list could append. Feed the pair to a
/// store's range scan as `[lower, upper)`.
pub fn prefix_range(prefix: &[Value]) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut shared = Vec::new();
    shared.push(Tag::List.into());
    for item in prefix {
        encode_embedded(&mut shared, item, 1, MAX_DEPTH)?;
    }
    let mut lower = shared.clone();
    lower.push(TERMINATOR);
    let mut upper = shared;
    upper.push(Tag::High.into());
    Ok((lower, upper))
}

/// Encode one value in embedded form. `depth` is the number of composites
/// already open around it.
fn encode_embedded(buf: &mut Vec<u8>, value: &Value, depth: usize, max_depth: usize) -> Result<()> {
    match *value {
        Value::Bottom => buf.push(Tag::Bottom.into()),
        Value::Null => buf.push(Tag::Null.into()),
        Value::Boolean(v) => buf.push(if v { Tag::True } else { Tag::False }.into()),
        Value::Number(v) => encode_number(buf, v)?,
        Value::Timestamp(t) => encode_timestamp(buf, t)?,
        Value::Binary(ref v) => {
            buf.push(Tag::Bytes.into());
            write_shifted(buf, v);
        }
        Value::String(ref v) => {
            buf.push(Tag::Text.into());
            write_shifted(buf, v.as_bytes());
        }
        Value::Code(ref v) => {
            buf.push(Tag::Code.into());
            write_shifted(buf, v.as_bytes());
        }
        Value::Set(ref items) => {
            check_depth(depth, max_depth)?;
            buf.push(Tag::Set.into());
            for item in canonical_elems(items) {
                encode_embedded(buf, item, depth + 1, max_depth)?;
            }
            buf.push(TERMINATOR);
        }
        Value::Array(ref items) => {
            check_depth(depth, max_depth)?;
            buf.push(Tag::List.into());
            for item in items {
                encode_embedded(buf, item, depth + 1, max_depth)?;
            }
            buf.push(TERMINATOR);
        }
        Value::Map(ref pairs) => {
            check_depth(depth, max_depth)?;
            buf.push(Tag::Map.into());
            for (key, val) in canonical_pairs(pairs) {
                encode_embedded(buf, key, depth + 1, max_depth)?;
                encode_embedded(buf, val, depth + 1, max_depth)?;
            }
            buf.push(TERMINATOR);
        }
        Value::High => {
            return Err(Error::BadValue(
                "high sentinel inside a composite".to_string(),
            ))
        }
    }
    Ok(())
}

fn check_depth(depth: usize, max_depth: usize) -> Result<()> {
    if depth >= max_depth {
        Err(Error::TooDeep { max: max_depth })
    } else {
        Ok(())
    }
}

/// Numbers are an 8-byte big-endian IEEE-754 double under a sign-split tag
/// pair. Non-negative doubles already sort correctly as big-endian unsigned
/// bytes; negative doubles store the one's complement of their magnitude's
/// bits, which sorts larger magnitudes first.
fn encode_number(buf: &mut Vec<u8>, v: f64) -> Result<()> {
    if v.is_nan() {
        return Err(Error::BadValue("NaN number".to_string()));
    }
    if v == f64::NEG_INFINITY {
        buf.push(Tag::NegInfinity.into());
    } else if v == f64::INFINITY {
        buf.push(Tag::PosInfinity.into());
    } else if v.is_sign_negative() {
        buf.push(Tag::NegNumber.into());
        buf.extend_from_slice(&(!(-v).to_bits()).to_be_bytes());
    } else {
        buf.push(Tag::PosNumber.into());
        buf.extend_from_slice(&v.to_bits().to_be_bytes());
    }
    Ok(())
}

/// Timestamps get the same bit munging as numbers over their millisecond
/// offset, under the date tag pair.
fn encode_timestamp(buf: &mut Vec<u8>, t: Timestamp) -> Result<()> {
    if !t.is_valid() {
        return Err(Error::BadValue("invalid timestamp".to_string()));
    }
    let millis = t.millis();
    if millis.is_sign_negative() {
        buf.push(Tag::NegDate.into());
        buf.extend_from_slice(&(!(-millis).to_bits()).to_be_bytes());
    } else {
        buf.push(Tag::PosDate.into());
        buf.extend_from_slice(&millis.to_bits().to_be_bytes());
    }
    Ok(())
}

fn write_shifted(buf: &mut Vec<u8>, payload: &[u8]) {
    for &b in payload {
        if b >= 0xfe {
            buf.push(ESCAPE);
            buf.push(b);
        } else {
            buf.push(b + 1);
        }
    }
    buf.push(TERMINATOR);
}
