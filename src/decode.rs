//! Decoding of key buffers back into [`Value`] trees.
//!
//! Decode is a recursive descent driven by the tag byte. Inside composites,
//! children are read until an unescaped `0x00` terminator; variable-width
//! scalars are unshifted in place. Decoding insists on canonical form, the
//! only form the encoder produces: number and date payloads must be finite
//! with the sign their tag claims, set elements and map pairs must arrive in
//! sorted order, and a top-level value must consume the whole buffer.

use byteorder::{BigEndian, ReadBytesExt};

use crate::{
    encode::{ESCAPE, TERMINATOR},
    error::{Error, Result},
    tag::Tag,
    timestamp::Timestamp,
    value::Value,
    MAX_DEPTH,
};

/// Decode a full buffer into a value, with the default nesting limit of
/// [`MAX_DEPTH`].
pub fn decode(buf: &[u8]) -> Result<Value> {
    decode_with_depth(buf, MAX_DEPTH)
}

/// Decode a full buffer, failing with [`Error::TooDeep`] once composite
/// nesting exceeds `max_depth`.
pub fn decode_with_depth(buf: &[u8], max_depth: usize) -> Result<Value> {
    let mut parser = Parser::new(buf, max_depth);
    let value = parser.parse_value(0, false)?;
    parser.finish()?;
    Ok(value)
}

#[derive(Clone, Debug)]
struct Parser<'a> {
    data: &'a [u8],
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8], max_depth: usize) -> Parser<'a> {
        Self { data, max_depth }
    }

    /// A completed top-level value must have consumed the entire buffer.
    fn finish(&self) -> Result<()> {
        if self.data.is_empty() {
            Ok(())
        } else {
            Err(Error::Malformed(format!(
                "{} trailing bytes after a completed value",
                self.data.len()
            )))
        }
    }

    fn read_tag(&mut self) -> Result<Tag> {
        let (&byte, rest) = self.data.split_first().ok_or(Error::LengthTooShort {
            step: "read tag",
            actual: 0,
            expected: 1,
        })?;
        self.data = rest;
        Tag::from_u8(byte)
            .ok_or_else(|| Error::Malformed(format!("unknown tag byte 0x{:02x}", byte)))
    }

    fn parse_value(&mut self, depth: usize, embedded: bool) -> Result<Value> {
        let tag = self.read_tag()?;
        Ok(match tag {
            Tag::Bottom => Value::Bottom,
            Tag::Null => Value::Null,
            Tag::False => Value::Boolean(false),
            Tag::True => Value::Boolean(true),
            Tag::NegInfinity => Value::Number(f64::NEG_INFINITY),
            Tag::PosInfinity => Value::Number(f64::INFINITY),
            Tag::NegNumber => Value::Number(-self.read_magnitude("decode negative number")?),
            Tag::PosNumber => Value::Number(self.read_non_negative("decode number")?),
            Tag::NegDate => Value::Timestamp(Timestamp::from_millis(
                -self.read_magnitude("decode negative date")?,
            )),
            Tag::PosDate => {
                Value::Timestamp(Timestamp::from_millis(self.read_non_negative("decode date")?))
            }
            Tag::Bytes => Value::Binary(if embedded {
                self.read_shifted("decode bytes")?
            } else {
                self.take_rest().to_vec()
            }),
            Tag::Text => Value::String(self.read_text(embedded, "decode text")?),
            Tag::Code => Value::Code(self.read_text(embedded, "decode code")?),
            Tag::Set => {
                let items = self.parse_children(depth, "set")?;
                if items.windows(2).any(|w| w[0] > w[1]) {
                    return Err(Error::Malformed(
                        "set elements out of canonical order".to_string(),
                    ));
                }
                Value::Set(items)
            }
            Tag::List => Value::Array(self.parse_children(depth, "list")?),
            Tag::Map => Value::Map(self.parse_map(depth)?),
            Tag::High => {
                if embedded {
                    return Err(Error::Malformed(
                        "high sentinel inside a composite".to_string(),
                    ));
                }
                Value::High
            }
        })
    }

    fn parse_children(&mut self, depth: usize, step: &'static str) -> Result<Vec<Value>> {
        self.check_depth(depth)?;
        let mut items = Vec::new();
        loop {
            match self.data.first() {
                None => {
                    return Err(Error::Malformed(format!("{} missing its terminator", step)))
                }
                Some(&TERMINATOR) => {
                    self.data = &self.data[1..];
                    return Ok(items);
                }
                Some(_) => items.push(self.parse_value(depth + 1, true)?),
            }
        }
    }

    fn parse_map(&mut self, depth: usize) -> Result<Vec<(Value, Value)>> {
        self.check_depth(depth)?;
        let mut pairs = Vec::new();
        loop {
            match self.data.first() {
                None => {
                    return Err(Error::Malformed("map missing its terminator".to_string()))
                }
                Some(&TERMINATOR) => {
                    self.data = &self.data[1..];
                    break;
                }
                Some(_) => {
                    let key = self.parse_value(depth + 1, true)?;
                    if self.data.first() == Some(&TERMINATOR) {
                        return Err(Error::Malformed("map key without a value".to_string()));
                    }
                    let value = self.parse_value(depth + 1, true)?;
                    pairs.push((key, value));
                }
            }
        }
        if pairs.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::Malformed(
                "map entries out of canonical order".to_string(),
            ));
        }
        Ok(pairs)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth >= self.max_depth {
            Err(Error::TooDeep {
                max: self.max_depth,
            })
        } else {
            Ok(())
        }
    }

    fn read_bits(&mut self, step: &'static str) -> Result<u64> {
        let actual = self.data.len();
        self.data
            .read_u64::<BigEndian>()
            .map_err(|_| Error::LengthTooShort {
                step,
                actual,
                expected: 8,
            })
    }

    /// Payload of a positive-tagged number or date: raw big-endian bits.
    fn read_non_negative(&mut self, step: &'static str) -> Result<f64> {
        let v = f64::from_bits(self.read_bits(step)?);
        if !v.is_finite() {
            return Err(Error::Malformed(format!(
                "non-finite payload in [{}]",
                step
            )));
        }
        if v.is_sign_negative() {
            return Err(Error::Malformed(format!(
                "negative payload under a positive tag in [{}]",
                step
            )));
        }
        Ok(v)
    }

    /// Payload of a negative-tagged number or date: the one's complement of
    /// the magnitude's bits. The caller applies the sign.
    fn read_magnitude(&mut self, step: &'static str) -> Result<f64> {
        let m = f64::from_bits(!self.read_bits(step)?);
        if !m.is_finite() {
            return Err(Error::Malformed(format!(
                "non-finite payload in [{}]",
                step
            )));
        }
        if m.is_sign_negative() {
            return Err(Error::Malformed(format!(
                "payload out of range under a negative tag in [{}]",
                step
            )));
        }
        Ok(m)
    }

    fn read_text(&mut self, embedded: bool, step: &'static str) -> Result<String> {
        let bytes = if embedded {
            self.read_shifted(step)?
        } else {
            self.take_rest().to_vec()
        };
        String::from_utf8(bytes)
            .map_err(|_| Error::Malformed(format!("text is not valid UTF-8 in [{}]", step)))
    }

    /// Read an embedded variable-width payload up to its unescaped
    /// terminator, undoing the shift.
    fn read_shifted(&mut self, step: &'static str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let (&b, rest) = self.data.split_first().ok_or(Error::LengthTooShort {
                step,
                actual: 0,
                expected: 1,
            })?;
            self.data = rest;
            match b {
                TERMINATOR => return Ok(out),
                ESCAPE => {
                    let (&esc, rest) = self.data.split_first().ok_or(Error::LengthTooShort {
                        step,
                        actual: 0,
                        expected: 1,
                    })?;
                    self.data = rest;
                    if esc == 0xfe || esc == 0xff {
                        out.push(esc);
                    } else {
                        return Err(Error::Malformed(format!(
                            "bad escape byte 0x{:02x} in [{}]",
                            esc, step
                        )));
                    }
                }
                b => out.push(b - 1),
            }
        }
    }

    fn take_rest(&mut self) -> &'a [u8] {
        let rest = self.data;
        self.data = &[];
        rest
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::encode::encode;

    fn roundtrip(value: Value) {
        let enc = encode(&value).unwrap();
        let dec = decode(&enc).unwrap();
        assert_eq!(dec, value, "bytes were {:x?}", enc);
    }

    #[test]
    fn roundtrip_nullary() {
        roundtrip(Value::Bottom);
        roundtrip(Value::Null);
        roundtrip(Value::from(false));
        roundtrip(Value::from(true));
        roundtrip(Value::Number(f64::NEG_INFINITY));
        roundtrip(Value::Number(f64::INFINITY));
        roundtrip(Value::High);
        // Bottom and Null stay distinct through the codec.
        assert_eq!(decode(&[0x10]).unwrap(), Value::Bottom);
        assert_eq!(decode(&[0x11]).unwrap(), Value::Null);
    }

    #[test]
    fn roundtrip_numbers() {
        for v in [
            0.0,
            1.0,
            -1.0,
            12345.0,
            -12345.0,
            1.2345e-300,
            -1.2345e-300,
            f64::MAX,
            f64::MIN,
            f64::MIN_POSITIVE,
        ] {
            roundtrip(Value::from(v));
        }
        // The sign of zero survives.
        let neg_zero = decode(&encode(&Value::Number(-0.0)).unwrap()).unwrap();
        assert!(neg_zero.as_f64().unwrap().is_sign_negative());
        let pos_zero = decode(&encode(&Value::Number(0.0)).unwrap()).unwrap();
        assert!(!pos_zero.as_f64().unwrap().is_sign_negative());
    }

    #[test]
    fn roundtrip_timestamps() {
        roundtrip(Value::from(Timestamp::zero()));
        roundtrip(Value::from(Timestamp::from_millis(946_684_800_000.0)));
        roundtrip(Value::from(Timestamp::from_millis(-86_400_000.0)));
        roundtrip(Value::from(Timestamp::from_secs(1_700_000_000)));
    }

    #[test]
    fn roundtrip_scalars() {
        roundtrip(Value::from(""));
        roundtrip(Value::from("foo"));
        roundtrip(Value::from("foo \u{221a}"));
        roundtrip(Value::Binary(vec![]));
        roundtrip(Value::from(vec![0xffu8, 0x00, 0xfe, 0x01]));
        roundtrip(Value::Code("(x) => x + 1".into()));
    }

    #[test]
    fn roundtrip_composites() {
        roundtrip(Value::Array(vec![]));
        roundtrip(Value::Array(vec![Value::from(true), Value::from(-1.2345)]));
        roundtrip(Value::Array(vec![Value::from("foo")]));
        roundtrip(Value::Array(vec![Value::from(vec![0xffu8, 0x00, 0xfe, 0x01])]));
        roundtrip(Value::Set(vec![
            Value::from("b"),
            Value::from("a"),
            Value::from("a"),
        ]));
        roundtrip(Value::Map(vec![
            (Value::from("b"), Value::from(2.0)),
            (Value::from("a"), Value::from(1.0)),
        ]));
        roundtrip(Value::Map(vec![(
            Value::from(1.0),
            Value::Array(vec![Value::Null, Value::from("nested")]),
        )]));
        roundtrip(Value::Array(vec![
            Value::Array(vec![Value::Array(vec![Value::from("deep")])]),
            Value::Set(vec![Value::from(1.0)]),
        ]));
    }

    #[test]
    fn set_decodes_in_canonical_order() {
        let enc = encode(&Value::Set(vec![Value::from(2.0), Value::from(1.0)])).unwrap();
        let dec = decode(&enc).unwrap();
        assert_eq!(
            dec.as_set().unwrap(),
            &vec![Value::from(1.0), Value::from(2.0)]
        );
    }

    mod malformed {
        use super::*;

        fn expect_malformed(buf: &[u8]) {
            match decode(buf) {
                Err(Error::Malformed(_)) => (),
                other => panic!("{:x?} should be malformed, got {:?}", buf, other),
            }
        }

        fn expect_short(buf: &[u8]) {
            match decode(buf) {
                Err(Error::LengthTooShort { .. }) => (),
                other => panic!("{:x?} should be too short, got {:?}", buf, other),
            }
        }

        #[test]
        fn empty_input() {
            expect_short(&[]);
        }

        #[test]
        fn unknown_tag() {
            expect_malformed(&[0x00]);
            expect_malformed(&[0x12]);
            expect_malformed(&[0xfe]);
            expect_malformed(&[0xa0, 0x30, 0x00]);
        }

        #[test]
        fn truncated_scalar() {
            expect_short(&[0x42, 0x00, 0x00]);
            expect_short(&[0x51]);
            expect_short(&[0xa0, 0x70, 0x67]);
            expect_short(&[0xa0, 0x60, 0xff]);
        }

        #[test]
        fn missing_terminator() {
            expect_malformed(&[0xa0, 0x21]);
            expect_malformed(&[0x90, 0x21]);
            expect_malformed(&[0xb0, 0x21, 0x20]);
        }

        #[test]
        fn trailing_bytes() {
            expect_malformed(&[0x10, 0x00]);
            expect_malformed(&[0xa0, 0x00, 0x10]);
            expect_malformed(&[0x21, 0x21]);
        }

        #[test]
        fn bad_escape() {
            // 0xff must be chased by the escaped byte itself.
            expect_malformed(&[0xa0, 0x60, 0xff, 0x03, 0x00, 0x00]);
            expect_malformed(&[0xa0, 0x70, 0xff, 0x00, 0x00]);
        }

        #[test]
        fn high_inside_composite() {
            expect_malformed(&[0xa0, 0xff, 0x00]);
            expect_malformed(&[0xb0, 0x70, 0x62, 0x00, 0xff, 0x00]);
        }

        #[test]
        fn map_key_without_value() {
            expect_malformed(&[0xb0, 0x21, 0x00]);
        }

        #[test]
        fn non_canonical_composites() {
            // True sorts after False, so this set is out of order.
            expect_malformed(&[0x90, 0x21, 0x20, 0x00]);
            // Map keys "b" then "a".
            expect_malformed(&[
                0xb0, 0x70, 0x63, 0x00, 0x21, 0x70, 0x62, 0x00, 0x21, 0x00,
            ]);
        }

        #[test]
        fn non_canonical_numbers() {
            // Sign bit set under the positive tag.
            expect_malformed(&[0x42, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
            // NaN bits under the positive tag.
            expect_malformed(&[0x42, 0x7f, 0xf8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01]);
            // Complemented infinity under the negative tag.
            expect_malformed(&[0x41, 0x80, 0x0f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
            // Same checks apply to dates.
            expect_malformed(&[0x52, 0xff, 0xf0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        }

        #[test]
        fn invalid_utf8() {
            expect_malformed(&[0x70, 0xc0]);
            // Shifted 0xc0 is 0xc1 inside a list.
            expect_malformed(&[0xa0, 0x70, 0xc1, 0x00, 0x00]);
            expect_malformed(&[0xc0, 0xff, 0xff]);
        }
    }

    #[test]
    fn depth_limit() {
        let mut nested = Value::from(0.0);
        for _ in 0..MAX_DEPTH {
            nested = Value::Array(vec![nested]);
        }
        let enc = encode(&nested).unwrap();
        assert!(decode(&enc).is_ok());

        let mut too_deep = vec![0xa0; MAX_DEPTH + 1];
        too_deep.extend(std::iter::repeat(0x00).take(MAX_DEPTH + 1));
        assert_eq!(
            decode(&too_deep).unwrap_err(),
            Error::TooDeep { max: MAX_DEPTH }
        );

        assert_eq!(
            decode_with_depth(&[0xa0, 0x00], 0).unwrap_err(),
            Error::TooDeep { max: 0 }
        );
    }
}
