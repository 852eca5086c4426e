/// Key format tag bytes. The single source of truth consulted by both the
/// encoder and the decoder.
///
/// Tag bytes are assigned in strictly increasing order of the variants'
/// position in the total order, so two encodings with different tags compare
/// correctly on their first byte alone. The assignment is part of the
/// versioned byte-level contract and must never be reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tag {
    Bottom,
    Null,
    False,
    True,
    NegInfinity,
    NegNumber,
    PosNumber,
    PosInfinity,
    NegDate,
    PosDate,
    Bytes,
    Text,
    Set,
    List,
    Map,
    Code,
    High,
}

impl Tag {
    /// Construct a tag from a single byte. Returns `None` for bytes outside
    /// the assignment, which a decoder reports as a malformed encoding.
    pub fn from_u8(n: u8) -> Option<Tag> {
        match n {
            0x10 => Some(Tag::Bottom),
            0x11 => Some(Tag::Null),
            0x20 => Some(Tag::False),
            0x21 => Some(Tag::True),
            0x40 => Some(Tag::NegInfinity),
            0x41 => Some(Tag::NegNumber),
            0x42 => Some(Tag::PosNumber),
            0x43 => Some(Tag::PosInfinity),
            0x51 => Some(Tag::NegDate),
            0x52 => Some(Tag::PosDate),
            0x60 => Some(Tag::Bytes),
            0x70 => Some(Tag::Text),
            0x90 => Some(Tag::Set),
            0xa0 => Some(Tag::List),
            0xb0 => Some(Tag::Map),
            0xc0 => Some(Tag::Code),
            0xff => Some(Tag::High),
            _ => None,
        }
    }

    /// Converts a tag into its single-byte representation.
    pub fn into_u8(self) -> u8 {
        match self {
            Tag::Bottom => 0x10,
            Tag::Null => 0x11,
            Tag::False => 0x20,
            Tag::True => 0x21,
            Tag::NegInfinity => 0x40,
            Tag::NegNumber => 0x41,
            Tag::PosNumber => 0x42,
            Tag::PosInfinity => 0x43,
            Tag::NegDate => 0x51,
            Tag::PosDate => 0x52,
            Tag::Bytes => 0x60,
            Tag::Text => 0x70,
            Tag::Set => 0x90,
            Tag::List => 0xa0,
            Tag::Map => 0xb0,
            Tag::Code => 0xc0,
            Tag::High => 0xff,
        }
    }
}

impl From<Tag> for u8 {
    fn from(val: Tag) -> u8 {
        val.into_u8()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ALL: [Tag; 17] = [
        Tag::Bottom,
        Tag::Null,
        Tag::False,
        Tag::True,
        Tag::NegInfinity,
        Tag::NegNumber,
        Tag::PosNumber,
        Tag::PosInfinity,
        Tag::NegDate,
        Tag::PosDate,
        Tag::Bytes,
        Tag::Text,
        Tag::Set,
        Tag::List,
        Tag::Map,
        Tag::Code,
        Tag::High,
    ];

    #[test]
    fn roundtrip() {
        for n in 0..=255u8 {
            match Tag::from_u8(n) {
                Some(tag) => assert_eq!(tag.into_u8(), n),
                None => assert!(!ALL.iter().any(|t| t.into_u8() == n)),
            }
        }
    }

    #[test]
    fn monotonic() {
        // Variant order and byte order must agree, or first-byte comparison
        // would not decide cross-variant ordering.
        for pair in ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].into_u8() < pair[1].into_u8());
        }
    }

    #[test]
    fn contract() {
        assert_eq!(Tag::Bottom.into_u8(), 0x10);
        assert_eq!(Tag::Null.into_u8(), 0x11);
        assert_eq!(Tag::False.into_u8(), 0x20);
        assert_eq!(Tag::True.into_u8(), 0x21);
        assert_eq!(Tag::NegInfinity.into_u8(), 0x40);
        assert_eq!(Tag::NegNumber.into_u8(), 0x41);
        assert_eq!(Tag::PosNumber.into_u8(), 0x42);
        assert_eq!(Tag::PosInfinity.into_u8(), 0x43);
        assert_eq!(Tag::NegDate.into_u8(), 0x51);
        assert_eq!(Tag::PosDate.into_u8(), 0x52);
        assert_eq!(Tag::Bytes.into_u8(), 0x60);
        assert_eq!(Tag::Text.into_u8(), 0x70);
        assert_eq!(Tag::Set.into_u8(), 0x90);
        assert_eq!(Tag::List.into_u8(), 0xa0);
        assert_eq!(Tag::Map.into_u8(), 0xb0);
        assert_eq!(Tag::Code.into_u8(), 0xc0);
        assert_eq!(Tag::High.into_u8(), 0xff);
    }

    #[test]
    fn terminator_below_all_tags() {
        // Composite children start with a tag byte, so the 0x00 terminator
        // must sort below every tag for shorter composites to sort first.
        for tag in ALL {
            assert!(tag.into_u8() > 0x00);
        }
    }
}
