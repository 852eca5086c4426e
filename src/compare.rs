//! The comparator contract.
//!
//! Two encoded keys compare as their source values do, using nothing but
//! unsigned bytewise comparison. No schema, no decoding, no type dispatch.
//! The invariants that make this valid:
//!
//! - Tag bytes are assigned in the order of the variants themselves, so
//!   differing tags decide the comparison on the first byte.
//! - Scalar payloads are bit-munged until their big-endian bytes sort like
//!   the payloads: raw IEEE-754 bits for non-negative doubles, complemented
//!   magnitude bits for negative ones, UTF-8 for text, raw bytes for byte
//!   strings.
//! - Composites are the concatenation of their children's embedded
//!   encodings, each of which is prefix-free, so bytewise comparison walks
//!   children in lockstep. The closing `0x00` sorts below every tag byte,
//!   which puts a composite before any longer composite it prefixes.
//!
//! The tests here pin the contract: the sign of `compare(encode(a),
//! encode(b))` equals the sign of `a.cmp(&b)` for arbitrary admissible
//! values.

use std::cmp::Ordering;

/// Compare two encoded keys. This is exactly `memcmp` order and exists to
/// name the contract; a key/value store applying its native byte order to
/// these buffers will agree with it.
pub fn compare(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}
