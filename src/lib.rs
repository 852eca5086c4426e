//! keywise is an order-preserving binary encoding for structured index
//! keys.
//!
//! It defines a total order over a closed universe of values ([`Value`])
//! and encodes them so that plain unsigned byte comparison of two encoded
//! buffers matches the total order of the values they came from. Put the
//! buffers in any key/value store that sorts keys bytewise and you get
//! structural range scans, prefix queries, and componentwise ordering over
//! heterogeneous keys with no indexing logic in the store.
//!
//! ```
//! # use keywise::{compare, decode, encode, Value};
//! let a = encode(&Value::Array(vec![Value::from("user"), Value::from(17.0)]))?;
//! let b = encode(&Value::Array(vec![Value::from("user"), Value::from(200.0)]))?;
//! assert!(compare(&a, &b).is_lt());
//! assert_eq!(decode(&a)?, Value::Array(vec![Value::from("user"), Value::from(17.0)]));
//! # Ok::<(), keywise::Error>(())
//! ```
//!
//! The codec is pure and stateless: no I/O, no shared state, safe to call
//! from any number of threads. Encoding and decoding either run to
//! completion or fail with a typed [`Error`]; partial output is never
//! produced. Compactness is a non-goal, order preservation is the goal.

mod compare;
mod decode;
mod encode;
mod error;
mod tag;
mod timestamp;
mod value;

pub use self::compare::compare;
pub use self::decode::{decode, decode_with_depth};
pub use self::encode::{encode, encode_with_depth, prefix_range};
pub use self::error::{Error, Result};
pub use self::tag::Tag;
pub use self::timestamp::Timestamp;
pub use self::value::Value;

/// Default limit on composite nesting for both encoding and decoding.
/// Recursion state is proportional to nesting depth, so the limit is what
/// keeps adversarially deep input from exhausting the stack. The
/// `*_with_depth` entry points take a caller-chosen limit instead.
pub const MAX_DEPTH: usize = 100;
