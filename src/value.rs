use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::timestamp::Timestamp;

/// A structured key value. One constructor per payload shape; the key format
/// splits some of these across several tags (numbers by sign, timestamps by
/// epoch side) when encoding.
///
/// `Value` carries the reference total order of the codec as its [`Ord`]
/// impl: two encoded buffers compare bytewise exactly as the original values
/// compare under `Value::cmp`. Equality follows the same order, so a `Set`
/// compares as a sorted multiset and a `Map` compares with its pairs in key
/// order, matching what canonical encoding does to them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    /// The absent value, below everything else.
    Bottom,
    /// The explicit null value.
    Null,
    Boolean(bool),
    /// A double-precision number. Covers both infinities; NaN is
    /// representable here but rejected by the encoder.
    Number(f64),
    Timestamp(Timestamp),
    /// An opaque byte string, ordered bitwise.
    Binary(#[serde(with = "serde_bytes")] Vec<u8>),
    /// A Unicode string, ordered by its UTF-8 byte form.
    String(String),
    /// An unordered multiset. Element order is irrelevant to comparison and
    /// encoding; duplicates are significant.
    Set(Vec<Value>),
    /// An ordered sequence, compared componentwise.
    Array(Vec<Value>),
    /// Key/value pairs. Canonically ordered by key, so two maps with the
    /// same pairs are equal and encode identically regardless of the order
    /// they were built in.
    Map(Vec<(Value, Value)>),
    /// An executable value, carried and ordered by its canonical source
    /// text. Revival into something runnable is the caller's business.
    Code(String),
    /// The exclusive maximum sentinel, above every other value. Only legal
    /// at the top level of a key, where it forms range bounds.
    High,
}

impl Value {
    pub fn is_bottom(&self) -> bool {
        matches!(*self, Value::Bottom)
    }

    pub fn is_null(&self) -> bool {
        matches!(*self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        self.as_bool().is_some()
    }

    pub fn is_number(&self) -> bool {
        matches!(*self, Value::Number(..))
    }

    pub fn is_timestamp(&self) -> bool {
        self.as_timestamp().is_some()
    }

    pub fn is_bin(&self) -> bool {
        self.as_slice().is_some()
    }

    pub fn is_str(&self) -> bool {
        self.as_str().is_some()
    }

    pub fn is_set(&self) -> bool {
        self.as_set().is_some()
    }

    pub fn is_array(&self) -> bool {
        self.as_array().is_some()
    }

    pub fn is_map(&self) -> bool {
        self.as_map().is_some()
    }

    pub fn is_high(&self) -> bool {
        matches!(*self, Value::High)
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Boolean(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        if let Value::Number(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        if let Value::Timestamp(time) = *self {
            Some(time)
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> Option<&[u8]> {
        if let Value::Binary(ref val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(ref val) = *self {
            Some(val.as_str())
        } else {
            None
        }
    }

    pub fn as_set(&self) -> Option<&Vec<Value>> {
        if let Value::Set(ref set) = *self {
            Some(set)
        } else {
            None
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        if let Value::Array(ref array) = *self {
            Some(array)
        } else {
            None
        }
    }

    pub fn as_map(&self) -> Option<&Vec<(Value, Value)>> {
        if let Value::Map(ref map) = *self {
            Some(map)
        } else {
            None
        }
    }

    /// Look up the value under a string key. Maps are small ordered pair
    /// lists, so this is a linear scan over entries with the first match
    /// winning.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Position of the variant in the total order, splitting numbers and
    /// timestamps the way the tag table does. Values of different ranks
    /// compare by rank alone.
    fn rank(&self) -> u8 {
        match *self {
            Value::Bottom => 0,
            Value::Null => 1,
            Value::Boolean(false) => 2,
            Value::Boolean(true) => 3,
            Value::Number(v) => {
                if v == f64::NEG_INFINITY {
                    4
                } else if v == f64::INFINITY {
                    7
                } else if v.is_sign_negative() {
                    5
                } else {
                    6
                }
            }
            Value::Timestamp(t) => {
                if t.millis().is_sign_negative() {
                    8
                } else {
                    9
                }
            }
            Value::Binary(_) => 10,
            Value::String(_) => 11,
            Value::Set(_) => 12,
            Value::Array(_) => 13,
            Value::Map(_) => 14,
            Value::Code(_) => 15,
            Value::High => 16,
        }
    }
}

/// Multiset elements in canonical (sorted) order, by reference.
pub(crate) fn canonical_elems(set: &[Value]) -> Vec<&Value> {
    let mut elems: Vec<&Value> = set.iter().collect();
    elems.sort();
    elems
}

/// Map entries in canonical order, by reference: ascending by key, ties
/// broken by value so duplicate keys still canonicalize.
pub(crate) fn canonical_pairs(map: &[(Value, Value)]) -> Vec<(&Value, &Value)> {
    let mut pairs: Vec<(&Value, &Value)> = map.iter().map(|(k, v)| (k, v)).collect();
    pairs.sort();
    pairs
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = self.rank().cmp(&other.rank());
        if rank != Ordering::Equal {
            return rank;
        }
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Binary(a), Value::Binary(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Code(a), Value::Code(b)) => a.cmp(b),
            (Value::Set(a), Value::Set(b)) => canonical_elems(a).cmp(&canonical_elems(b)),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            (Value::Map(a), Value::Map(b)) => canonical_pairs(a).cmp(&canonical_pairs(b)),
            // Same rank and no payload to compare.
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Boolean(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::Number(val)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::Number(val as f64)
    }
}

impl From<u32> for Value {
    fn from(val: u32) -> Self {
        Value::Number(val as f64)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_string())
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::String(val)
    }
}

impl From<Vec<u8>> for Value {
    fn from(val: Vec<u8>) -> Self {
        Value::Binary(val)
    }
}

impl From<Timestamp> for Value {
    fn from(val: Timestamp) -> Self {
        Value::Timestamp(val)
    }
}

impl From<Vec<Value>> for Value {
    fn from(val: Vec<Value>) -> Self {
        Value::Array(val)
    }
}
