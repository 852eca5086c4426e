use std::cmp::Ordering;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

const MILLIS_PER_SEC: f64 = 1_000.0;

/// A millisecond-precision point in time, stored as the offset from the Unix
/// epoch in an `f64`.
///
/// The representation deliberately matches the numeric payload of the key
/// format: a timestamp encodes exactly like a number, under its own tag pair.
/// A non-finite offset is the "invalid timestamp" state; such a value can be
/// constructed and passed around, but encoding it fails with
/// [`Error::BadValue`][crate::Error::BadValue].
///
/// Ordering is total (via [`f64::total_cmp`]) so timestamps can key sorted
/// containers. For valid timestamps it is plain chronological order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Timestamp {
    millis: f64,
}

impl Timestamp {
    /// Construct a timestamp from a millisecond offset from the Unix epoch.
    /// Negative offsets are times before the epoch.
    pub fn from_millis(millis: f64) -> Self {
        Self { millis }
    }

    /// Construct a timestamp from a whole-second offset from the Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        Self {
            millis: (secs as f64) * MILLIS_PER_SEC,
        }
    }

    /// The Unix epoch itself.
    pub fn zero() -> Self {
        Self { millis: 0.0 }
    }

    /// The current system time.
    pub fn now() -> Self {
        SystemTime::now().into()
    }

    /// The millisecond offset from the Unix epoch.
    pub fn millis(&self) -> f64 {
        self.millis
    }

    /// True when the timestamp holds an actual point in time. Only valid
    /// timestamps can be encoded.
    pub fn is_valid(&self) -> bool {
        self.millis.is_finite()
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        let millis = match time.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs_f64() * MILLIS_PER_SEC,
            Err(e) => -e.duration().as_secs_f64() * MILLIS_PER_SEC,
        };
        Self { millis }
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.millis.total_cmp(&other.millis)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}ms", self.millis)
        } else {
            f.write_str("invalid timestamp")
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn construction() {
        assert_eq!(Timestamp::from_secs(60).millis(), 60_000.0);
        assert_eq!(Timestamp::zero().millis(), 0.0);
        assert!(Timestamp::now().is_valid());
        assert!(Timestamp::now() > Timestamp::zero());
    }

    #[test]
    fn validity() {
        assert!(Timestamp::from_millis(-1.0).is_valid());
        assert!(!Timestamp::from_millis(f64::NAN).is_valid());
        assert!(!Timestamp::from_millis(f64::INFINITY).is_valid());
        assert!(!Timestamp::from_millis(f64::NEG_INFINITY).is_valid());
    }

    #[test]
    fn ordering() {
        let before = Timestamp::from_millis(-86_400_000.0);
        let epoch = Timestamp::zero();
        let after = Timestamp::from_millis(946_684_800_000.0);
        assert!(before < epoch);
        assert!(epoch < after);
        assert_eq!(after, Timestamp::from_millis(946_684_800_000.0));
    }

    #[test]
    fn system_time() {
        let t = Timestamp::from(UNIX_EPOCH + std::time::Duration::from_secs(5));
        assert_eq!(t, Timestamp::from_secs(5));
    }
}
