use std::fmt;

const MICROS_PER_SEC: u32 = 1_000_000;
const NANOS_PER_MICRO: u32 = 1_000;

/// Capture timestamp, seconds and microseconds since the Unix epoch
///
/// Panic-free: out of range sub-second parts are carried into seconds,
/// seconds wrap.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Timestamp {
    pub secs: u32,
    pub micros: u32,
}

impl Timestamp {
    /// Build Timestamp from secs and micros
    pub fn new(secs: u32, micros: u32) -> Timestamp {
        Timestamp {
            secs: secs.wrapping_add(micros / MICROS_PER_SEC),
            micros: micros % MICROS_PER_SEC,
        }
    }

    /// Build Timestamp from secs and nanos (nanosecond-precision captures)
    pub fn from_nanos(secs: u32, nanos: u32) -> Timestamp {
        Timestamp::new(secs, nanos / NANOS_PER_MICRO)
    }

    /// Nanoseconds since the Unix epoch
    pub fn unix_nanos(self) -> i128 {
        i128::from(self.secs) * 1_000_000_000 + i128::from(self.micros) * 1_000
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{:06}", self.secs, self.micros)
    }
}
