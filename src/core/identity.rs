//! Record identity: ULID record ids and zero-padded order numbers

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Generate a fresh record identifier
///
/// ULIDs are timestamp-prefixed, so ids sort in creation order, and the
/// random tail keeps two records created in the same millisecond apart.
pub fn new_record_id() -> String {
    Ulid::new().to_string()
}

/// Human-facing work order number (`001`, `002`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderNumber(u64);

impl OrderNumber {
    /// Minimum display width; larger numbers simply grow
    pub const WIDTH: usize = 3;

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The number that follows this one in the sequence
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = Self::WIDTH)
    }
}

impl FromStr for OrderNumber {
    type Err = OrderNumberError;

    /// Accepts `7`, `007` and `#007`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(OrderNumberError::Invalid(s.to_string()));
        }
        digits
            .parse::<u64>()
            .map(OrderNumber)
            .map_err(|_| OrderNumberError::Invalid(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderNumberError {
    #[error("invalid order number: '{0}' (expected digits, e.g. 007)")]
    Invalid(String),
}
