//! Identifiers and raw input records.

use cyclewarp_dtw::Reading;

/// A study participant identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    /// Create a user ID from a non-empty string.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        debug_assert!(!id.is_empty(), "user ID must not be empty");
        Self(id)
    }

    /// Return the user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one cycle of one user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CycleKey {
    /// Owner of the cycle.
    pub user: UserId,
    /// Cycle number within the user's history.
    pub cycle: u32,
}

impl CycleKey {
    /// Shorthand constructor.
    pub fn new(user: UserId, cycle: u32) -> Self {
        Self { user, cycle }
    }
}

impl std::fmt::Display for CycleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user, self.cycle)
    }
}

/// One cycle's raw daily readings as supplied by the input provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCycle {
    /// Identifying key.
    pub key: CycleKey,
    /// Declared cycle length in days, if known.
    pub cycle_length: Option<usize>,
    /// Daily readings, in any order.
    pub readings: Vec<Reading>,
}
