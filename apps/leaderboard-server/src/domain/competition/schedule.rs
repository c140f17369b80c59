//! Competition Schedule
//!
//! Competition windows are laid out relative to process start. Each catalog
//! position has a fixed start offset and every competition runs for one day:
//!
//! | Index | Start offset |
//! |-------|--------------|
//! | 0     | 0            |
//! | 1     | 1 hour       |
//! | 2     | 1 day        |
//! | 3+    | 0            |

use chrono::{DateTime, TimeDelta, Utc};

/// Computes start and end times for competitions by catalog position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    origin: DateTime<Utc>,
}

impl Schedule {
    /// Running time of every competition.
    pub const DURATION: TimeDelta = TimeDelta::days(1);

    /// Schedule anchored at the given instant.
    #[must_use]
    pub const fn new(origin: DateTime<Utc>) -> Self {
        Self { origin }
    }

    /// Schedule anchored at the current time.
    #[must_use]
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Anchor instant.
    #[must_use]
    pub const fn origin(&self) -> DateTime<Utc> {
        self.origin
    }

    /// Start offset for a catalog position.
    #[must_use]
    pub const fn offset(index: usize) -> TimeDelta {
        match index {
            1 => TimeDelta::hours(1),
            2 => TimeDelta::days(1),
            _ => TimeDelta::zero(),
        }
    }

    /// `(start_at, end_at)` for a catalog position.
    #[must_use]
    pub fn window(&self, index: usize) -> (DateTime<Utc>, DateTime<Utc>) {
        let start_at = self.origin + Self::offset(index);
        (start_at, start_at + Self::DURATION)
    }
}
