#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::needless_pass_by_value
    )
)]

//! Leaderboard Protocol - Shared Wire Types
//!
//! Messages pushed from the leaderboard server to every connected viewer,
//! the JSON codec used on both ends of the socket, and the ranking order
//! applied to rosters.
//!
//! # Messages
//!
//! ```text
//! { "type": "snapshot",     "competitionId": "...", "traders": [{"name": "...", "score": 1.25}] }
//! { "type": "score_update", "competitionId": "...", "updates": [{"name": "...", "score": 1.25}] }
//! ```
//!
//! Scores in a `score_update` are new absolute values, not differences.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// JSON encoding and decoding of socket frames.
pub mod codec;

/// Snapshot and score update message types.
pub mod messages;

/// Ranking order shared by server leaderboards and client views.
pub mod ranking;

pub use codec::{CodecError, JsonCodec};
pub use messages::{ScoreMessage, TraderScore};
pub use ranking::{compare_ranked, rank, ranked};
