//! Application Services
//!
//! - `CompetitionStore`: rosters, joins and leaderboards
//! - `ScoreMutator`: periodic score perturbation and delta publishing

mod competition_store;
mod score_mutator;

pub use competition_store::{
    CompetitionStore, CompetitionSummary, JoinOutcome, LeaderboardView, StoreInitError,
};
pub use score_mutator::{MutatorConfig, ScoreMutator, perturb};
