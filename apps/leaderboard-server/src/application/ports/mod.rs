//! Application Ports (Driven)
//!
//! Interfaces the application uses to reach external systems. Adapters live
//! in [`crate::infrastructure`].
//!
//! - `CompetitionRepository`: durable mirror of competitions and rosters
//! - `ScoreBroadcastPort`: fan-out of score messages to viewers
//! - `StoreEventsPort`: failed writes and tick outcomes, for metrics

mod competition_repository_port;
mod score_broadcast_port;
mod store_events_port;

pub use competition_repository_port::{CompetitionRepository, PersistenceError};
pub use score_broadcast_port::ScoreBroadcastPort;
pub use store_events_port::{NoOpStoreEvents, StoreEventsPort, TickOutcome};

#[cfg(test)]
pub use competition_repository_port::MockCompetitionRepository;
#[cfg(test)]
pub use store_events_port::MockStoreEventsPort;
