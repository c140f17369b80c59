//! Score Mutator
//!
//! A periodic task that perturbs scores in one randomly chosen competition
//! per tick and broadcasts the new absolute values.
//!
//! # Tick
//!
//! 1. Pick a competition uniformly at random. An empty roster ends the tick.
//! 2. Draw `min(roster, max_touched)` trader indices with replacement.
//! 3. Each draw sets `round2(start + step)` where `start` is the trader's
//!    score when the tick began and `step` is a uniform number of hundredths
//!    in `[-max_step, max_step]`. A repeated draw overwrites the earlier one.
//! 4. Publish one `score_update` with one entry per distinct trader.
//!
//! The whole tick, publish included, runs under the store's write lock so a
//! viewer that subscribes and reads snapshots under the read lock sees every
//! later delta and none of the earlier ones.

use std::sync::Arc;
use std::time::Duration;

use leaderboard_protocol::{ScoreMessage, TraderScore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use super::CompetitionStore;
use crate::application::ports::{
    NoOpStoreEvents, ScoreBroadcastPort, StoreEventsPort, TickOutcome,
};
use crate::domain::competition::Competition;

/// Mutator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutatorConfig {
    /// Time between ticks.
    pub interval: Duration,
    /// Draws per tick, before clamping to the roster size.
    pub max_touched: usize,
    /// Largest step in hundredths of a point, capped at
    /// [`MutatorConfig::MAX_STEP_CENTS`].
    pub max_step_cents: u32,
}

impl MutatorConfig {
    /// Upper bound on `max_step_cents`: no tick moves a score by more than 5.
    pub const MAX_STEP_CENTS: u32 = 500;
}

impl Default for MutatorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_touched: 3,
            max_step_cents: Self::MAX_STEP_CENTS,
        }
    }
}

/// Periodic score perturbation over a shared store.
pub struct ScoreMutator {
    store: Arc<CompetitionStore>,
    broadcaster: Arc<dyn ScoreBroadcastPort>,
    events: Arc<dyn StoreEventsPort>,
    config: MutatorConfig,
}

impl std::fmt::Debug for ScoreMutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreMutator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ScoreMutator {
    /// Create a mutator. A step above [`MutatorConfig::MAX_STEP_CENTS`] is
    /// lowered to it.
    #[must_use]
    pub fn new(
        store: Arc<CompetitionStore>,
        broadcaster: Arc<dyn ScoreBroadcastPort>,
        mut config: MutatorConfig,
    ) -> Self {
        config.max_step_cents = config.max_step_cents.min(MutatorConfig::MAX_STEP_CENTS);
        Self {
            store,
            broadcaster,
            events: Arc::new(NoOpStoreEvents),
            config,
        }
    }

    /// Report tick outcomes to `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn StoreEventsPort>) -> Self {
        self.events = events;
        self
    }

    /// Run one tick. Returns the published message, if any.
    pub fn tick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ScoreMessage> {
        self.store.write(|competitions| {
            if competitions.is_empty() {
                return None;
            }
            let index = rng.random_range(0..competitions.len());
            let message = perturb(
                &mut competitions[index],
                rng,
                self.config.max_touched,
                self.config.max_step_cents,
            )?;

            let receivers = self.broadcaster.publish(message.clone());
            trace!(
                competition_id = message.competition_id(),
                updates = message.entries().len(),
                receivers,
                "Published score update"
            );
            Some(message)
        })
    }

    /// Tick every `interval` until `cancel` fires.
    ///
    /// The first tick happens one interval after start.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut rng = StdRng::from_os_rng();
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await;

        info!(
            interval_ms = self.config.interval.as_millis(),
            max_touched = self.config.max_touched,
            "Score mutator started"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if let Some(message) = self.tick(&mut rng) {
                        self.events.tick_completed(TickOutcome::Published);
                        debug!(
                            competition_id = message.competition_id(),
                            updates = message.entries().len(),
                            "Mutator tick"
                        );
                    } else {
                        self.events.tick_completed(TickOutcome::Idle);
                    }
                }
            }
        }

        info!("Score mutator stopped");
    }
}

/// Perturb up to `max_touched` traders of one competition.
///
/// Returns `None` for an empty roster.
pub fn perturb<R: Rng + ?Sized>(
    competition: &mut Competition,
    rng: &mut R,
    max_touched: usize,
    max_step_cents: u32,
) -> Option<ScoreMessage> {
    let roster = competition.participants();
    if roster == 0 {
        return None;
    }

    let draws = roster.min(max_touched.max(1));
    let bound = i64::from(max_step_cents);

    // (roster index, new score) in first-draw order
    let mut touched: Vec<(usize, Decimal)> = Vec::with_capacity(draws);
    for _ in 0..draws {
        let index = rng.random_range(0..roster);
        let step = Decimal::new(rng.random_range(-bound..=bound), 2);
        let score = (competition.traders()[index].score() + step).round_dp(2);

        match touched.iter_mut().find(|(i, _)| *i == index) {
            Some(entry) => entry.1 = score,
            None => touched.push((index, score)),
        }
    }

    let traders = competition.traders_mut();
    let updates: Vec<TraderScore> = touched
        .into_iter()
        .map(|(index, score)| {
            traders[index].set_score(score);
            TraderScore::new(traders[index].name(), score)
        })
        .collect();

    Some(ScoreMessage::score_update(competition.id(), updates))
}
