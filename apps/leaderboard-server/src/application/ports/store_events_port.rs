//! Store Events Port (Driven Port)
//!
//! Outcomes of background work that no caller sees: catalog writes that
//! failed after a join, and mutator ticks.

/// What a mutator tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A score update was published.
    Published,
    /// Nothing to mutate.
    Idle,
}

/// Port for observing store and mutator activity.
#[cfg_attr(test, mockall::automock)]
pub trait StoreEventsPort: Send + Sync {
    /// A roster change could not be written to the durable store.
    fn persistence_failed(&self);

    /// The mutator finished a tick.
    fn tick_completed(&self, outcome: TickOutcome);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStoreEvents;

impl StoreEventsPort for NoOpStoreEvents {
    fn persistence_failed(&self) {}

    fn tick_completed(&self, _outcome: TickOutcome) {}
}
