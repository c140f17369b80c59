//! Domain Layer - Competitions, rosters and their invariants.
//!
//! Pure types with no I/O. Everything that touches the clock does so
//! through an explicit `now` or a [`competition::Schedule`] origin.

/// Competitions, traders, schedules and their errors.
pub mod competition;
