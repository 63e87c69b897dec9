//! RAII timing for the two phases of `authorize_batch`.

use std::time::Instant;

use strum_macros::Display;

use crate::metrics::BatchStats;

/// A measured stretch of one `authorize_batch` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// Action adaptation, skip checks, id generation and bucketing.
    Mapping,
    /// Waiting on verify calls.
    Dispatch,
}

/// Charges the time between [`PhaseTimer::start`] and drop to the matching
/// [`BatchStats`] field.
///
/// The charge happens on every exit path, early `?` returns included. While
/// the timer lives it owns the stats borrow; counters are updated through
/// [`PhaseTimer::stats`].
pub struct PhaseTimer<'a> {
    phase: Phase,
    start: Instant,
    stats: &'a mut BatchStats,
}

impl<'a> PhaseTimer<'a> {
    pub fn start(phase: Phase, stats: &'a mut BatchStats) -> Self {
        PhaseTimer {
            phase,
            start: Instant::now(),
            stats,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&mut self) -> &mut BatchStats {
        &mut *self.stats
    }
}

impl Drop for PhaseTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        match self.phase {
            Phase::Mapping => self.stats.mapping += elapsed,
            Phase::Dispatch => self.stats.dispatch += elapsed,
        }
    }
}
