//! One-shot and repeating timers polled from the frame loop.

use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<E> {
    id: TimerId,
    due: u64,
    period: Option<u64>,
    event: E,
}

/// Timer queue keyed by millisecond deadlines.
///
/// Nothing runs on its own: the owner calls [`Timers::pop_due`] each frame
/// and handles the returned events. Firings come out one at a time, so a
/// handler that cancels a repeating timer also suppresses any of its
/// firings that were still backed up.
#[derive(Debug)]
pub struct Timers<E> {
    next_id: u64,
    entries: Vec<Entry<E>>,
}

impl<E: Clone> Timers<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Fires `event` once, `delay` ms after `now`.
    pub fn after(&mut self, now: u64, delay: u64, event: E) -> TimerId {
        self.insert(now.saturating_add(delay), None, event)
    }

    /// Fires `event` every `period` ms, first at `now + period`.
    pub fn every(&mut self, now: u64, period: u64, event: E) -> TimerId {
        let period = period.max(1);
        self.insert(now.saturating_add(period), Some(period), event)
    }

    fn insert(&mut self, due: u64, period: Option<u64>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, due, period, event });
        id
    }

    /// Returns false if the timer already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Pops the earliest firing due at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<(TimerId, E)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.id.0))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[idx];
        let fired = (entry.id, entry.event.clone());
        trace!(timer = entry.id.0, due = entry.due, now, "timer fired");

        match entry.period {
            Some(period) => entry.due = entry.due.saturating_add(period),
            None => {
                self.entries.swap_remove(idx);
            }
        }
        Some(fired)
    }
}

impl<E: Clone> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}
