//! Free/busy arithmetic over half-open intervals `[start, end)`.
//!
//! Busy intervals are clamped to the query window, sorted, merged, and the
//! gaps left inside the window are the free intervals.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Interval<T> {
    pub start: T,
    pub end: T,
}

impl<T: Ord + Copy> Interval<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Part of `self` inside `window`, or `None` if nothing is left.
    pub fn clamp_to(&self, window: &Interval<T>) -> Option<Interval<T>> {
        let clamped = Interval::new(self.start.max(window.start), self.end.min(window.end));
        (!clamped.is_empty()).then_some(clamped)
    }
}

/// Clamps `busy` to `window` and merges overlapping or touching intervals.
/// The result is sorted and pairwise separated by a non-empty gap.
pub fn merge_busy<T, I>(window: &Interval<T>, busy: I) -> Vec<Interval<T>>
where
    T: Ord + Copy,
    I: IntoIterator<Item = Interval<T>>,
{
    let mut clamped: Vec<Interval<T>> = busy
        .into_iter()
        .filter_map(|b| b.clamp_to(window))
        .collect();
    clamped.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut merged: Vec<Interval<T>> = Vec::with_capacity(clamped.len());
    for interval in clamped {
        match merged.last_mut() {
            Some(current) if interval.start <= current.end => {
                current.end = current.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Gaps of `window` not covered by any of `busy`.
pub fn free_intervals<T, I>(window: &Interval<T>, busy: I) -> Vec<Interval<T>>
where
    T: Ord + Copy,
    I: IntoIterator<Item = Interval<T>>,
{
    if window.is_empty() {
        return Vec::new();
    }

    let mut free = Vec::new();
    let mut cursor = window.start;
    for b in merge_busy(window, busy) {
        if b.start > cursor {
            free.push(Interval::new(cursor, b.start));
        }
        cursor = b.end;
    }
    if cursor < window.end {
        free.push(Interval::new(cursor, window.end));
    }
    free
}
