// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fixed-count schedules for molecules.
//!
//! A molecule's count can be pinned three ways: a permanent baseline
//! (`m[:] = v`), discrete change points (`m[t] = v`), and time windows
//! (`m[a:b] = v`). Windows may overlap and contradict each other; the
//! handler resolves them lazily into a canonical breakpoint timeline
//! with a sweep over the window start/end events. Within overlapping
//! windows the most recently declared one wins, even mid-window.

use super::error::IntervalError;

/// How [`FixedCountHandler::add_interval`] classified a new window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddedInterval {
    /// The window was `[0, ∞)` and collapsed into the baseline,
    /// shadowing the previous baseline if one was set.
    Baseline { shadowed: Option<f64> },
    /// A bounded window joined the schedule.
    Scheduled,
}

/// Per-molecule resolver for baseline, change points, and windows.
#[derive(Debug, Clone, Default)]
pub struct FixedCountHandler {
    baseline: Option<f64>,
    /// Discrete `(time, value)` points, kept sorted by time.
    change_points: Vec<(f64, f64)>,
    /// Declared `(start, end, value)` windows, in declaration order.
    intervals: Vec<(f64, f64, f64)>,
    /// Cached breakpoint timeline; `None` means "no window active".
    points: Vec<(f64, Option<f64>)>,
    processed: bool,
}

impl FixedCountHandler {
    /// Creates an empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The permanent fixed count, if one was declared.
    #[must_use]
    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Sets the permanent fixed count, returning the value it shadows
    /// if one was already set.
    pub fn set_baseline(&mut self, value: f64) -> Option<f64> {
        self.baseline.replace(value)
    }

    /// The discrete change points, sorted by time.
    #[must_use]
    pub fn change_points(&self) -> &[(f64, f64)] {
        &self.change_points
    }

    /// Records `count = value` at `time`. A repeated time shadows the
    /// earlier value; the shadowed value is returned for reporting.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError::NegativeTime`] when `time < 0`.
    pub fn add_change_point(&mut self, time: f64, value: f64) -> Result<Option<f64>, IntervalError> {
        if time < 0.0 {
            return Err(IntervalError::NegativeTime(time));
        }
        let at = self
            .change_points
            .partition_point(|&(t, _)| t.total_cmp(&time).is_lt());
        if let Some(entry) = self.change_points.get_mut(at) {
            if entry.0 == time {
                let shadowed = entry.1;
                entry.1 = value;
                return Ok(Some(shadowed));
            }
        }
        self.change_points.insert(at, (time, value));
        Ok(None)
    }

    /// Declares `count = value` over `[start, end)`. An unbounded
    /// `[0, ∞)` window is the baseline in disguise.
    ///
    /// # Errors
    ///
    /// Returns an error for negative bounds or `end < start`.
    pub fn add_interval(
        &mut self,
        value: f64,
        start: f64,
        end: f64,
    ) -> Result<AddedInterval, IntervalError> {
        if start < 0.0 {
            return Err(IntervalError::NegativeTime(start));
        }
        if end < 0.0 {
            return Err(IntervalError::NegativeTime(end));
        }
        if end < start {
            return Err(IntervalError::EndBeforeStart);
        }

        if start == 0.0 && end.is_infinite() {
            let shadowed = self.set_baseline(value);
            return Ok(AddedInterval::Baseline { shadowed });
        }

        self.intervals.push((start, end, value));
        self.processed = false;
        Ok(AddedInterval::Scheduled)
    }

    /// The resolved breakpoint timeline: sparse `(time, value)` entries
    /// recording each point the effective window value changes, with
    /// `None` where no window is active. Computed on first query and
    /// cached until a new window is added.
    pub fn interval_points(&mut self) -> &[(f64, Option<f64>)] {
        if !self.processed {
            let segments = self.sweep();
            self.points = Self::collapse(segments);
            self.processed = true;
        }
        &self.points
    }

    /// Sweeps the window start/end events into contiguous
    /// `(start, end, value)` segments covering `[0, ∞)`.
    fn sweep(&self) -> Vec<(f64, f64, Option<f64>)> {
        struct Event {
            time: f64,
            value: f64,
            index: usize,
            is_end: bool,
        }

        let mut events = Vec::with_capacity(self.intervals.len() * 2);
        for (index, &(start, end, value)) in self.intervals.iter().enumerate() {
            events.push(Event {
                time: start,
                value,
                index,
                is_end: false,
            });
            if end.is_finite() {
                events.push(Event {
                    time: end,
                    value,
                    index,
                    is_end: true,
                });
            }
        }
        if events.is_empty() {
            return Vec::new();
        }
        events.sort_by(|a, b| {
            a.time
                .total_cmp(&b.time)
                .then(a.is_end.cmp(&b.is_end))
                .then(a.index.cmp(&b.index))
        });

        // Active window declarations as (value, declaration index). The
        // seed entry keeps the list non-empty outside every window; the
        // entry with the largest index decides each segment's value.
        let mut active: Vec<(Option<f64>, isize)> = vec![(None, -1)];
        let mut segments = Vec::with_capacity(events.len() + 1);
        let mut segment_start = 0.0;
        for event in &events {
            segments.push((segment_start, event.time, effective(&active)));
            if event.is_end {
                // Every end event matches a start pushed earlier.
                let declared = (Some(event.value), event.index as isize);
                if let Some(at) = active.iter().position(|entry| *entry == declared) {
                    active.remove(at);
                }
            } else {
                active.push((Some(event.value), event.index as isize));
            }
            segment_start = event.time;
        }
        segments.push((segment_start, f64::INFINITY, effective(&active)));
        segments
    }

    /// Drops zero-width segments, merges adjacent segments with equal
    /// values, and reduces the result to sparse breakpoints.
    fn collapse(segments: Vec<(f64, f64, Option<f64>)>) -> Vec<(f64, Option<f64>)> {
        let mut merged: Vec<(f64, f64, Option<f64>)> = Vec::new();
        for segment in segments {
            if segment.0 == segment.1 {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.2 == segment.2 => last.1 = segment.1,
                _ => merged.push(segment),
            }
        }
        merged
            .into_iter()
            .map(|(start, _, value)| (start, value))
            .collect()
    }
}

fn effective(active: &[(Option<f64>, isize)]) -> Option<f64> {
    active
        .iter()
        .max_by_key(|&&(_, index)| index)
        .and_then(|&(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_window_shadows_earlier_mid_window() {
        let mut handler = FixedCountHandler::new();
        handler.add_interval(7.0, 0.0, 10.0).unwrap();
        handler.add_interval(3.0, 5.0, 15.0).unwrap();
        assert_eq!(
            handler.interval_points(),
            &[(0.0, Some(7.0)), (5.0, Some(3.0)), (15.0, None)]
        );
    }

    #[test]
    fn earlier_window_resumes_after_later_one_ends() {
        let mut handler = FixedCountHandler::new();
        handler.add_interval(7.0, 0.0, 20.0).unwrap();
        handler.add_interval(3.0, 5.0, 10.0).unwrap();
        assert_eq!(
            handler.interval_points(),
            &[
                (0.0, Some(7.0)),
                (5.0, Some(3.0)),
                (10.0, Some(7.0)),
                (20.0, None)
            ]
        );
    }

    #[test]
    fn zero_width_window_leaves_only_the_unfixed_timeline() {
        let mut handler = FixedCountHandler::new();
        handler.add_interval(9.0, 5.0, 5.0).unwrap();
        // The dropped segment's neighbours merge into one free stretch.
        assert_eq!(handler.interval_points(), &[(0.0, None)]);
    }

    #[test]
    fn adjacent_windows_with_equal_value_merge() {
        let mut handler = FixedCountHandler::new();
        handler.add_interval(4.0, 0.0, 5.0).unwrap();
        handler.add_interval(4.0, 5.0, 10.0).unwrap();
        assert_eq!(
            handler.interval_points(),
            &[(0.0, Some(4.0)), (10.0, None)]
        );
    }

    #[test]
    fn result_is_cached_until_invalidated() {
        let mut handler = FixedCountHandler::new();
        handler.add_interval(2.0, 1.0, 3.0).unwrap();
        let first = handler.interval_points().to_vec();
        assert_eq!(handler.interval_points(), &first[..]);
        assert!(handler.processed);

        handler.add_interval(6.0, 2.0, 4.0).unwrap();
        assert!(!handler.processed);
        assert_eq!(
            handler.interval_points(),
            &[
                (0.0, None),
                (1.0, Some(2.0)),
                (2.0, Some(6.0)),
                (4.0, None)
            ]
        );
    }

    #[test]
    fn unbounded_window_becomes_baseline() {
        let mut handler = FixedCountHandler::new();
        let added = handler.add_interval(5.0, 0.0, f64::INFINITY).unwrap();
        assert_eq!(added, AddedInterval::Baseline { shadowed: None });
        assert_eq!(handler.baseline(), Some(5.0));
        assert_eq!(handler.interval_points(), &[]);

        let added = handler.add_interval(8.0, 0.0, f64::INFINITY).unwrap();
        assert_eq!(added, AddedInterval::Baseline { shadowed: Some(5.0) });
        assert_eq!(handler.baseline(), Some(8.0));
    }

    #[test]
    fn half_open_window_runs_to_infinity() {
        let mut handler = FixedCountHandler::new();
        handler.add_interval(2.5, 10.0, f64::INFINITY).unwrap();
        assert_eq!(
            handler.interval_points(),
            &[(0.0, None), (10.0, Some(2.5))]
        );
    }

    #[test]
    fn change_points_stay_sorted_and_newer_wins() {
        let mut handler = FixedCountHandler::new();
        assert_eq!(handler.add_change_point(10.0, 1.0), Ok(None));
        assert_eq!(handler.add_change_point(0.0, 2.0), Ok(None));
        assert_eq!(handler.add_change_point(10.0, 9.0), Ok(Some(1.0)));
        assert_eq!(handler.change_points(), &[(0.0, 2.0), (10.0, 9.0)]);
    }

    #[test]
    fn negative_bounds_are_rejected() {
        let mut handler = FixedCountHandler::new();
        assert_eq!(
            handler.add_change_point(-1.0, 5.0),
            Err(IntervalError::NegativeTime(-1.0))
        );
        assert_eq!(
            handler.add_interval(5.0, -2.0, 4.0),
            Err(IntervalError::NegativeTime(-2.0))
        );
        assert_eq!(
            handler.add_interval(5.0, 8.0, 4.0),
            Err(IntervalError::EndBeforeStart)
        );
    }
}
