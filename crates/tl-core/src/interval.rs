//! Interval math over entries.
//!
//! Every interval is half-open: `[start, end)`. Two intervals that only touch
//! (`a.end == b.start`) do not overlap. An open entry is treated as running until `now`.

use chrono::{DateTime, Duration, Utc};

use crate::entry::Entry;
use crate::types::Window;

/// Minutes given to an entry stopped at or before its own start.
pub const MIN_STOP_MINUTES: i64 = 1;

/// Length of the intersection of two half-open intervals, zero when disjoint.
fn intersection(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> Duration {
    let latest_start = a_start.max(b_start);
    let earliest_end = a_end.min(b_end);
    if earliest_end <= latest_start {
        return Duration::zero();
    }
    earliest_end - latest_start
}

/// The part of `entry` that falls inside `window`.
///
/// An open entry extends to `now`, so a running entry already counts toward today.
pub fn clamped_duration(entry: &Entry, window: &Window, now: DateTime<Utc>) -> Duration {
    intersection(
        entry.start,
        entry.effective_end(now),
        window.start(),
        window.end(),
    )
}

/// The first existing entry that intersects a candidate interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap<'a> {
    /// Position of the conflicting entry in the input slice.
    pub index: usize,
    /// The conflicting entry.
    pub entry: &'a Entry,
    /// How much of the candidate it covers.
    pub duration: Duration,
}

/// Checks `[start, end)` against every entry, in slice order.
///
/// Returns the first entry with a nonzero intersection, not the largest one. The open entry,
/// if any, is extended to `now`.
pub fn check_overlap(
    entries: &[Entry],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<Overlap<'_>> {
    entries.iter().enumerate().find_map(|(index, entry)| {
        let duration = intersection(start, end, entry.start, entry.effective_end(now));
        (duration > Duration::zero()).then_some(Overlap {
            index,
            entry,
            duration,
        })
    })
}

/// End time to record when stopping an entry that started at `open_start`.
///
/// A request at or before the start is moved to one minute after it so the stopped entry
/// always has a positive length.
pub fn stop_time(open_start: DateTime<Utc>, requested: DateTime<Utc>) -> DateTime<Utc> {
    if requested <= open_start {
        open_start + Duration::minutes(MIN_STOP_MINUTES)
    } else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, hour, minute, 0).unwrap()
    }

    fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> Entry {
        Entry::closed(start, end, "work").unwrap()
    }

    fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> Window {
        Window::new(start, end).unwrap()
    }

    #[test]
    fn clamped_duration_inside_window_is_full_length() {
        let entry = closed(at(9, 0), at(10, 30));
        let day = window(at(0, 0), at(23, 59));
        assert_eq!(clamped_duration(&entry, &day, at(12, 0)), Duration::minutes(90));
    }

    #[test]
    fn clamped_duration_cuts_at_window_edges() {
        let entry = closed(at(8, 0), at(12, 0));
        let morning = window(at(9, 0), at(10, 0));
        assert_eq!(clamped_duration(&entry, &morning, at(13, 0)), Duration::hours(1));
    }

    #[test]
    fn clamped_duration_is_zero_when_disjoint_or_touching() {
        let entry = closed(at(9, 0), at(10, 0));
        assert_eq!(
            clamped_duration(&entry, &window(at(10, 0), at(11, 0)), at(12, 0)),
            Duration::zero()
        );
        assert_eq!(
            clamped_duration(&entry, &window(at(11, 0), at(12, 0)), at(12, 0)),
            Duration::zero()
        );
    }

    #[test]
    fn open_entry_extends_to_now() {
        let entry = Entry::open(at(11, 0), "running").unwrap();
        let day = window(at(0, 0), at(23, 0));
        assert_eq!(clamped_duration(&entry, &day, at(11, 40)), Duration::minutes(40));
        // Before the entry started it contributes nothing.
        assert_eq!(clamped_duration(&entry, &day, at(10, 0)), Duration::zero());
    }

    #[test]
    fn clamped_duration_is_additive_over_split_windows() {
        let entries = [
            closed(at(8, 0), at(9, 30)),
            closed(at(9, 10), at(9, 20)),
            closed(at(10, 0), at(11, 0)),
            Entry::open(at(9, 45), "running").unwrap(),
        ];
        let whole = window(at(9, 0), at(10, 30));
        let now = at(12, 0);
        for split in [at(9, 15), at(9, 30), at(9, 45), at(10, 0), at(10, 29)] {
            let (left, right) = whole.split_at(split).unwrap();
            for entry in &entries {
                assert_eq!(
                    clamped_duration(entry, &whole, now),
                    clamped_duration(entry, &left, now) + clamped_duration(entry, &right, now),
                    "split at {split} for entry starting {}",
                    entry.start
                );
            }
        }
    }

    #[test]
    fn overlap_reports_conflicting_entry_and_length() {
        let entries = vec![closed(at(9, 30), at(10, 30))];
        let overlap = check_overlap(&entries, at(9, 0), at(10, 0), at(12, 0)).unwrap();

        assert_eq!(overlap.index, 0);
        assert_eq!(overlap.entry.start, at(9, 30));
        assert_eq!(overlap.duration, Duration::minutes(30));
    }

    #[test]
    fn adjacent_intervals_do_not_overlap() {
        let entries = vec![closed(at(9, 0), at(10, 0))];
        assert!(check_overlap(&entries, at(10, 0), at(11, 0), at(12, 0)).is_none());
        assert!(check_overlap(&entries, at(8, 0), at(9, 0), at(12, 0)).is_none());
    }

    #[test]
    fn overlap_checks_every_entry_not_just_neighbours() {
        // Out-of-order log: the conflict is the first entry, far from the tail.
        let entries = vec![
            closed(at(7, 0), at(8, 0)),
            closed(at(13, 0), at(14, 0)),
            closed(at(15, 0), at(16, 0)),
        ];
        let overlap = check_overlap(&entries, at(7, 30), at(7, 45), at(17, 0)).unwrap();
        assert_eq!(overlap.index, 0);
        assert_eq!(overlap.duration, Duration::minutes(15));
    }

    #[test]
    fn first_conflict_wins_over_largest() {
        let entries = vec![closed(at(9, 0), at(9, 10)), closed(at(9, 10), at(11, 0))];
        let overlap = check_overlap(&entries, at(9, 0), at(11, 0), at(12, 0)).unwrap();
        assert_eq!(overlap.index, 0);
        assert_eq!(overlap.duration, Duration::minutes(10));
    }

    #[test]
    fn open_entry_overlaps_up_to_now() {
        let entries = vec![Entry::open(at(11, 0), "running").unwrap()];
        let now = at(12, 0);

        let overlap = check_overlap(&entries, at(10, 30), at(11, 30), now).unwrap();
        assert_eq!(overlap.duration, Duration::minutes(30));

        assert!(check_overlap(&entries, at(10, 0), at(11, 0), now).is_none());
    }

    #[test]
    fn overlap_agrees_with_clamped_duration() {
        let a = closed(at(9, 0), at(10, 0));
        let candidates = [
            (at(8, 0), at(9, 0)),
            (at(8, 0), at(9, 1)),
            (at(9, 15), at(9, 45)),
            (at(9, 59), at(11, 0)),
            (at(10, 0), at(11, 0)),
        ];
        let now = at(12, 0);
        for (start, end) in candidates {
            let b = closed(start, end);
            let flagged = check_overlap(std::slice::from_ref(&a), start, end, now).is_some();
            let a_in_b = clamped_duration(&a, &window(start, end), now);
            let b_in_a = clamped_duration(&b, &window(a.start, at(10, 0)), now);
            assert_eq!(flagged, a_in_b > Duration::zero());
            assert_eq!(a_in_b, b_in_a);
        }
    }

    #[test]
    fn stop_time_is_kept_when_after_start() {
        assert_eq!(stop_time(at(9, 0), at(9, 30)), at(9, 30));
    }

    #[test]
    fn stop_at_or_before_start_gets_one_minute() {
        assert_eq!(stop_time(at(9, 0), at(9, 0)), at(9, 1));
        assert_eq!(stop_time(at(9, 0), at(8, 0)), at(9, 1));
    }
}
