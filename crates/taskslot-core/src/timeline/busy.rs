//! The set of already-committed time.
//!
//! Members are kept sorted by `(start, end)` with exact duplicates removed.
//! Overlapping members are never coalesced: intervals fetched from a calendar
//! are stored as they came, and overlap questions are answered per member.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::interval::Interval;

/// Ordered collection of busy intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Interval>", into = "Vec<Interval>")]
pub struct BusyIntervalSet {
    intervals: Vec<Interval>,
}

impl BusyIntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new set holding the current members plus `intervals`,
    /// sorted and deduplicated.
    pub fn merge<I>(&self, intervals: I) -> Self
    where
        I: IntoIterator<Item = Interval>,
    {
        let mut merged: Vec<Interval> = self.intervals.clone();
        merged.extend(intervals);
        merged.sort_by_key(|i| (i.start(), i.end()));
        merged.dedup();
        Self { intervals: merged }
    }

    /// Insert one interval keeping sort order. Exact duplicates are ignored.
    pub fn insert(&mut self, interval: Interval) {
        let key = (interval.start(), interval.end());
        match self
            .intervals
            .binary_search_by_key(&key, |i| (i.start(), i.end()))
        {
            Ok(_) => {}
            Err(pos) => self.intervals.insert(pos, interval),
        }
    }

    /// Whether `candidate` intersects any member.
    pub fn overlaps(&self, candidate: &Interval) -> bool {
        self.first_overlap(candidate).is_some()
    }

    /// Earliest member intersecting `candidate`.
    pub fn first_overlap(&self, candidate: &Interval) -> Option<&Interval> {
        // Members starting at or after the candidate's end cannot intersect it.
        let upper = self
            .intervals
            .partition_point(|i| i.start() < candidate.end());
        self.intervals[..upper].iter().find(|i| i.overlaps(candidate))
    }

    /// Earliest member with `start <= t < end`.
    pub fn containing(&self, t: DateTime<FixedOffset>) -> Option<&Interval> {
        let upper = self.intervals.partition_point(|i| i.start() <= t);
        self.intervals[..upper].iter().find(|i| i.contains(t))
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }
}

impl From<Vec<Interval>> for BusyIntervalSet {
    fn from(intervals: Vec<Interval>) -> Self {
        BusyIntervalSet::new().merge(intervals)
    }
}

impl From<BusyIntervalSet> for Vec<Interval> {
    fn from(set: BusyIntervalSet) -> Self {
        set.intervals
    }
}

impl FromIterator<Interval> for BusyIntervalSet {
    fn from_iter<T: IntoIterator<Item = Interval>>(iter: T) -> Self {
        BusyIntervalSet::new().merge(iter)
    }
}

impl<'a> IntoIterator for &'a BusyIntervalSet {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 2, 0, 0, 0)
            .unwrap()
    }

    fn iv(start_h: i64, start_m: i64, end_h: i64, end_m: i64) -> Interval {
        let b = base();
        Interval::new(
            b + Duration::hours(start_h) + Duration::minutes(start_m),
            b + Duration::hours(end_h) + Duration::minutes(end_m),
        )
        .unwrap()
    }

    #[test]
    fn merge_sorts_and_deduplicates() {
        let set = BusyIntervalSet::new().merge(vec![iv(14, 0, 15, 0), iv(9, 0, 10, 0), iv(14, 0, 15, 0)]);
        let starts: Vec<_> = set.iter().map(|i| i.start()).collect();
        assert_eq!(set.len(), 2);
        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn merge_keeps_overlapping_members_separate() {
        let set = BusyIntervalSet::new().merge(vec![iv(9, 0, 11, 0), iv(10, 0, 12, 0)]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn merge_leaves_original_untouched() {
        let original = BusyIntervalSet::from(vec![iv(9, 0, 10, 0)]);
        let merged = original.merge(vec![iv(11, 0, 12, 0)]);
        assert_eq!(original.len(), 1);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn insert_keeps_order() {
        let mut set = BusyIntervalSet::from(vec![iv(9, 0, 10, 0), iv(15, 0, 16, 0)]);
        set.insert(iv(12, 0, 13, 0));
        set.insert(iv(12, 0, 13, 0));
        let hours: Vec<_> = set.iter().map(|i| (i.start() - base()).num_hours()).collect();
        assert_eq!(hours, vec![9, 12, 15]);
    }

    #[test]
    fn overlap_is_half_open() {
        let set = BusyIntervalSet::from(vec![iv(11, 30, 12, 30)]);
        assert!(set.overlaps(&iv(9, 0, 12, 0)));
        assert!(!set.overlaps(&iv(9, 0, 11, 30)));
        assert!(!set.overlaps(&iv(12, 30, 13, 0)));
    }

    #[test]
    fn first_overlap_finds_long_earlier_member() {
        // A long member starting early must still be found for a later candidate.
        let set = BusyIntervalSet::from(vec![iv(8, 0, 17, 0), iv(10, 0, 10, 30)]);
        let hit = set.first_overlap(&iv(10, 15, 11, 0)).unwrap();
        assert_eq!(*hit, iv(8, 0, 17, 0));
    }

    #[test]
    fn containing_finds_member() {
        let set = BusyIntervalSet::from(vec![iv(9, 0, 10, 0), iv(11, 0, 12, 0)]);
        assert_eq!(set.containing(base() + Duration::hours(11)), Some(&iv(11, 0, 12, 0)));
        assert!(set.containing(base() + Duration::hours(10)).is_none());
    }

    #[test]
    fn serializes_as_plain_list() {
        let set = BusyIntervalSet::from(vec![iv(9, 0, 10, 0)]);
        let json = serde_json::to_value(&set).unwrap();
        assert!(json.is_array());
        let back: BusyIntervalSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }
}
