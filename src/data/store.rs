//! Bounded sliding-window storage for live sensor series.
//!
//! The store keeps up to [`SERIES_CEILING`] named series aligned against a
//! shared sequence of timestamp labels, retaining the most recent
//! [`WINDOW_CAPACITY`] sampling instants. All mutation goes through
//! [`SeriesStore::update`] and [`SeriesStore::reset`]; the label/series
//! alignment is an internal invariant, never exposed for external mutation.

use std::collections::{BTreeMap, VecDeque};

use chrono::Local;

/// Maximum number of retained sampling instants (a 30 second window at two
/// readings per second).
pub const WINDOW_CAPACITY: usize = 60;

/// Maximum number of concurrently tracked series.
pub const SERIES_CEILING: usize = 6;

/// Number of display colors available for series.
pub const PALETTE_SIZE: usize = 6;

/// What happened to one tag during an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// The reading was appended to a new or existing series.
    Accepted,
    /// The tag was new but the series ceiling is already reached.
    DroppedCeilingReached,
}

/// One named series: an ordered sequence of optional samples, one slot per
/// timestamp label. An absent sample renders as a gap, not an interpolation.
#[derive(Debug, Clone)]
pub struct Series {
    tag: String,
    palette_slot: usize,
    samples: VecDeque<Option<f64>>,
}

impl Series {
    /// The tag this series was created for.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Index into the fixed display palette, assigned at creation.
    pub fn palette_slot(&self) -> usize {
        self.palette_slot
    }

    /// The samples in window order, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.samples.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Present samples as chart points, indexed by window position.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
            .collect()
    }

    /// The most recent present sample, if any.
    pub fn latest(&self) -> Option<f64> {
        self.samples.iter().rev().find_map(|v| *v)
    }
}

/// Fixed-capacity sliding window of time-aligned samples across named series.
#[derive(Debug, Default, Clone)]
pub struct SeriesStore {
    labels: VecDeque<String>,
    series: Vec<Series>,
}

impl SeriesStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sampling instant stamped with the current local time.
    ///
    /// An empty mapping is a no-op: no label is appended, so the alignment
    /// invariant cannot drift through the public API.
    pub fn update(&mut self, readings: &BTreeMap<String, f64>) -> Vec<(String, SampleOutcome)> {
        self.update_with_label(readings, Local::now().format("%H:%M:%S").to_string())
    }

    /// Record one sampling instant with an explicit label.
    ///
    /// Appends the label, then for each tag either appends its value to an
    /// existing series, creates a series (below the ceiling) with the next
    /// palette slot, or reports [`SampleOutcome::DroppedCeilingReached`].
    /// Series without a reading this instant receive a gap. When the window
    /// exceeds [`WINDOW_CAPACITY`] the oldest instant is evicted from the
    /// labels and every series.
    pub fn update_with_label(
        &mut self,
        readings: &BTreeMap<String, f64>,
        label: String,
    ) -> Vec<(String, SampleOutcome)> {
        if readings.is_empty() {
            return Vec::new();
        }

        self.labels.push_back(label);

        let mut outcomes = Vec::with_capacity(readings.len());
        for (tag, value) in readings {
            let idx = match self.series.iter().position(|s| s.tag == *tag) {
                Some(idx) => idx,
                None => {
                    if self.series.len() >= SERIES_CEILING {
                        outcomes.push((tag.clone(), SampleOutcome::DroppedCeilingReached));
                        continue;
                    }
                    let palette_slot = self.series.len() % PALETTE_SIZE;
                    // Instants before this tag first appeared stay as gaps
                    let mut samples = VecDeque::with_capacity(WINDOW_CAPACITY + 1);
                    samples.extend(std::iter::repeat(None).take(self.labels.len() - 1));
                    self.series.push(Series {
                        tag: tag.clone(),
                        palette_slot,
                        samples,
                    });
                    self.series.len() - 1
                }
            };
            self.series[idx].samples.push_back(Some(*value));
            outcomes.push((tag.clone(), SampleOutcome::Accepted));
        }

        // Series not observed this instant get an explicit gap to stay
        // index-aligned with the labels
        for series in &mut self.series {
            if series.samples.len() < self.labels.len() {
                series.samples.push_back(None);
            }
        }

        if self.labels.len() > WINDOW_CAPACITY {
            self.labels.pop_front();
            for series in &mut self.series {
                series.samples.pop_front();
            }
        }

        self.assert_aligned();
        outcomes
    }

    /// Clear the label sequence and all series.
    ///
    /// Palette slots are re-derived from scratch on the next creation.
    pub fn reset(&mut self) {
        self.labels.clear();
        self.series.clear();
    }

    /// The timestamp labels in window order, oldest first.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// The oldest and newest labels of the current window.
    pub fn label_bounds(&self) -> Option<(&str, &str)> {
        Some((self.labels.front()?.as_str(), self.labels.back()?.as_str()))
    }

    /// The live series in creation order.
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Number of retained sampling instants.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Minimum and maximum over all present samples, for chart bounds.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let mut bounds: Option<(f64, f64)> = None;
        for value in self.series.iter().flat_map(|s| s.samples()).flatten() {
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(value), max.max(value)),
                None => (value, value),
            });
        }
        bounds
    }

    /// Label/series alignment is structural; a mismatch is an internal
    /// consistency fault, not a recoverable condition.
    fn assert_aligned(&self) {
        for series in &self.series {
            assert_eq!(
                series.samples.len(),
                self.labels.len(),
                "series '{}' out of step with the label window",
                series.tag
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(t, v)| (t.to_string(), *v)).collect()
    }

    fn update(store: &mut SeriesStore, pairs: &[(&str, f64)]) -> Vec<(String, SampleOutcome)> {
        let label = format!("t{}", store.len());
        store.update_with_label(&readings(pairs), label)
    }

    fn series<'a>(store: &'a SeriesStore, tag: &str) -> &'a Series {
        store.series().iter().find(|s| s.tag() == tag).unwrap()
    }

    #[test]
    fn test_update_appends_label_and_sample() {
        let mut store = SeriesStore::new();
        let outcomes = update(&mut store, &[("temp", 21.5)]);
        assert_eq!(outcomes, vec![("temp".to_string(), SampleOutcome::Accepted)]);
        assert_eq!(store.len(), 1);
        assert_eq!(series(&store, "temp").samples().collect::<Vec<_>>(), vec![Some(21.5)]);
    }

    #[test]
    fn test_empty_mapping_is_a_no_op() {
        let mut store = SeriesStore::new();
        let outcomes = store.update_with_label(&BTreeMap::new(), "t0".to_string());
        assert!(outcomes.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_window_evicts_oldest_instant() {
        let mut store = SeriesStore::new();
        for i in 1..=61 {
            update(&mut store, &[("temp", i as f64)]);
        }
        assert_eq!(store.len(), WINDOW_CAPACITY);
        let samples: Vec<_> = series(&store, "temp").samples().collect();
        assert_eq!(samples.len(), WINDOW_CAPACITY);
        // The first call was evicted; calls 2..=61 remain
        assert_eq!(samples.first(), Some(&Some(2.0)));
        assert_eq!(samples.last(), Some(&Some(61.0)));
        assert_eq!(store.labels().next(), Some("t1"));
    }

    #[test]
    fn test_seventh_tag_is_dropped_at_ceiling() {
        let mut store = SeriesStore::new();
        update(
            &mut store,
            &[("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 4.0), ("e", 5.0), ("f", 6.0)],
        );
        let outcomes = update(&mut store, &[("g", 7.0)]);
        assert_eq!(
            outcomes,
            vec![("g".to_string(), SampleOutcome::DroppedCeilingReached)]
        );
        assert_eq!(store.series().len(), SERIES_CEILING);
        assert!(store.series().iter().all(|s| s.tag() != "g"));
        // The label still advanced and the live series received gaps
        assert_eq!(store.len(), 2);
        assert_eq!(series(&store, "a").samples().collect::<Vec<_>>(), vec![Some(1.0), None]);
    }

    #[test]
    fn test_omitted_tag_receives_gap() {
        let mut store = SeriesStore::new();
        update(&mut store, &[("temp", 1.0), ("hum", 50.0)]);
        update(&mut store, &[("temp", 2.0)]);
        assert_eq!(store.len(), 2);
        assert_eq!(series(&store, "hum").samples().collect::<Vec<_>>(), vec![Some(50.0), None]);
        assert_eq!(series(&store, "temp").samples().collect::<Vec<_>>(), vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_late_tag_backfills_gaps() {
        let mut store = SeriesStore::new();
        update(&mut store, &[("temp", 1.0)]);
        update(&mut store, &[("temp", 2.0), ("hum", 50.0)]);
        assert_eq!(series(&store, "hum").samples().collect::<Vec<_>>(), vec![None, Some(50.0)]);
    }

    #[test]
    fn test_reset_leaves_no_residue() {
        let mut store = SeriesStore::new();
        for i in 0..10 {
            update(&mut store, &[("a", i as f64), ("b", i as f64)]);
        }
        store.reset();
        update(&mut store, &[("a", 1.0)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.series().len(), 1);
        assert_eq!(store.series()[0].tag(), "a");
        assert_eq!(store.series()[0].len(), 1);
        // Palette assignment restarted from slot 0
        assert_eq!(store.series()[0].palette_slot(), 0);
    }

    #[test]
    fn test_palette_slots_follow_creation_order() {
        let mut store = SeriesStore::new();
        update(&mut store, &[("a", 1.0), ("b", 2.0), ("c", 3.0)]);
        let slots: Vec<_> = store.series().iter().map(|s| s.palette_slot()).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }

    #[test]
    fn test_points_skip_gaps() {
        let mut store = SeriesStore::new();
        update(&mut store, &[("a", 1.0), ("b", 10.0)]);
        update(&mut store, &[("a", 2.0)]);
        update(&mut store, &[("a", 3.0), ("b", 30.0)]);
        assert_eq!(series(&store, "b").points(), vec![(0.0, 10.0), (2.0, 30.0)]);
        assert_eq!(series(&store, "b").latest(), Some(30.0));
    }

    #[test]
    fn test_value_bounds_cover_all_series() {
        let mut store = SeriesStore::new();
        assert!(store.value_bounds().is_none());
        update(&mut store, &[("a", -3.0), ("b", 7.5)]);
        update(&mut store, &[("a", 1.0)]);
        assert_eq!(store.value_bounds(), Some((-3.0, 7.5)));
    }

    #[test]
    fn test_eviction_keeps_alignment_with_mixed_tags() {
        let mut store = SeriesStore::new();
        for i in 0..70 {
            if i % 2 == 0 {
                update(&mut store, &[("even", i as f64)]);
            } else {
                update(&mut store, &[("odd", i as f64)]);
            }
        }
        assert_eq!(store.len(), WINDOW_CAPACITY);
        for s in store.series() {
            assert_eq!(s.len(), WINDOW_CAPACITY);
        }
    }
}
