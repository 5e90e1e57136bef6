//! The visible window the host is drawing.
//!
//! A [`Histogram`] covers the visible time range split into equal bins and
//! knows how many entries fall into each. A [`Graph`] is one plot row: the
//! pixel anchor of every bin on that row.

use crate::render::Point;
use crate::trace::TraceStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    min: u64,
    max: u64,
    bin_size: u64,
    bin_counts: Vec<usize>,
}

impl Histogram {
    /// An empty histogram over `[min, max]` with `n_bins` bins.
    ///
    /// The bin size is rounded up so the last bin reaches `max`.
    pub fn new(min: u64, max: u64, n_bins: usize) -> Self {
        let n_bins = n_bins.max(1);
        // ceil((gap + 1) / n) without forming `gap + 1`, which overflows for
        // the full u64 range.
        let gap = max.saturating_sub(min);
        let bin_size = gap / n_bins as u64 + 1;
        Self {
            min,
            max,
            bin_size,
            bin_counts: vec![0; n_bins],
        }
    }

    /// Build a histogram over `[min, max]` counting every entry of the store
    /// that falls inside it.
    pub fn from_store(store: &TraceStore, min: u64, max: u64, n_bins: usize) -> Self {
        let mut histo = Self::new(min, max, n_bins);
        for (_, entry) in store.iter() {
            histo.add(entry.ts);
        }
        histo
    }

    /// Count one entry at `ts`. Entries outside the window are not counted.
    pub fn add(&mut self, ts: u64) {
        if let Some(bin) = self.bin_of(ts) {
            self.bin_counts[bin] += 1;
        }
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn bin_size(&self) -> u64 {
        self.bin_size
    }

    pub fn n_bins(&self) -> usize {
        self.bin_counts.len()
    }

    pub fn bin_count(&self, bin: usize) -> usize {
        self.bin_counts.get(bin).copied().unwrap_or(0)
    }

    /// Total number of entries across all visible bins.
    pub fn total_count(&self) -> usize {
        self.bin_counts.iter().sum()
    }

    pub fn contains(&self, ts: u64) -> bool {
        ts >= self.min && ts <= self.max
    }

    /// The bin `ts` falls into, or `None` outside the window.
    pub fn bin_of(&self, ts: u64) -> Option<usize> {
        if !self.contains(ts) {
            return None;
        }
        let bin = ((ts - self.min) / self.bin_size) as usize;
        Some(bin.min(self.n_bins() - 1))
    }
}

/// Pixel anchors of each bin on one plot row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    bins: Vec<Point>,
}

impl Graph {
    pub fn new(bins: Vec<Point>) -> Self {
        Self { bins }
    }

    /// A horizontal row of `n_bins` anchors spread over `width` pixels at
    /// height `base_y`.
    pub fn row(n_bins: usize, width: i32, base_y: i32) -> Self {
        let n = n_bins.max(1) as i64;
        let bins = (0..n)
            .map(|i| Point::new((i * width as i64 / n) as i32, base_y))
            .collect();
        Self { bins }
    }

    pub fn bin(&self, bin: usize) -> Option<Point> {
        self.bins.get(bin).copied()
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}
