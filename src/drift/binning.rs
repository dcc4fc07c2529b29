//! Histogram binning for numeric and categorical features.

use std::collections::{BTreeSet, HashMap};

/// Per-bin counts over the non-null cells of one side of a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: Vec<u64>,
}

impl Histogram {
    /// Create an empty histogram with `bins` bins.
    pub fn new(bins: usize) -> Self {
        Self {
            counts: vec![0; bins],
        }
    }

    /// Create a histogram from raw counts.
    pub fn from_counts(counts: Vec<u64>) -> Self {
        Self { counts }
    }

    /// Count one observation in `bin`.
    ///
    /// # Panics
    ///
    /// Panics if `bin` is out of range; bin indices come from the binning
    /// types in this module, which never exceed their own bin count.
    pub fn add(&mut self, bin: usize) {
        self.counts[bin] += 1;
    }

    /// Count `n` observations in `bin`.
    pub fn add_n(&mut self, bin: usize, n: u64) {
        self.counts[bin] += n;
    }

    /// Raw counts.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if there are no bins.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of observations.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Fraction of observations per bin. All zeros when nothing was counted.
    pub fn fractions(&self) -> Vec<f64> {
        let total = self.total();
        if total == 0 {
            return vec![0.0; self.counts.len()];
        }
        let total = total as f64;
        self.counts.iter().map(|&c| c as f64 / total).collect()
    }
}

/// Smallest and largest value, or `None` for an empty input.
pub fn value_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |range, v| match range {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Equal-width bins over a closed numeric range.
///
/// Values below the range land in the first bin and values above it in the
/// last, so a shifted distribution piles up at the edges instead of being
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericBins {
    lo: f64,
    hi: f64,
    // Half of the bin width, so ranges wider than `f64::MAX` stay finite.
    half_width: f64,
    count: usize,
}

impl NumericBins {
    /// Create `count` bins over `[lo, hi]`.
    ///
    /// A zero-width range is widened to `[lo, lo + 1]`.
    pub fn new(lo: f64, hi: f64, count: usize) -> Self {
        let count = count.max(1);
        let hi = if hi > lo { hi } else { lo + 1.0 };
        Self {
            lo,
            hi,
            half_width: (hi / 2.0 - lo / 2.0) / count as f64,
            count,
        }
    }

    /// Bin index of `value`, clipped into `0..count`.
    pub fn index(&self, value: f64) -> usize {
        if value <= self.lo {
            return 0;
        }
        // Saturating cast: an infinite ratio lands in the last bin.
        let bin = ((value / 2.0 - self.lo / 2.0) / self.half_width).floor() as usize;
        bin.min(self.count - 1)
    }

    /// Number of bins.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Lower edge of the first bin.
    pub fn lo(&self) -> f64 {
        self.lo
    }

    /// Upper edge of the last bin, after widening.
    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// Width of each bin. Infinite when the range exceeds `f64::MAX`.
    pub fn width(&self) -> f64 {
        self.half_width * 2.0
    }
}

/// One bin per distinct category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalBins {
    categories: Vec<String>,
    index: HashMap<String, usize>,
}

impl CategoricalBins {
    /// Bins in first-seen order.
    pub fn first_seen<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut categories = Vec::new();
        let mut index = HashMap::new();
        for key in keys {
            if !index.contains_key(key) {
                index.insert(key.to_string(), categories.len());
                categories.push(key.to_string());
            }
        }
        Self { categories, index }
    }

    /// Bins in lexicographic order. Order does not depend on which side a
    /// key came from.
    pub fn sorted<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let sorted: BTreeSet<&str> = keys.into_iter().collect();
        Self::first_seen(sorted)
    }

    /// Bin index of a category.
    pub fn index(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Categories in bin order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of distinct categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Returns true if no category was seen.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
