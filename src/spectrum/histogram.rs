use serde::Serialize;

use crate::data::group::Sample;
use crate::error::{SpectrumError, SpectrumResult};

// ---------------------------------------------------------------------------
// BinEdges
// ---------------------------------------------------------------------------

/// Strictly increasing energy bin edges (GeV).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    /// `n` edges spaced evenly in log10 between `10^log_min` and `10^log_max`.
    pub fn logspace(log_min: f64, log_max: f64, n: usize) -> SpectrumResult<Self> {
        if n < 2 {
            return Err(SpectrumError::InvalidBins(format!(
                "need at least 2 edges, got {n}"
            )));
        }
        if !(log_min.is_finite() && log_max.is_finite() && log_min < log_max) {
            return Err(SpectrumError::InvalidBins(format!(
                "exponent range {log_min}..{log_max} is empty"
            )));
        }
        let step = (log_max - log_min) / (n - 1) as f64;
        let edges = (0..n)
            .map(|i| {
                let exponent = if i == n - 1 {
                    log_max
                } else {
                    log_min + step * i as f64
                };
                10f64.powf(exponent)
            })
            .collect();
        BinEdges::from_edges(edges)
    }

    pub fn from_edges(edges: Vec<f64>) -> SpectrumResult<Self> {
        if edges.len() < 2 {
            return Err(SpectrumError::InvalidBins(format!(
                "need at least 2 edges, got {}",
                edges.len()
            )));
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SpectrumError::InvalidBins(
                "edges must be finite and strictly increasing".into(),
            ));
        }
        Ok(BinEdges { edges })
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn width(&self, bin: usize) -> f64 {
        self.edges[bin + 1] - self.edges[bin]
    }

    pub fn lower(&self) -> f64 {
        self.edges[0]
    }

    pub fn upper(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Bin index for `x`: left-inclusive, right-exclusive, except the last
    /// bin which also includes the upper edge. Out of range and NaN → `None`.
    pub fn find(&self, x: f64) -> Option<usize> {
        if !(x >= self.lower() && x <= self.upper()) {
            return None;
        }
        if x == self.upper() {
            return Some(self.n_bins() - 1);
        }
        Some(self.edges.partition_point(|&e| e <= x) - 1)
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Weighted counts over a set of bin edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: BinEdges,
    pub counts: Vec<f64>,
    /// Samples that fell inside the edge range.
    pub entries: usize,
}

impl Histogram {
    pub fn new(edges: BinEdges) -> Self {
        let counts = vec![0.0; edges.n_bins()];
        Histogram {
            edges,
            counts,
            entries: 0,
        }
    }

    pub fn fill(edges: &BinEdges, samples: &[Sample]) -> Self {
        let mut hist = Histogram::new(edges.clone());
        for s in samples {
            hist.add(s.energy, s.weight);
        }
        hist
    }

    /// Returns whether `x` was inside the edge range.
    pub fn add(&mut self, x: f64, weight: f64) -> bool {
        match self.edges.find(x) {
            Some(bin) => {
                self.counts[bin] += weight;
                self.entries += 1;
                true
            }
            None => false,
        }
    }

    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// `(low, high, count)` per bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.edges
            .edges()
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| (w[0], w[1], c))
    }

    /// dN/dE: each bin divided by its own width, then by `event_count` if given.
    pub fn normalized(&self, event_count: Option<f64>) -> Vec<f64> {
        let per_event = event_count.unwrap_or(1.0);
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| c / self.edges.width(i) / per_event)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(energies: &[f64]) -> Vec<Sample> {
        energies
            .iter()
            .map(|&energy| Sample { energy, weight: 1.0 })
            .collect()
    }

    #[test]
    fn logspace_matches_decade_layout() {
        let e = BinEdges::logspace(0.0, 2.0, 11).unwrap();
        assert_eq!(e.edges().len(), 11);
        assert_eq!(e.lower(), 1.0);
        assert_eq!(e.upper(), 100.0);
        assert!((e.edges()[5] - 10.0).abs() < 1e-12);

        let e = BinEdges::logspace(-1.0, 2.0, 21).unwrap();
        assert_eq!(e.n_bins(), 20);
        assert!((e.lower() - 0.1).abs() < 1e-15);
        assert_eq!(e.upper(), 100.0);
    }

    #[test]
    fn invalid_edges_are_rejected() {
        assert!(BinEdges::logspace(0.0, 2.0, 1).is_err());
        assert!(BinEdges::logspace(2.0, 0.0, 5).is_err());
        assert!(BinEdges::from_edges(vec![1.0, 1.0, 2.0]).is_err());
    }

    #[test]
    fn edge_convention() {
        let e = BinEdges::from_edges(vec![1.0, 2.0, 4.0]).unwrap();
        assert_eq!(e.find(1.0), Some(0));
        assert_eq!(e.find(1.999), Some(0));
        assert_eq!(e.find(2.0), Some(1));
        assert_eq!(e.find(4.0), Some(1));
        assert_eq!(e.find(0.5), None);
        assert_eq!(e.find(4.0001), None);
        assert_eq!(e.find(f64::NAN), None);
    }

    #[test]
    fn counts_sum_to_in_range_entries() {
        let e = BinEdges::logspace(0.0, 2.0, 11).unwrap();
        let h = Histogram::fill(&e, &unit(&[0.5, 1.0, 5.0, 7.0, 100.0, 150.0]));
        assert_eq!(h.total(), 4.0);
        assert_eq!(h.entries, 4);
        assert_eq!(h.counts[0], 1.0);
        assert_eq!(h.counts[3], 1.0);
        assert_eq!(h.counts[4], 1.0);
        assert_eq!(h.counts[9], 1.0);
    }

    #[test]
    fn normalization_divides_each_bin_by_its_width() {
        let e = BinEdges::from_edges(vec![1.0, 2.0, 4.0, 8.0]).unwrap();
        let h = Histogram::fill(&e, &unit(&[1.5, 3.0, 3.5, 5.0]));
        assert_eq!(h.normalized(None), vec![1.0, 1.0, 0.25]);
        assert_eq!(h.normalized(Some(10.0)), vec![0.1, 0.1, 0.025]);
    }

    #[test]
    fn doubling_widths_halves_density() {
        let narrow = BinEdges::from_edges(vec![1.0, 2.0, 3.0, 5.0]).unwrap();
        let wide = BinEdges::from_edges(vec![2.0, 4.0, 6.0, 10.0]).unwrap();
        let a = Histogram::fill(&narrow, &unit(&[1.2, 2.5, 2.7, 4.0]));
        let b = Histogram::fill(&wide, &unit(&[2.4, 5.0, 5.4, 8.0]));
        assert_eq!(a.counts, b.counts);
        for (x, y) in a.normalized(None).iter().zip(b.normalized(None)) {
            assert!((x / 2.0 - y).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_samples_give_zero_histogram() {
        let e = BinEdges::logspace(-1.0, 2.0, 21).unwrap();
        let h = Histogram::fill(&e, &[]);
        assert!(h.counts.iter().all(|&c| c == 0.0));
        assert!(h.normalized(Some(100.0)).iter().all(|&v| v == 0.0));
    }
}
