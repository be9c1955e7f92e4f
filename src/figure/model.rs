use std::collections::BTreeSet;

use crate::color::{MassColors, Rgb};
use crate::data::model::{MassKey, Species};
use crate::spectrum::{ChannelSpectra, PlotSettings};

// ---------------------------------------------------------------------------
// Trace visibility
// ---------------------------------------------------------------------------

/// Mass groups and species switched off by the user. Empty means show all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceFilter {
    pub hidden_masses: BTreeSet<MassKey>,
    pub hidden_species: BTreeSet<Species>,
}

impl TraceFilter {
    pub fn is_visible(&self, mass: MassKey, species: Species) -> bool {
        !self.hidden_masses.contains(&mass) && !self.hidden_species.contains(&species)
    }
}

// ---------------------------------------------------------------------------
// Traces and panels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Solid,
    Dashed,
    Dotted,
}

impl LineKind {
    fn for_position(i: usize) -> LineKind {
        match i % 3 {
            0 => LineKind::Solid,
            1 => LineKind::Dashed,
            _ => LineKind::Dotted,
        }
    }
}

/// One step curve: dN/dE against the left edge of each bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub label: String,
    pub mass: MassKey,
    pub species: Species,
    pub color: Rgb,
    pub kind: LineKind,
    pub left_edges: Vec<f64>,
    pub values: Vec<f64>,
}

impl Trace {
    /// Step path where each value holds on the interval ending at its own x
    /// (`x[i-1]`, `x[i]`], the convention of a "pre" step plot.
    pub fn step_path(&self) -> Vec<(f64, f64)> {
        let n = self.left_edges.len().min(self.values.len());
        let mut path = Vec::with_capacity(2 * n);
        if n == 0 {
            return path;
        }
        path.push((self.left_edges[0], self.values[0]));
        for i in 1..n {
            path.push((self.left_edges[i - 1], self.values[i]));
            path.push((self.left_edges[i], self.values[i]));
        }
        path
    }

    /// The step path split wherever it leaves the positive quadrant, which
    /// log axes cannot show.
    pub fn log_segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current: Vec<(f64, f64)> = Vec::new();
        for (x, y) in self.step_path() {
            if x > 0.0 && y > 0.0 && y.is_finite() {
                current.push((x, y));
            } else if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments.retain(|s| s.len() >= 2);
        segments
    }

    /// Log segments with y pinned into `y_range`, for panels whose axis is
    /// fixed rather than fitted.
    pub fn clipped_segments(&self, (y0, y1): (f64, f64)) -> Vec<Vec<(f64, f64)>> {
        self.log_segments()
            .into_iter()
            .map(|seg| seg.into_iter().map(|(x, y)| (x, y.clamp(y0, y1))).collect())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub traces: Vec<Trace>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub x_label: String,
    pub y_label: String,
}

// ---------------------------------------------------------------------------
// Figure – explicit render context
// ---------------------------------------------------------------------------

/// Everything a renderer needs; built once from the analysis, then handed to
/// the image exporter and/or the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub panels: Vec<Panel>,
}

const FALLBACK_Y_RANGE: (f64, f64) = (1e-7, 1.0);

impl Figure {
    pub fn build(
        channels: &[ChannelSpectra],
        plot: &PlotSettings,
        colors: &MassColors,
        filter: &TraceFilter,
    ) -> Figure {
        let panels = channels
            .iter()
            .map(|channel| build_panel(channel, plot, colors, filter))
            .collect();
        Figure { panels }
    }

    /// `(rows, cols)` of a near-square grid holding every panel.
    pub fn grid(&self) -> (usize, usize) {
        let n = self.panels.len().max(1);
        let cols = (n as f64).sqrt().ceil() as usize;
        let rows = n.div_ceil(cols);
        (rows, cols)
    }
}

fn build_panel(
    channel: &ChannelSpectra,
    plot: &PlotSettings,
    colors: &MassColors,
    filter: &TraceFilter,
) -> Panel {
    let multi_species = plot.species.len() > 1;
    let mut traces = Vec::new();
    let mut x_range = (1.0, 100.0);

    for group in &channel.groups {
        for (pos, &species) in plot.species.iter().enumerate() {
            if !filter.is_visible(group.mass, species) {
                continue;
            }
            let Some(spectrum) = group.spectrum(species) else {
                continue;
            };
            let edges = &spectrum.histogram.edges;
            x_range = (edges.lower(), edges.upper());

            let label = if multi_species {
                format!("{} {}", group.label, species.symbol())
            } else {
                group.label.clone()
            };
            let n = edges.n_bins();
            traces.push(Trace {
                label,
                mass: group.mass,
                species,
                color: colors.color_for(group.mass),
                kind: LineKind::for_position(pos),
                left_edges: edges.edges()[..n].to_vec(),
                values: spectrum.dn_de.clone(),
            });
        }
    }

    let y_range = plot.y_range.unwrap_or_else(|| fit_log_range(&traces));

    Panel {
        title: channel.label.clone(),
        traces,
        x_range,
        y_range,
        x_label: plot.x_label.clone(),
        y_label: plot.y_label.clone(),
    }
}

/// Positive data range padded by half a decade each side.
fn fit_log_range(traces: &[Trace]) -> (f64, f64) {
    let (lo, hi) = traces
        .iter()
        .flat_map(|t| t.values.iter().copied())
        .filter(|v| *v > 0.0 && v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return FALLBACK_Y_RANGE;
    }
    let pad = 10f64.sqrt();
    (lo / pad, hi * pad)
}
