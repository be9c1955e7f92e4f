use std::path::PathBuf;

use serde::Serialize;

use crate::data::group::Weighting;
use crate::data::model::Species;

use super::analyzer::{AnalysisSettings, BinSpec};

/// Channel files read by the antideuteron preset when none are given.
pub const DEFAULT_CHANNEL_FILES: [&str; 3] =
    ["events_ww.txt", "events_ttbar.txt", "events_bbbar.txt"];

// ---------------------------------------------------------------------------
// Plot settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSettings {
    /// Species drawn for every mass group, in legend order.
    pub species: Vec<Species>,
    /// Fixed y-axis range; `None` fits the data.
    pub y_range: Option<(f64, f64)>,
    pub x_label: String,
    pub y_label: String,
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// The two canonical analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
    /// Antideuteron spectra, one panel per annihilation channel, per-event
    /// normalised over 1–100 GeV.
    Antideuteron,
    /// Antideuteron plus antiproton/antineutron spectra for one file over
    /// 0.1–100 GeV, saved to an image.
    #[default]
    Isospin,
}

impl Preset {
    pub fn analysis(self) -> AnalysisSettings {
        match self {
            Preset::Antideuteron => AnalysisSettings {
                bins: BinSpec {
                    log_min: 0.0,
                    log_max: 2.0,
                    edges: 11,
                },
                per_event: true,
                weighting: Weighting::Unit,
            },
            Preset::Isospin => AnalysisSettings {
                bins: BinSpec {
                    log_min: -1.0,
                    log_max: 2.0,
                    edges: 21,
                },
                per_event: false,
                weighting: Weighting::Unit,
            },
        }
    }

    pub fn plot(self) -> PlotSettings {
        let (species, y_range) = match self {
            Preset::Antideuteron => (vec![Species::Antideuteron], Some((1e-7, 1e-3))),
            Preset::Isospin => (
                vec![
                    Species::Antideuteron,
                    Species::Antiproton,
                    Species::Antineutron,
                ],
                None,
            ),
        };
        PlotSettings {
            species,
            y_range,
            x_label: "E (GeV)".into(),
            y_label: "dN/dE (count/GeV)".into(),
        }
    }

    pub fn default_inputs(self) -> Vec<PathBuf> {
        match self {
            Preset::Antideuteron => DEFAULT_CHANNEL_FILES.iter().map(PathBuf::from).collect(),
            Preset::Isospin => Vec::new(),
        }
    }

    /// Upper bound on positional inputs.
    pub fn max_inputs(self) -> Option<usize> {
        match self {
            Preset::Antideuteron => None,
            Preset::Isospin => Some(1),
        }
    }

    pub fn default_output(self) -> Option<PathBuf> {
        match self {
            Preset::Antideuteron => None,
            Preset::Isospin => Some(PathBuf::from("isospin.svg")),
        }
    }
}
