use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::data::group::{group_by_mass, Weighting};
use crate::data::model::{EventDataset, MassKey, Species};
use crate::error::SpectrumResult;

use super::histogram::{BinEdges, Histogram};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Log-spaced binning: `edges` edges from `10^log_min` to `10^log_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BinSpec {
    pub log_min: f64,
    pub log_max: f64,
    pub edges: usize,
}

impl BinSpec {
    pub fn to_edges(self) -> SpectrumResult<BinEdges> {
        BinEdges::logspace(self.log_min, self.log_max, self.edges)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisSettings {
    pub bins: BinSpec,
    /// Divide dN/dE by the RUNDETAILS event count.
    pub per_event: bool,
    pub weighting: Weighting,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SpeciesSpectrum {
    /// Rows classified as this species, in or out of the edge range.
    pub found: usize,
    pub histogram: Histogram,
    /// Normalised differential yield, one value per bin.
    pub dn_de: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSpectra {
    pub mass: MassKey,
    pub cms_mass: f64,
    pub dark_matter_mass: f64,
    pub label: String,
    pub unclassified: usize,
    pub species: BTreeMap<Species, SpeciesSpectrum>,
}

impl GroupSpectra {
    pub fn spectrum(&self, species: Species) -> Option<&SpeciesSpectrum> {
        self.species.get(&species)
    }
}

/// Everything derived from one event file.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelSpectra {
    pub label: String,
    pub source: Option<PathBuf>,
    pub event_count: Option<f64>,
    pub per_event_applied: bool,
    pub rows: usize,
    pub skipped: usize,
    pub groups: Vec<GroupSpectra>,
}

impl ChannelSpectra {
    pub fn group(&self, mass: MassKey) -> Option<&GroupSpectra> {
        self.groups.iter().find(|g| g.mass == mass)
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Turns an [`EventDataset`] into per-(mass group, species) spectra.
#[derive(Debug, Clone)]
pub struct SpectrumAnalyzer {
    settings: AnalysisSettings,
    edges: BinEdges,
}

impl SpectrumAnalyzer {
    pub fn new(settings: AnalysisSettings) -> SpectrumResult<Self> {
        let edges = settings.bins.to_edges()?;
        Ok(SpectrumAnalyzer { settings, edges })
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    pub fn analyze(&self, dataset: &EventDataset) -> ChannelSpectra {
        let label = dataset.channel_label();

        let norm = match (self.settings.per_event, dataset.event_count) {
            (true, Some(n)) if n > 0.0 => Some(n),
            (true, _) => {
                log::warn!(
                    "{label}: no positive RUNDETAILS event count, dN/dE left per bin width only"
                );
                None
            }
            (false, _) => None,
        };

        let groups = group_by_mass(dataset, self.settings.weighting)
            .into_values()
            .map(|group| {
                let species = group
                    .species
                    .iter()
                    .map(|(&s, samples)| {
                        let histogram = Histogram::fill(&self.edges, samples);
                        let dn_de = histogram.normalized(norm);
                        let spectrum = SpeciesSpectrum {
                            found: samples.len(),
                            histogram,
                            dn_de,
                        };
                        (s, spectrum)
                    })
                    .collect();
                GroupSpectra {
                    mass: group.key,
                    cms_mass: group.key.cms_mass(),
                    dark_matter_mass: group.key.dark_matter_mass(),
                    label: group.key.label(),
                    unclassified: group.unclassified,
                    species,
                }
            })
            .collect();

        ChannelSpectra {
            label,
            source: dataset.source.clone(),
            event_count: dataset.event_count,
            per_event_applied: norm.is_some(),
            rows: dataset.len(),
            skipped: dataset.skipped.len(),
            groups,
        }
    }
}
