use std::collections::BTreeSet;
use std::path::Path;

use crate::color::MassColors;
use crate::data::loader::LoadOptions;
use crate::data::model::{MassKey, Species};
use crate::figure::{Figure, TraceFilter};
use crate::pipeline::analyze_file;
use crate::spectrum::{ChannelSpectra, PlotSettings, SpectrumAnalyzer};

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    /// One entry per loaded event file.
    pub channels: Vec<ChannelSpectra>,

    /// How newly opened files are parsed and binned.
    pub load: LoadOptions,
    pub analyzer: SpectrumAnalyzer,
    pub plot: PlotSettings,

    /// Mass groups / species the user switched off.
    pub filter: TraceFilter,

    /// One colour per mass group across all channels.
    pub colors: MassColors,

    /// Figure for the current channels and filter (cached).
    pub figure: Figure,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl ViewerState {
    pub fn new(
        channels: Vec<ChannelSpectra>,
        load: LoadOptions,
        analyzer: SpectrumAnalyzer,
        plot: PlotSettings,
    ) -> Self {
        let mut state = ViewerState {
            channels: Vec::new(),
            load,
            analyzer,
            plot,
            filter: TraceFilter::default(),
            colors: MassColors::default(),
            figure: Figure { panels: Vec::new() },
            status_message: None,
        };
        state.set_channels(channels);
        state
    }

    /// Replace the loaded channels, reset filters and colours.
    pub fn set_channels(&mut self, channels: Vec<ChannelSpectra>) {
        self.channels = channels;
        self.filter = TraceFilter::default();
        self.colors = MassColors::new(self.mass_keys());
        self.status_message = None;
        self.rebuild_figure();
    }

    /// Sorted mass groups present in any channel.
    pub fn mass_keys(&self) -> BTreeSet<MassKey> {
        self.channels
            .iter()
            .flat_map(|c| c.groups.iter().map(|g| g.mass))
            .collect()
    }

    /// Recompute the figure after a filter change.
    pub fn rebuild_figure(&mut self) {
        self.figure = Figure::build(&self.channels, &self.plot, &self.colors, &self.filter);
    }

    pub fn toggle_mass(&mut self, mass: MassKey) {
        if !self.filter.hidden_masses.remove(&mass) {
            self.filter.hidden_masses.insert(mass);
        }
        self.rebuild_figure();
    }

    pub fn toggle_species(&mut self, species: Species) {
        if !self.filter.hidden_species.remove(&species) {
            self.filter.hidden_species.insert(species);
        }
        self.rebuild_figure();
    }

    pub fn show_all(&mut self) {
        self.filter = TraceFilter::default();
        self.rebuild_figure();
    }

    pub fn hide_all_masses(&mut self) {
        self.filter.hidden_masses = self.mass_keys();
        self.rebuild_figure();
    }

    /// Load and analyse `path`, replacing the current channels. Failures are
    /// kept as a status message; the previous figure stays.
    pub fn open_path(&mut self, path: &Path) {
        match analyze_file(path, self.load, &self.analyzer) {
            Ok(channel) => {
                log::info!(
                    "Loaded {} ({} mass groups, {} rows)",
                    path.display(),
                    channel.groups.len(),
                    channel.rows
                );
                self.set_channels(vec![channel]);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
