/// Spectrum layer: binning, normalisation and the two canonical presets.
pub mod analyzer;
pub mod histogram;
pub mod preset;

pub use analyzer::{AnalysisSettings, BinSpec, ChannelSpectra, SpectrumAnalyzer};
pub use preset::{PlotSettings, Preset};
