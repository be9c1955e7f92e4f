use std::path::{Path, PathBuf};

use crate::data::loader::{load_file, LoadOptions};
use crate::error::SpectrumResult;
use crate::spectrum::{ChannelSpectra, SpectrumAnalyzer};

/// Load and analyse one event file.
pub fn analyze_file(
    path: &Path,
    load: LoadOptions,
    analyzer: &SpectrumAnalyzer,
) -> SpectrumResult<ChannelSpectra> {
    let dataset = load_file(path, load)?;
    Ok(analyzer.analyze(&dataset))
}

/// Every input in order; the first missing or unreadable file aborts.
pub fn analyze_files(
    paths: &[PathBuf],
    load: LoadOptions,
    analyzer: &SpectrumAnalyzer,
) -> SpectrumResult<Vec<ChannelSpectra>> {
    paths
        .iter()
        .map(|p| analyze_file(p, load, analyzer))
        .collect()
}
