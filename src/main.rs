use std::collections::BTreeSet;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use antinuclei_spectra::app::run_viewer;
use antinuclei_spectra::cli::Cli;
use antinuclei_spectra::color::MassColors;
use antinuclei_spectra::figure::{save_figure, Figure, TraceFilter};
use antinuclei_spectra::pipeline::analyze_files;
use antinuclei_spectra::report;
use antinuclei_spectra::spectrum::SpectrumAnalyzer;
use antinuclei_spectra::state::ViewerState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().resolve()?;
    log::debug!("{config:?}");

    let analyzer = SpectrumAnalyzer::new(config.analysis).context("configuring energy bins")?;
    let channels = analyze_files(&config.inputs, config.load, &analyzer)
        .context("analysing event files")?;

    report::print_summary(&channels, config.verbose);

    if let Some(path) = &config.csv {
        report::write_csv(&channels, path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &config.summary_json {
        report::write_json(&channels, &config.analysis, path)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    if let Some(path) = &config.output {
        let masses: BTreeSet<_> = channels
            .iter()
            .flat_map(|c| c.groups.iter().map(|g| g.mass))
            .collect();
        let colors = MassColors::new(masses);
        let figure = Figure::build(&channels, &config.plot, &colors, &TraceFilter::default());
        save_figure(&figure, path).with_context(|| format!("saving {}", path.display()))?;
        println!("Saved {}", path.display());
    }

    if config.show_window {
        let state = ViewerState::new(channels, config.load, analyzer, config.plot);
        run_viewer(state).map_err(|e| anyhow!("viewer failed: {e}"))?;
    }

    Ok(())
}
