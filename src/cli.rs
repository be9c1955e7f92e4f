//! Command-line interface: argument parsing and preset resolution.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use crate::data::group::Weighting;
use crate::data::loader::{LoadOptions, RowSchema};
use crate::data::model::Species;
use crate::spectrum::{AnalysisSettings, PlotSettings, Preset};

#[derive(Parser, Debug)]
#[command(name = "antinuclei-spectra")]
#[command(version, about)]
pub struct Cli {
    /// Event files (`cms A Z E [p_coal]` rows plus a RUNDETAILS row)
    pub inputs: Vec<PathBuf>,

    /// Analysis preset
    #[arg(short, long, value_enum, default_value_t = Preset::Isospin)]
    pub preset: Preset,

    /// Save the figure here (.svg or .png, no PDF backend; isospin defaults to isospin.svg)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Do not open the interactive viewer
    #[arg(long)]
    pub no_window: bool,

    /// Abort on the first malformed row
    #[arg(long)]
    pub strict: bool,

    /// Accepted row layout
    #[arg(long, value_enum, default_value_t = RowSchema::Any)]
    pub schema: RowSchema,

    /// Lowest bin edge exponent (10^x GeV)
    #[arg(long, allow_negative_numbers = true)]
    pub log_min: Option<f64>,

    /// Highest bin edge exponent (10^x GeV)
    #[arg(long, allow_negative_numbers = true)]
    pub log_max: Option<f64>,

    /// Number of bin edges
    #[arg(long)]
    pub edges: Option<usize>,

    /// Divide dN/dE by the RUNDETAILS event count
    #[arg(long, conflicts_with = "no_per_event")]
    pub per_event: bool,

    /// Only divide dN/dE by bin width
    #[arg(long)]
    pub no_per_event: bool,

    /// Species to plot (comma separated), e.g. `antideuteron,pbar`
    #[arg(long, value_delimiter = ',')]
    pub species: Vec<Species>,

    /// Weight five-field rows by their coalescence probability
    #[arg(long)]
    pub weight_by_coalescence: bool,

    /// Export every histogram bin as CSV
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Export the full analysis as JSON
    #[arg(long, value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// Print per-mass-group counts
    #[arg(short, long)]
    pub verbose: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub preset: Preset,
    pub inputs: Vec<PathBuf>,
    pub load: LoadOptions,
    pub analysis: AnalysisSettings,
    pub plot: PlotSettings,
    pub output: Option<PathBuf>,
    pub show_window: bool,
    pub csv: Option<PathBuf>,
    pub summary_json: Option<PathBuf>,
    pub verbose: bool,
}

impl Cli {
    /// Apply the preset, then any explicit overrides.
    pub fn resolve(self) -> Result<RunConfig> {
        let preset = self.preset;

        let inputs = if self.inputs.is_empty() {
            preset.default_inputs()
        } else {
            self.inputs
        };
        if inputs.is_empty() {
            bail!("no event file given");
        }
        if let Some(max) = preset.max_inputs() {
            if inputs.len() > max {
                bail!(
                    "preset {:?} takes at most {max} event file(s), got {}",
                    preset,
                    inputs.len()
                );
            }
        }

        let mut analysis = preset.analysis();
        if let Some(v) = self.log_min {
            analysis.bins.log_min = v;
        }
        if let Some(v) = self.log_max {
            analysis.bins.log_max = v;
        }
        if let Some(n) = self.edges {
            analysis.bins.edges = n;
        }
        if self.per_event {
            analysis.per_event = true;
        }
        if self.no_per_event {
            analysis.per_event = false;
        }
        if self.weight_by_coalescence {
            analysis.weighting = Weighting::CoalescenceProbability;
        }

        let mut plot = preset.plot();
        if !self.species.is_empty() {
            plot.species = self.species;
        }

        Ok(RunConfig {
            preset,
            inputs,
            load: LoadOptions {
                schema: self.schema,
                strict: self.strict,
            },
            analysis,
            plot,
            output: self.output.or_else(|| preset.default_output()),
            show_window: !self.no_window,
            csv: self.csv,
            summary_json: self.summary_json,
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(args: &[&str]) -> Result<RunConfig> {
        Cli::try_parse_from(std::iter::once("antinuclei-spectra").chain(args.iter().copied()))?
            .resolve()
    }

    #[test]
    fn isospin_is_default_and_saves_svg() {
        let cfg = resolve(&["events.txt"]).unwrap();
        assert_eq!(cfg.preset, Preset::Isospin);
        assert_eq!(cfg.output, Some(PathBuf::from("isospin.svg")));
        assert_eq!(cfg.analysis.bins.edges, 21);
        assert!(cfg.show_window);
    }

    #[test]
    fn isospin_requires_exactly_one_file() {
        assert!(resolve(&[]).is_err());
        assert!(resolve(&["a.txt", "b.txt"]).is_err());
    }

    #[test]
    fn antideuteron_defaults_to_three_channels() {
        let cfg = resolve(&["--preset", "antideuteron", "--no-window"]).unwrap();
        assert_eq!(cfg.inputs.len(), 3);
        assert_eq!(cfg.output, None);
        assert!(cfg.analysis.per_event);
        assert!(!cfg.show_window);
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let cfg = resolve(&[
            "ev.txt",
            "--log-min",
            "-2",
            "--edges",
            "31",
            "--per-event",
            "--species",
            "pbar,antihelium-3",
            "--strict",
            "--schema",
            "five",
        ])
        .unwrap();
        assert_eq!(cfg.analysis.bins.log_min, -2.0);
        assert_eq!(cfg.analysis.bins.edges, 31);
        assert!(cfg.analysis.per_event);
        assert_eq!(
            cfg.plot.species,
            vec![Species::Antiproton, Species::Antihelium3]
        );
        assert!(cfg.load.strict);
        assert_eq!(cfg.load.schema, RowSchema::Five);
    }

    #[test]
    fn output_help_names_supported_formats() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        let output = cmd.get_arguments().find(|a| a.get_id() == "output").unwrap();
        let help = output.get_help().unwrap().to_string();
        assert!(help.contains("no PDF backend"));
        assert!(help.contains("isospin.svg"));
    }

    #[test]
    fn unknown_species_is_rejected() {
        assert!(resolve(&["ev.txt", "--species", "gluon"]).is_err());
    }
}
