//! Diagnostics on stdout and tabular / JSON exports of the spectra.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::data::model::{format_gev, Species};
use crate::error::{SpectrumError, SpectrumResult};
use crate::spectrum::{AnalysisSettings, ChannelSpectra};

// ---------------------------------------------------------------------------
// stdout
// ---------------------------------------------------------------------------

/// Mass group × species counts for one channel.
pub fn summary_table(channel: &ChannelSpectra) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("DM mass")];
    header.extend(Species::ALL.iter().map(|s| Cell::new(s.name())));
    header.push(Cell::new("other"));
    table.set_header(header);

    for group in &channel.groups {
        let mut row = vec![Cell::new(&group.label)];
        row.extend(Species::ALL.iter().map(|&s| {
            let found = group.spectrum(s).map(|sp| sp.found).unwrap_or(0);
            Cell::new(found).set_alignment(CellAlignment::Right)
        }));
        row.push(Cell::new(group.unclassified).set_alignment(CellAlignment::Right));
        table.add_row(row);
    }
    table
}

/// `DM Mass ...` header per group, then one `Found N ...` line per species.
pub fn group_lines(channel: &ChannelSpectra, species: &[Species]) -> Vec<String> {
    let mut lines = Vec::new();
    for group in &channel.groups {
        lines.push(format!(
            "DM Mass {} GeV",
            format_gev(group.dark_matter_mass)
        ));
        for &s in species {
            let found = group.spectrum(s).map(|sp| sp.found).unwrap_or(0);
            lines.push(format!("Found {found} {}.", s.plural()));
        }
    }
    lines
}

pub fn print_summary(channels: &[ChannelSpectra], verbose: bool) {
    for channel in channels {
        println!("== {} ==", channel.label);
        match channel.event_count {
            Some(n) => println!("events: {n}"),
            None => println!("events: (no RUNDETAILS row)"),
        }
        println!("rows: {}  skipped: {}", channel.rows, channel.skipped);
        println!("{}", summary_table(channel));
        if verbose {
            for line in group_lines(channel, &Species::ALL) {
                println!("{line}");
            }
        }
        println!();
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct BinRow<'a> {
    channel: &'a str,
    cms_mass: f64,
    dm_mass: f64,
    species: Species,
    bin: usize,
    edge_low: f64,
    edge_high: f64,
    count: f64,
    dn_de: f64,
}

/// One row per (channel, mass group, species, bin).
pub fn write_csv(channels: &[ChannelSpectra], path: &Path) -> SpectrumResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for channel in channels {
        for group in &channel.groups {
            for (&species, spectrum) in &group.species {
                for (bin, ((lo, hi, count), &dn_de)) in spectrum
                    .histogram
                    .bins()
                    .zip(&spectrum.dn_de)
                    .enumerate()
                {
                    writer.serialize(BinRow {
                        channel: &channel.label,
                        cms_mass: group.cms_mass,
                        dm_mass: group.dark_matter_mass,
                        species,
                        bin,
                        edge_low: lo,
                        edge_high: hi,
                        count,
                        dn_de,
                    })?;
                }
            }
        }
    }
    writer.flush().map_err(|e| SpectrumError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::info!("Wrote histogram table to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct Summary<'a> {
    settings: &'a AnalysisSettings,
    channels: &'a [ChannelSpectra],
}

pub fn write_json(
    channels: &[ChannelSpectra],
    settings: &AnalysisSettings,
    path: &Path,
) -> SpectrumResult<()> {
    let file = File::create(path).map_err(|e| SpectrumError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, &Summary { settings, channels })?;
    out.flush().map_err(|e| SpectrumError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::info!("Wrote summary to {}", path.display());
    Ok(())
}
