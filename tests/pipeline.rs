use std::fs;
use std::path::PathBuf;

use antinuclei_spectra::coalescence::{Cluster, EventWriter};
use antinuclei_spectra::data::loader::{load_file, LoadOptions, RowSchema};
use antinuclei_spectra::data::model::{MassKey, Species};
use antinuclei_spectra::pipeline::{analyze_file, analyze_files};
use antinuclei_spectra::report;
use antinuclei_spectra::spectrum::{Preset, SpectrumAnalyzer};
use antinuclei_spectra::SpectrumError;

fn write_events(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

const MIXED: &str = "\
RUNDETAILS events 100
10 2 1 5.0
10 2 1 7.0
10 3 2 2.0
10 1 1 3.0
10 1 0 30.0
200 2 1 50.0
10 2 1
10 2 one 4.0
";

#[test]
fn antideuteron_preset_on_mixed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_events(&dir, "events_ww.txt", MIXED);

    let analyzer = SpectrumAnalyzer::new(Preset::Antideuteron.analysis()).unwrap();
    let channel = analyze_file(&path, LoadOptions::default(), &analyzer).unwrap();

    assert_eq!(channel.label, "ww");
    assert_eq!(channel.event_count, Some(100.0));
    assert!(channel.per_event_applied);
    assert_eq!(channel.rows, 6);
    assert_eq!(channel.skipped, 2);
    assert_eq!(channel.groups.len(), 2);

    let low = channel.group(MassKey::from_cms(10.0)).unwrap();
    assert_eq!(low.label, "5.0 GeV");
    let dbar = low.spectrum(Species::Antideuteron).unwrap();
    assert_eq!(dbar.found, 2);
    assert_eq!(dbar.histogram.counts[3], 1.0);
    assert_eq!(dbar.histogram.counts[4], 1.0);

    let edges = analyzer.edges();
    let expected = 1.0 / (edges.width(3) * 100.0);
    assert!((dbar.dn_de[3] - expected).abs() < 1e-12);

    assert_eq!(low.spectrum(Species::Antiproton).unwrap().found, 1);
    assert_eq!(low.spectrum(Species::Antineutron).unwrap().found, 1);

    let high = channel.group(MassKey::from_cms(200.0)).unwrap();
    assert_eq!(high.label, "100.0 GeV");
    assert_eq!(high.spectrum(Species::Antideuteron).unwrap().found, 1);
}

#[test]
fn strict_mode_reports_the_bad_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_events(&dir, "events.txt", MIXED);

    let options = LoadOptions {
        schema: RowSchema::Any,
        strict: true,
    };
    let err = load_file(&path, options).unwrap_err();
    assert!(matches!(err, SpectrumError::MalformedRow { line: 8, .. }));
}

#[test]
fn five_field_schema_skips_four_field_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_events(
        &dir,
        "events.txt",
        "10 2 1 5.0 0.25\n10 2 1 6.0\nRUNDETAILS events 4\n",
    );

    let options = LoadOptions {
        schema: RowSchema::Five,
        strict: false,
    };
    let dataset = load_file(&path, options).unwrap();
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.skipped.len(), 1);
    assert_eq!(dataset.event_count, Some(4.0));
}

#[test]
fn missing_input_aborts_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_events(&dir, "events_bbbar.txt", MIXED);
    let missing = dir.path().join("events_ttbar.txt");

    let analyzer = SpectrumAnalyzer::new(Preset::Antideuteron.analysis()).unwrap();
    let err = analyze_files(&[good, missing], LoadOptions::default(), &analyzer).unwrap_err();
    assert!(matches!(err, SpectrumError::MissingFile { .. }));
}

#[test]
fn generated_file_feeds_the_isospin_preset() {
    let mut writer = EventWriter::new(Vec::new());
    let clusters = [
        Cluster {
            mass_number: 2,
            charge: 1,
            energy: 2.5,
        },
        Cluster {
            mass_number: 1,
            charge: 1,
            energy: 1.5,
        },
        Cluster {
            mass_number: 1,
            charge: 0,
            energy: 12.0,
        },
    ];
    for cluster in &clusters {
        writer.write_cluster(20.0, cluster).unwrap();
    }
    assert_eq!(writer.rows(), 3);
    let bytes = writer.finish(10).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.txt");
    fs::write(&path, bytes).unwrap();

    let analyzer = SpectrumAnalyzer::new(Preset::Isospin.analysis()).unwrap();
    let channel = analyze_file(&path, LoadOptions::default(), &analyzer).unwrap();
    assert_eq!(channel.event_count, Some(10.0));
    assert!(!channel.per_event_applied);

    let group = channel.group(MassKey::from_cms(20.0)).unwrap();
    for species in Preset::Isospin.plot().species {
        assert_eq!(group.spectrum(species).unwrap().found, 1, "{species}");
    }

    let csv_path = dir.path().join("bins.csv");
    report::write_csv(std::slice::from_ref(&channel), &csv_path).unwrap();
    let text = fs::read_to_string(&csv_path).unwrap();
    assert!(text.starts_with("channel,cms_mass,dm_mass,species,bin,edge_low,edge_high,count,dn_de"));
}
