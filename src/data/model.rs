use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::error::RowError;

// ---------------------------------------------------------------------------
// Species – the (A, Z) classification table
// ---------------------------------------------------------------------------

/// Antiparticle species recognised by the analysis, keyed by mass number A
/// and charge Z. Declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Species {
    Antideuteron,
    Antitriton,
    #[serde(rename = "antihelium-3")]
    Antihelium3,
    #[serde(rename = "antihelium-4")]
    Antihelium4,
    Antiproton,
    Antineutron,
}

impl Species {
    pub const ALL: [Species; 6] = [
        Species::Antideuteron,
        Species::Antitriton,
        Species::Antihelium3,
        Species::Antihelium4,
        Species::Antiproton,
        Species::Antineutron,
    ];

    /// Classify a (mass number, charge) pair. Non-integral values match nothing.
    pub fn from_az(mass_number: f64, charge: f64) -> Option<Species> {
        let a = as_integral(mass_number)?;
        let z = as_integral(charge)?;
        match (a, z) {
            (2, 1) => Some(Species::Antideuteron),
            (3, 1) => Some(Species::Antitriton),
            (3, 2) => Some(Species::Antihelium3),
            (4, 2) => Some(Species::Antihelium4),
            (1, 1) => Some(Species::Antiproton),
            (1, 0) => Some(Species::Antineutron),
            _ => None,
        }
    }

    pub fn az(self) -> (u32, u32) {
        match self {
            Species::Antideuteron => (2, 1),
            Species::Antitriton => (3, 1),
            Species::Antihelium3 => (3, 2),
            Species::Antihelium4 => (4, 2),
            Species::Antiproton => (1, 1),
            Species::Antineutron => (1, 0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::Antideuteron => "antideuteron",
            Species::Antitriton => "antitriton",
            Species::Antihelium3 => "antihelium-3",
            Species::Antihelium4 => "antihelium-4",
            Species::Antiproton => "antiproton",
            Species::Antineutron => "antineutron",
        }
    }

    /// Compact symbol used in plot legends.
    pub fn symbol(self) -> &'static str {
        match self {
            Species::Antideuteron => "d̄",
            Species::Antitriton => "t̄",
            Species::Antihelium3 => "³He̅",
            Species::Antihelium4 => "⁴He̅",
            Species::Antiproton => "p̄",
            Species::Antineutron => "n̄",
        }
    }

    /// Plural used by the per-group diagnostics ("Found 3 antitritons.").
    pub fn plural(self) -> &'static str {
        match self {
            Species::Antideuteron => "antideuterons",
            Species::Antitriton => "antitritons",
            Species::Antihelium3 => "antihelium 3",
            Species::Antihelium4 => "antihelium 4",
            Species::Antiproton => "antiprotons",
            Species::Antineutron => "antineutrons",
        }
    }
}

fn as_integral(v: f64) -> Option<i64> {
    let r = v.round();
    if v.is_finite() && (v - r).abs() < 1e-9 {
        Some(r as i64)
    } else {
        None
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let species = match s.as_str() {
            "antideuteron" | "dbar" => Species::Antideuteron,
            "antitriton" | "tbar" => Species::Antitriton,
            "antihelium-3" | "antihelium3" | "he3bar" => Species::Antihelium3,
            "antihelium-4" | "antihelium4" | "he4bar" => Species::Antihelium4,
            "antiproton" | "pbar" => Species::Antiproton,
            "antineutron" | "nbar" => Species::Antineutron,
            other => return Err(format!("unknown species '{other}'")),
        };
        Ok(species)
    }
}

// ---------------------------------------------------------------------------
// MassKey – canonical CMS mass
// ---------------------------------------------------------------------------

/// CMS mass rounded to a micro-GeV and held as an integer, so grouping never
/// depends on exact float equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MassKey(i64);

impl MassKey {
    const SCALE: f64 = 1e6;

    /// Saturates outside ±9.2e12 GeV; rows are screened with
    /// [`MassKey::try_from_cms`] before they get this far.
    pub fn from_cms(cms_mass: f64) -> MassKey {
        MassKey((cms_mass * Self::SCALE).round() as i64)
    }

    /// `None` when the rounded mass does not fit the integer key.
    pub fn try_from_cms(cms_mass: f64) -> Option<MassKey> {
        let scaled = (cms_mass * Self::SCALE).round();
        (scaled.is_finite() && scaled.abs() < i64::MAX as f64).then(|| MassKey(scaled as i64))
    }

    pub fn cms_mass(self) -> f64 {
        self.0 as f64 / Self::SCALE
    }

    /// Dark-matter candidate mass: half the CMS energy.
    pub fn dark_matter_mass(self) -> f64 {
        self.cms_mass() / 2.0
    }

    /// Legend label, e.g. `"5.0 GeV"`.
    pub fn label(self) -> String {
        format!("{} GeV", format_gev(self.dark_matter_mass()))
    }
}

/// Integral values keep one decimal (`5.0`), others print in full (`0.25`).
pub fn format_gev(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

impl fmt::Display for MassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_gev(self.cms_mass()))
    }
}

// ---------------------------------------------------------------------------
// EventRecord / EventRow – one data line of the event file
// ---------------------------------------------------------------------------

/// The four physics columns every data row carries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventRecord {
    pub cms_mass: f64,
    pub mass_number: f64,
    pub charge: f64,
    /// Kinetic energy E (GeV).
    pub energy: f64,
}

impl EventRecord {
    pub fn mass_key(&self) -> MassKey {
        MassKey::from_cms(self.cms_mass)
    }

    pub fn species(&self) -> Option<Species> {
        Species::from_az(self.mass_number, self.charge)
    }
}

/// A parsed data row, tagged by the layout it was written in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventRow {
    FourField(EventRecord),
    FiveField {
        record: EventRecord,
        coalescence_probability: f64,
    },
}

impl EventRow {
    pub fn record(&self) -> &EventRecord {
        match self {
            EventRow::FourField(record) | EventRow::FiveField { record, .. } => record,
        }
    }

    pub fn coalescence_probability(&self) -> Option<f64> {
        match self {
            EventRow::FourField(_) => None,
            EventRow::FiveField {
                coalescence_probability,
                ..
            } => Some(*coalescence_probability),
        }
    }
}

// ---------------------------------------------------------------------------
// EventDataset – everything one file yielded
// ---------------------------------------------------------------------------

/// A line that did not parse, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line number in the source.
    pub line: usize,
    pub reason: RowError,
}

#[derive(Debug, Clone, Default)]
pub struct EventDataset {
    /// Source file, when loaded from disk.
    pub source: Option<PathBuf>,
    pub rows: Vec<EventRow>,
    /// Sum of the RUNDETAILS event counts; `None` when no sentinel was seen.
    pub event_count: Option<f64>,
    pub sentinel_rows: usize,
    pub skipped: Vec<SkippedRow>,
}

impl EventDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted distinct CMS masses among the retained rows.
    pub fn mass_keys(&self) -> BTreeSet<MassKey> {
        self.rows.iter().map(|r| r.record().mass_key()).collect()
    }

    /// Short channel name derived from the file stem (`events_ww` → `ww`).
    pub fn channel_label(&self) -> String {
        let stem = self
            .source
            .as_ref()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("events");
        match stem {
            "events_ww" => "ww".to_string(),
            "events_ttbar" => "t-tbar".to_string(),
            "events_bbbar" => "b-bbar".to_string(),
            other => other.strip_prefix("events_").unwrap_or(other).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_key_range_is_checked() {
        assert_eq!(MassKey::try_from_cms(10.0), Some(MassKey::from_cms(10.0)));
        assert!(MassKey::try_from_cms(9.0e12).is_some());
        assert_eq!(MassKey::try_from_cms(1e13), None);
        assert_eq!(MassKey::try_from_cms(-1e13), None);
    }

    #[test]
    fn classification_table() {
        assert_eq!(Species::from_az(2.0, 1.0), Some(Species::Antideuteron));
        assert_eq!(Species::from_az(3.0, 1.0), Some(Species::Antitriton));
        assert_eq!(Species::from_az(3.0, 2.0), Some(Species::Antihelium3));
        assert_eq!(Species::from_az(4.0, 2.0), Some(Species::Antihelium4));
        assert_eq!(Species::from_az(1.0, 1.0), Some(Species::Antiproton));
        assert_eq!(Species::from_az(1.0, 0.0), Some(Species::Antineutron));
        assert_eq!(Species::from_az(2.0, 2.0), None);
        assert_eq!(Species::from_az(2.5, 1.0), None);
        for s in Species::ALL {
            let (a, z) = s.az();
            assert_eq!(Species::from_az(a as f64, z as f64), Some(s));
        }
    }

    #[test]
    fn species_parse_accepts_names_and_short_forms() {
        assert_eq!("antihelium-3".parse::<Species>(), Ok(Species::Antihelium3));
        assert_eq!("PBAR".parse::<Species>(), Ok(Species::Antiproton));
        assert!("proton".parse::<Species>().is_err());
    }

    #[test]
    fn mass_key_absorbs_float_noise() {
        let a = MassKey::from_cms(0.1 + 0.2);
        let b = MassKey::from_cms(0.3);
        assert_eq!(a, b);
        assert_eq!(MassKey::from_cms(10.0).label(), "5.0 GeV");
        assert_eq!(MassKey::from_cms(0.5).label(), "0.25 GeV");
    }

    #[test]
    fn channel_label_from_file_stem() {
        let mut ds = EventDataset::default();
        ds.source = Some(PathBuf::from("/data/events_ttbar.txt"));
        assert_eq!(ds.channel_label(), "t-tbar");
        ds.source = Some(PathBuf::from("run7.dat"));
        assert_eq!(ds.channel_label(), "run7");
    }
}
