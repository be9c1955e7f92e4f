use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{RowError, SpectrumError, SpectrumResult};

use super::model::{EventDataset, EventRecord, EventRow, MassKey, SkippedRow};

/// Token marking the run-summary row.
pub const SENTINEL: &str = "RUNDETAILS";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Which data-row layouts are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RowSchema {
    /// Four or five fields.
    #[default]
    Any,
    /// `cms_mass A Z E`
    Four,
    /// `cms_mass A Z E coalescence_probability`
    Five,
}

impl RowSchema {
    fn accepts(self, n: usize) -> bool {
        match self {
            RowSchema::Any => n == 4 || n == 5,
            RowSchema::Four => n == 4,
            RowSchema::Five => n == 5,
        }
    }

    fn expected(self) -> &'static str {
        match self {
            RowSchema::Any => "4 or 5",
            RowSchema::Four => "4",
            RowSchema::Five => "5",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub schema: RowSchema,
    /// Abort on the first malformed row instead of skipping it.
    pub strict: bool,
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// What a single non-blank line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    RunDetails { event_count: f64 },
    Event(EventRow),
    Malformed(RowError),
}

/// Classify one line. Blank lines yield `None`.
pub fn parse_line(line: &str, schema: RowSchema) -> Option<LineOutcome> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return None;
    }

    if fields.contains(&SENTINEL) {
        let outcome = match fields.get(2).and_then(|t| parse_finite(t)) {
            Some(event_count) => LineOutcome::RunDetails { event_count },
            None => LineOutcome::Malformed(RowError::MissingEventCount),
        };
        return Some(outcome);
    }

    if !schema.accepts(fields.len()) {
        return Some(LineOutcome::Malformed(RowError::FieldCount {
            expected: schema.expected(),
            found: fields.len(),
        }));
    }

    let mut values = [0.0f64; 5];
    for (i, tok) in fields.iter().enumerate() {
        match parse_finite(tok) {
            Some(v) => values[i] = v,
            None => {
                return Some(LineOutcome::Malformed(RowError::NotANumber {
                    field: i,
                    token: tok.to_string(),
                }));
            }
        }
    }

    let record = EventRecord {
        cms_mass: values[0],
        mass_number: values[1],
        charge: values[2],
        energy: values[3],
    };
    if MassKey::try_from_cms(record.cms_mass).is_none() {
        return Some(LineOutcome::Malformed(RowError::MassOutOfRange(
            record.cms_mass,
        )));
    }
    let row = if fields.len() == 5 {
        EventRow::FiveField {
            record,
            coalescence_probability: values[4],
        }
    } else {
        EventRow::FourField(record)
    };
    Some(LineOutcome::Event(row))
}

fn parse_finite(tok: &str) -> Option<f64> {
    tok.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an event file. The handle is closed before this returns.
pub fn load_file(path: &Path, options: LoadOptions) -> SpectrumResult<EventDataset> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut dataset = parse_reader(BufReader::new(file), options, path)?;
    dataset.source = Some(path.to_path_buf());

    log::info!(
        "Loaded {} rows from {} ({} skipped, event count {:?})",
        dataset.len(),
        path.display(),
        dataset.skipped.len(),
        dataset.event_count
    );
    Ok(dataset)
}

fn open_error(path: &Path, err: io::Error) -> SpectrumError {
    if err.kind() == io::ErrorKind::NotFound {
        SpectrumError::MissingFile {
            path: path.to_path_buf(),
        }
    } else {
        SpectrumError::Io {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

/// Parse event rows from any buffered reader. `origin` only labels errors.
pub fn parse_reader<R: BufRead>(
    mut reader: R,
    options: LoadOptions,
    origin: &Path,
) -> SpectrumResult<EventDataset> {
    let mut dataset = EventDataset::default();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| SpectrumError::Io {
                path: origin.to_path_buf(),
                source: e,
            })?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let outcome = match std::str::from_utf8(&buf) {
            Ok(line) => parse_line(line, options.schema),
            Err(_) => Some(LineOutcome::Malformed(RowError::InvalidUtf8)),
        };

        match outcome {
            None => {}
            Some(LineOutcome::RunDetails { event_count }) => {
                dataset.sentinel_rows += 1;
                *dataset.event_count.get_or_insert(0.0) += event_count;
            }
            Some(LineOutcome::Event(row)) => dataset.rows.push(row),
            Some(LineOutcome::Malformed(reason)) => {
                if options.strict {
                    return Err(SpectrumError::MalformedRow {
                        line: line_no,
                        source: reason,
                    });
                }
                log::debug!("{}:{line_no}: skipped ({reason})", origin.display());
                dataset.skipped.push(SkippedRow {
                    line: line_no,
                    reason,
                });
            }
        }
    }

    if dataset.sentinel_rows > 1 {
        log::info!(
            "{}: {} RUNDETAILS rows, event counts summed",
            origin.display(),
            dataset.sentinel_rows
        );
    }
    if !dataset.skipped.is_empty() {
        log::warn!(
            "{}: skipped {} malformed row(s)",
            origin.display(),
            dataset.skipped.len()
        );
    }

    Ok(dataset)
}

/// Convenience for in-memory text.
pub fn parse_str(text: &str, options: LoadOptions) -> SpectrumResult<EventDataset> {
    parse_reader(text.as_bytes(), options, &PathBuf::from("<memory>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "RUNDETAILS x 100\n10 2 1 5.0\n10 2 1 7.0\n10 3 2 2.0\n";

    #[test]
    fn sentinel_and_rows() {
        let ds = parse_str(SAMPLE, LoadOptions::default()).unwrap();
        assert_eq!(ds.event_count, Some(100.0));
        assert_eq!(ds.len(), 3);
        assert!(ds.skipped.is_empty());
        assert!(matches!(ds.rows[0], EventRow::FourField(_)));
    }

    #[test]
    fn five_field_rows_carry_probability() {
        let ds = parse_str("20 2 1 3.5 0.25\n", LoadOptions::default()).unwrap();
        assert_eq!(ds.rows[0].coalescence_probability(), Some(0.25));
        assert_eq!(ds.rows[0].record().energy, 3.5);
    }

    #[test]
    fn short_row_is_skipped_not_fatal() {
        let text = format!("{SAMPLE}10 2 1\n");
        let ds = parse_str(&text, LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.skipped.len(), 1);
        assert_eq!(ds.skipped[0].line, 5);
        assert_eq!(
            ds.skipped[0].reason,
            RowError::FieldCount {
                expected: "4 or 5",
                found: 3
            }
        );
    }

    #[test]
    fn non_numeric_field_is_skipped() {
        let text = format!("{SAMPLE}10 2 1 NaN_literal\n");
        let ds = parse_str(&text, LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 3);
        assert!(matches!(
            ds.skipped[0].reason,
            RowError::NotANumber { field: 3, .. }
        ));
    }

    #[test]
    fn strict_mode_aborts_on_malformed_row() {
        let text = format!("{SAMPLE}10 2 1 NaN_literal\n");
        let opts = LoadOptions {
            strict: true,
            ..Default::default()
        };
        let err = parse_str(&text, opts).unwrap_err();
        assert!(matches!(err, SpectrumError::MalformedRow { line: 5, .. }));
    }

    #[test]
    fn schema_restricts_field_count() {
        let text = "10 2 1 5.0\n10 2 1 5.0 0.5\n";
        let four = LoadOptions {
            schema: RowSchema::Four,
            ..Default::default()
        };
        let ds = parse_str(text, four).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped.len(), 1);
    }

    #[test]
    fn blank_lines_and_repeated_sentinels() {
        let text = "\nRUNDETAILS a 40\n   \n10 1 1 2.0\nRUNDETAILS b 60\n";
        let ds = parse_str(text, LoadOptions::default()).unwrap();
        assert_eq!(ds.event_count, Some(100.0));
        assert_eq!(ds.sentinel_rows, 2);
        assert!(ds.skipped.is_empty());
    }

    #[test]
    fn sentinel_without_count_is_malformed() {
        let ds = parse_str("RUNDETAILS\n", LoadOptions::default()).unwrap();
        assert_eq!(ds.event_count, None);
        assert_eq!(ds.skipped[0].reason, RowError::MissingEventCount);
    }

    #[test]
    fn header_row_is_skipped() {
        let ds = parse_str("cms A Z E\n10 2 1 5\n", LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped.len(), 1);
    }

    #[test]
    fn invalid_utf8_row_is_skipped() {
        let bytes: &[u8] = b"10 2 1 5.0\n10 2 1 \xff\n10 2 1 7.0\n";
        let ds = parse_reader(bytes, LoadOptions::default(), Path::new("<bytes>")).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.skipped.len(), 1);
        assert_eq!(ds.skipped[0].line, 2);
        assert_eq!(ds.skipped[0].reason, RowError::InvalidUtf8);
        assert_eq!(ds.rows[1].record().energy, 7.0);

        let strict = LoadOptions {
            strict: true,
            ..Default::default()
        };
        let err = parse_reader(bytes, strict, Path::new("<bytes>")).unwrap_err();
        assert!(matches!(
            err,
            SpectrumError::MalformedRow {
                line: 2,
                source: RowError::InvalidUtf8
            }
        ));
    }

    #[test]
    fn unrepresentable_cms_mass_is_skipped() {
        let ds = parse_str("1e13 2 1 5.0\n2e13 2 1 5.0\n10 2 1 5.0\n", LoadOptions::default())
            .unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped.len(), 2);
        assert_eq!(ds.skipped[0].reason, RowError::MassOutOfRange(1e13));
    }

    #[test]
    fn missing_file_is_typed() {
        let err = load_file(
            Path::new("/definitely/not/here/events.txt"),
            LoadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SpectrumError::MissingFile { .. }));
    }
}
