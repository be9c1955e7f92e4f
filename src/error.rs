use std::io;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Row-level parse failures
// ---------------------------------------------------------------------------

/// Why a single input line could not become an event row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: &'static str, found: usize },

    #[error("field {field} ('{token}') is not a number")]
    NotANumber { field: usize, token: String },

    #[error("RUNDETAILS row carries no numeric event count")]
    MissingEventCount,

    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    #[error("CMS mass {0} GeV is outside the groupable range")]
    MassOutOfRange(f64),
}

// ---------------------------------------------------------------------------
// Library error
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SpectrumError {
    #[error("event file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {source}")]
    MalformedRow {
        line: usize,
        #[source]
        source: RowError,
    },

    #[error("invalid bin edges: {0}")]
    InvalidBins(String),

    #[error("unsupported output format '.{0}' (use .svg or .png)")]
    UnsupportedOutput(String),

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("export failed: {0}")]
    Export(String),
}

pub type SpectrumResult<T> = Result<T, SpectrumError>;

impl From<csv::Error> for SpectrumError {
    fn from(err: csv::Error) -> Self {
        SpectrumError::Export(err.to_string())
    }
}

impl From<serde_json::Error> for SpectrumError {
    fn from(err: serde_json::Error) -> Self {
        SpectrumError::Export(err.to_string())
    }
}
