//! Error types for PROCAR parsing and analysis.
//!
//! Parse-time errors abort the whole parse; no partial dataset is returned.
//! Query-time errors (effective mass, selection indices) are local to the
//! call and leave the parsed dataset usable.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcarError>;

#[derive(Debug, Error)]
pub enum ProcarError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed PROCAR header: expected three integers (k-points, bands, ions), got {line:?}")]
    MalformedHeader { line: String },

    #[error(
        "unrecognised record layout: {records} projection records cannot be matched to \
         {bands} bands x {k_points} k-points for any spin treatment"
    )]
    UnrecognisedLayout {
        records: usize,
        bands: usize,
        k_points: usize,
    },

    #[error("projection data shape mismatch: expected {expected} values, found {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("{quantity} mismatch: {header} declared in header, {parsed} parsed from file")]
    CountMismatch {
        quantity: &'static str,
        header: usize,
        parsed: f64,
    },

    #[error("one or more occupancies in the PROCAR file are negative")]
    NegativeOccupancy,

    #[error("k-points are not collinear: triangle area {area:e} exceeds tolerance {tolerance:e}")]
    NotCollinear { area: f64, tolerance: f64 },

    #[error("cannot concatenate datasets: {field} differs ({left} vs {right})")]
    IncompatibleMerge {
        field: &'static str,
        left: String,
        right: String,
    },

    #[error("{axis} index {index} out of range (axis length {len})")]
    InvalidSelection {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    #[error("effective mass estimation needs at least two k-points, got {0}")]
    InsufficientKPoints(usize),

    #[error("least-squares fit failed: {0}")]
    FitFailed(String),

    #[error("failed to write band structure: {0}")]
    Write(#[from] std::io::Error),
}
