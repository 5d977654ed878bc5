use crate::table::CleanedTable;
use serde::{Deserialize, Serialize};

/// Kind of a per-field defect. Neither kind is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    /// Field absent or empty.
    MissingValue,
    /// Flight code present but not a finite number; coerced to missing.
    UnparseableNumeric,
}

/// A defect found in one field of one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefect {
    pub row: usize,
    pub column: String,
    pub kind: DefectKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl FieldDefect {
    pub fn missing(row: usize, column: impl Into<String>) -> Self {
        Self {
            row,
            column: column.into(),
            kind: DefectKind::MissingValue,
            raw: None,
        }
    }

    pub fn unparseable(row: usize, column: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            row,
            column: column.into(),
            kind: DefectKind::UnparseableNumeric,
            raw: Some(raw.into()),
        }
    }
}

/// A present flight code as read from input.
///
/// Integral values (`20015`, `20015.0`) are held exactly as [`FlightCode::Exact`];
/// values with a fractional part stay floats and are only truncated when the
/// sequence is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlightCode {
    Exact(i64),
    Float(f64),
}

impl FlightCode {
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Exact(_) => true,
            Self::Float(v) => v.is_finite(),
        }
    }

    /// Value truncated toward zero; `None` when non-finite or outside `i64`.
    pub fn truncated(&self) -> Option<i64> {
        match *self {
            Self::Exact(v) => Some(v),
            // i64::MIN as f64 is exact (-2^63); i64::MAX as f64 rounds up to 2^63.
            Self::Float(v) if v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64 => {
                Some(v.trunc() as i64)
            }
            Self::Float(_) => None,
        }
    }

    /// Whole part and same-signed fractional remainder.
    pub(crate) fn split(&self) -> (i128, f64) {
        match *self {
            Self::Exact(v) => (i128::from(v), 0.0),
            Self::Float(v) => (v.trunc() as i128, v.fract()),
        }
    }
}

impl From<i64> for FlightCode {
    fn from(value: i64) -> Self {
        Self::Exact(value)
    }
}

impl From<f64> for FlightCode {
    fn from(value: f64) -> Self {
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            Self::Exact(value as i64)
        } else {
            Self::Float(value)
        }
    }
}

impl std::fmt::Display for FlightCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Row that anchored identifier reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub index: usize,
    pub value: FlightCode,
}

// ============================================================================
// Cleaning Summary Types
// ============================================================================

/// Counts describing what the pipeline did to a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows: usize,
    /// Anchor row used for reconstruction; `None` when every code was missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Anchor>,
    /// Rows whose flight code was absent when reconstruction ran.
    pub flight_codes_missing: usize,
    /// Subset of the missing codes that were present but not numeric.
    pub flight_codes_unparseable: usize,
    /// Rows whose present flight code was replaced by a different value.
    pub flight_codes_overwritten: usize,
    pub routes_missing: usize,
    pub routes_without_separator: usize,
    pub airline_codes_changed: usize,
    pub duration_ms: u64,
    pub defects: Vec<FieldDefect>,
}

impl CleaningSummary {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    /// Number of defects of the given kind.
    pub fn defect_count(&self, kind: DefectKind) -> usize {
        self.defects.iter().filter(|d| d.kind == kind).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub cleaned: CleanedTable,
    pub summary: CleaningSummary,
    pub processing_steps: Vec<String>,
}
