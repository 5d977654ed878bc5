//! Flight table model.
//!
//! [`FlightTable`] holds raw records in input order; [`CleanedTable`] holds the
//! pipeline output. Row position is meaningful (it drives flight code
//! reconstruction), so nothing here ever reorders records.

use crate::error::{CleaningError, Result, ResultExt};
use crate::reader::parse_flight_code;
use crate::types::{DefectKind, FieldDefect, FlightCode};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

// Input headers, as written by the upstream export.
pub const AIRLINE_CODE_COLUMN: &str = "Airline Code";
pub const DELAY_TIMES_COLUMN: &str = "DelayTimes";
pub const FLIGHT_CODES_COLUMN: &str = "FlightCodes";
pub const ROUTE_COLUMN: &str = "To_From";

/// Column names of [`CleanedTable::to_dataframe`], in order.
pub const OUTPUT_COLUMNS: [&str; 5] = ["AirlineCode", "DelayTimes", "FlightCode", "To", "From"];

/// One raw flight row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    /// Free-text carrier name; empty when missing.
    pub airline_code: String,
    /// Raw list literal, never interpreted.
    pub delay_times: Option<String>,
    /// `None` when missing or not numeric.
    pub flight_code: Option<FlightCode>,
    /// Combined `ORIGIN_DESTINATION` value.
    pub route: Option<String>,
}

impl FlightRecord {
    pub fn new(
        airline_code: impl Into<String>,
        delay_times: Option<&str>,
        flight_code: Option<FlightCode>,
        route: Option<&str>,
    ) -> Self {
        Self {
            airline_code: airline_code.into(),
            delay_times: delay_times.map(str::to_string),
            flight_code,
            route: route.map(str::to_string),
        }
    }
}

/// Ordered collection of raw flight records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightTable {
    records: Vec<FlightRecord>,
}

impl FlightTable {
    pub fn new(records: Vec<FlightRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlightRecord> {
        self.records.iter()
    }

    /// The flight code column in row order.
    pub fn flight_codes(&self) -> Vec<Option<FlightCode>> {
        self.records.iter().map(|r| r.flight_code).collect()
    }

    /// Build a table from a parsed frame with the four input columns.
    ///
    /// String flight codes are parsed here; unparseable ones become `None`
    /// and are reported as [`DefectKind::UnparseableNumeric`]. Missing airline
    /// names become empty strings.
    pub fn from_dataframe(df: &DataFrame) -> Result<(Self, Vec<FieldDefect>)> {
        let mut defects = Vec::new();

        let airline_codes = string_values(df, AIRLINE_CODE_COLUMN)?;
        let delay_times = string_values(df, DELAY_TIMES_COLUMN)?;
        let flight_codes = flight_code_values(df, &mut defects)?;
        let routes = string_values(df, ROUTE_COLUMN)?;

        let records = airline_codes
            .into_iter()
            .zip(delay_times)
            .zip(flight_codes)
            .zip(routes)
            .enumerate()
            .map(|(row, (((airline_code, delay_times), flight_code), route))| {
                let airline_code = airline_code.unwrap_or_else(|| {
                    debug!("Row {}: airline code missing", row);
                    defects.push(FieldDefect::missing(row, AIRLINE_CODE_COLUMN));
                    String::new()
                });
                FlightRecord {
                    airline_code,
                    delay_times,
                    flight_code,
                    route,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "Loaded {} flight records with {} defects",
            records.len(),
            defects.len()
        );
        Ok((Self::new(records), defects))
    }
}

impl FromIterator<FlightRecord> for FlightTable {
    fn from_iter<I: IntoIterator<Item = FlightRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| CleaningError::ColumnNotFound(name.to_string()))
}

fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = required_column(df, name)?
        .cast(&DataType::String)
        .context(format!("Failed to read column '{}' as text", name))?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

fn flight_code_values(
    df: &DataFrame,
    defects: &mut Vec<FieldDefect>,
) -> Result<Vec<Option<FlightCode>>> {
    let series = required_column(df, FLIGHT_CODES_COLUMN)?;

    if series.dtype() == &DataType::String {
        let values = series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, raw)| match raw.map(parse_flight_code) {
                Some(Ok(code)) => Some(code),
                Some(Err(DefectKind::UnparseableNumeric)) => {
                    let raw = raw.unwrap_or_default();
                    debug!("Row {}: flight code {:?} is not numeric", row, raw);
                    defects.push(FieldDefect::unparseable(row, FLIGHT_CODES_COLUMN, raw));
                    None
                }
                Some(Err(DefectKind::MissingValue)) | None => None,
            })
            .collect();
        return Ok(values);
    }

    if series.dtype().is_integer() {
        let integers = series
            .cast(&DataType::Int64)
            .context("Failed to read flight codes as integers")?;
        return Ok(integers
            .i64()?
            .into_iter()
            .map(|v| v.map(FlightCode::Exact))
            .collect());
    }

    let floats = series
        .cast(&DataType::Float64)
        .context("Failed to read flight codes as numbers")?;
    Ok(floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|v| v.is_finite()).map(FlightCode::from))
        .collect())
}

/// One cleaned flight row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub airline_code: String,
    pub delay_times: Option<String>,
    pub flight_code: i64,
    pub to: String,
    pub from: String,
}

/// Ordered collection of cleaned records, same length and order as its input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedTable {
    records: Vec<CleanedRecord>,
}

impl CleanedTable {
    pub fn new(records: Vec<CleanedRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CleanedRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &CleanedRecord> {
        self.records.iter()
    }

    pub fn flight_codes(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.flight_code).collect()
    }

    /// Convert to a frame with the [`OUTPUT_COLUMNS`].
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let [airline, delays, codes, to, from] = OUTPUT_COLUMNS;

        let columns = vec![
            Column::new(
                airline.into(),
                self.records
                    .iter()
                    .map(|r| r.airline_code.as_str())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                delays.into(),
                self.records
                    .iter()
                    .map(|r| r.delay_times.as_deref())
                    .collect::<Vec<_>>(),
            ),
            Column::new(codes.into(), self.flight_codes()),
            Column::new(
                to.into(),
                self.records.iter().map(|r| r.to.as_str()).collect::<Vec<_>>(),
            ),
            Column::new(
                from.into(),
                self.records
                    .iter()
                    .map(|r| r.from.as_str())
                    .collect::<Vec<_>>(),
            ),
        ];

        DataFrame::new(columns).context("Failed to assemble cleaned table")
    }
}
