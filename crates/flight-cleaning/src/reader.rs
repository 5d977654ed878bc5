//! Input boundary: raw delimited text into a frame.
//!
//! Quoting contract: fields may be wrapped in `"`; inside a quoted field a
//! doubled quote `""` stands for one literal `"`. Backslashes have no special
//! meaning. Empty fields are read as missing, and every column is read as
//! text so flight codes reach [`parse_flight_code`] uncoerced.

use crate::error::{Result, ResultExt};
use crate::types::{DefectKind, FlightCode};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;

fn csv_options(delimiter: u8) -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        // Zero rows of inference reads every column as String.
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(delimiter).with_quote_char(Some(b'"')))
}

/// Parse flight records from in-memory text with a header row.
pub fn read_flights_str(text: &str, delimiter: u8) -> Result<DataFrame> {
    let cursor = Cursor::new(text.as_bytes().to_vec());
    let df = csv_options(delimiter)
        .into_reader_with_file_handle(cursor)
        .finish()
        .context("Failed to parse flight records")?;
    debug!("Parsed flight text: {:?}", df.shape());
    Ok(df)
}

/// Parse flight records from any reader, such as stdin.
pub fn read_flights<R: Read>(mut reader: R, delimiter: u8) -> Result<DataFrame> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .context("Failed to read flight records")?;
    read_flights_str(&text, delimiter)
}

/// Parse flight records from a file with a header row.
pub fn read_flights_file(path: impl AsRef<Path>, delimiter: u8) -> Result<DataFrame> {
    let path = path.as_ref();
    let df = csv_options(delimiter)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Failed to open {}", path.display()))?
        .finish()
        .context(format!("Failed to parse flight records in {}", path.display()))?;
    debug!("Parsed {}: {:?}", path.display(), df.shape());
    Ok(df)
}

/// Interpret a raw flight code.
///
/// Blank text is [`DefectKind::MissingValue`]; anything that is not a finite
/// decimal number (including `NaN` and `inf`) is
/// [`DefectKind::UnparseableNumeric`]. Integral text, with or without a zero
/// fraction such as `20015.0`, is parsed straight to an integer so large codes
/// keep every digit.
pub fn parse_flight_code(raw: &str) -> std::result::Result<FlightCode, DefectKind> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DefectKind::MissingValue);
    }

    if let Some(code) = parse_integral(trimmed) {
        return Ok(FlightCode::Exact(code));
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(FlightCode::from(value)),
        _ => Err(DefectKind::UnparseableNumeric),
    }
}

fn parse_integral(text: &str) -> Option<i64> {
    let whole = match text.split_once('.') {
        Some((whole, fraction)) if fraction.bytes().all(|b| b == b'0') => whole,
        Some(_) => return None,
        None => text,
    };
    whole.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{FLIGHT_CODES_COLUMN, ROUTE_COLUMN};

    const TEXT: &str = "Airline Code;DelayTimes;FlightCodes;To_From\n\
                        Air Canada (!);[21, 40];20015.0;WAterLoo_NEWYork\n\
                        <Air France> (12);[];;Montreal_TORONTO\n";

    #[test]
    fn test_parse_flight_code() {
        assert_eq!(parse_flight_code("20015.0"), Ok(FlightCode::Exact(20015)));
        assert_eq!(parse_flight_code(" 42 "), Ok(FlightCode::Exact(42)));
        assert_eq!(parse_flight_code("5."), Ok(FlightCode::Exact(5)));
        assert_eq!(parse_flight_code("-3.5"), Ok(FlightCode::Float(-3.5)));
        assert_eq!(parse_flight_code("1e3"), Ok(FlightCode::Exact(1000)));
        assert_eq!(parse_flight_code(""), Err(DefectKind::MissingValue));
        assert_eq!(parse_flight_code("   "), Err(DefectKind::MissingValue));
        assert_eq!(
            parse_flight_code("AC-20"),
            Err(DefectKind::UnparseableNumeric)
        );
        assert_eq!(parse_flight_code("NaN"), Err(DefectKind::UnparseableNumeric));
        assert_eq!(parse_flight_code("inf"), Err(DefectKind::UnparseableNumeric));
    }

    #[test]
    fn test_parse_large_flight_code_keeps_digits() {
        assert_eq!(
            parse_flight_code("9007199254740993"),
            Ok(FlightCode::Exact(9_007_199_254_740_993))
        );
        assert_eq!(
            parse_flight_code("9007199254740993.00"),
            Ok(FlightCode::Exact(9_007_199_254_740_993))
        );
        assert_eq!(
            parse_flight_code("9223372036854775808"),
            Ok(FlightCode::Float(9_223_372_036_854_775_808.0))
        );
        assert_eq!(parse_flight_code("."), Err(DefectKind::UnparseableNumeric));
    }

    #[test]
    fn test_read_flights_str() {
        let df = read_flights_str(TEXT, b';').unwrap();
        assert_eq!(df.shape(), (2, 4));

        let codes = df.column(FLIGHT_CODES_COLUMN).unwrap();
        assert_eq!(codes.dtype(), &DataType::String);
        assert_eq!(codes.null_count(), 1);

        let routes: Vec<Option<String>> = df
            .column(ROUTE_COLUMN)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        assert_eq!(
            routes,
            vec![
                Some("WAterLoo_NEWYork".to_string()),
                Some("Montreal_TORONTO".to_string())
            ]
        );
    }

    #[test]
    fn test_doubled_quotes_unescape() {
        let text = "Airline Code;DelayTimes;FlightCodes;To_From\n\
                    \"Say \"\"Hi\"\" Air\";[];1;A_B\n";
        let df = read_flights_str(text, b';').unwrap();
        let name = df
            .column("Airline Code")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .get(0)
            .map(str::to_string);
        assert_eq!(name.as_deref(), Some("Say \"Hi\" Air"));
    }

    #[test]
    fn test_read_flights_from_reader() {
        let df = read_flights(TEXT.as_bytes(), b';').unwrap();
        assert_eq!(df.shape(), (2, 4));
    }

    #[test]
    fn test_unreadable_input_is_io_error() {
        let err = read_flights(&[0xff, 0xfe, 0xfd][..], b';').unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_flights_file("/definitely/not/here.csv", b';');
        assert!(result.is_err());
    }
}
