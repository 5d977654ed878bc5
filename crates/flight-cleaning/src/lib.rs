//! Flight Record Cleaning Library
//!
//! Turns a small table of raw, inconsistently formatted flight records into a
//! normalized table.
//!
//! # Overview
//!
//! Three independent column transforms run over a [`FlightTable`]:
//!
//! - **Flight codes**: [`IdentifierReconstructor`] rebuilds the code column as
//!   an arithmetic sequence anchored at the first present value
//! - **Routes**: [`RouteSplitter`] splits `ORIGIN_DESTINATION` into upper-cased
//!   `To` / `From` fields
//! - **Airline names**: [`NameNormalizer`] strips punctuation and title-cases
//!
//! Per-field defects never abort a run; they fall back to defaults and are
//! reported in the [`CleaningSummary`]. Only configuration errors (such as a
//! non-positive step) and boundary failures are returned as errors.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use flight_cleaning::{CleaningConfig, Pipeline, read_flights_str};
//!
//! let df = read_flights_str(text, b';')?;
//!
//! let result = Pipeline::builder()
//!     .config(CleaningConfig::builder().step(10).build()?)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process_frame(&df)?;
//!
//! println!("{}", result.cleaned.to_dataframe()?);
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod table;
pub mod transforms;
pub mod types;

// Re-exports for convenient access
pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use pipeline::{
    CleaningStage, ClosureProgressReporter, Pipeline, PipelineBuilder, ProgressReporter,
    ProgressUpdate,
};
pub use reader::{parse_flight_code, read_flights, read_flights_file, read_flights_str};
pub use table::{CleanedRecord, CleanedTable, FlightRecord, FlightTable, OUTPUT_COLUMNS};
pub use transforms::{
    IdentifierReconstructor, NameNormalizer, Reconstruction, Route, RouteSplitter,
};
pub use types::{Anchor, CleaningSummary, DefectKind, FieldDefect, FlightCode, PipelineResult};
