//! Main cleaning pipeline.
//!
//! The three transforms each read one input column and write their own
//! output; results are zipped back together by row index.

use crate::config::CleaningConfig;
use crate::error::Result;
use crate::pipeline::progress::{
    ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate,
};
use crate::table::{CleanedRecord, CleanedTable, FLIGHT_CODES_COLUMN, FlightTable, ROUTE_COLUMN};
use crate::transforms::{IdentifierReconstructor, NameNormalizer, Route, RouteSplitter};
use crate::types::{CleaningSummary, DefectKind, FieldDefect, PipelineResult};
use polars::prelude::DataFrame;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The flight cleaning pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use flight_cleaning::{CleaningConfig, Pipeline, read_flights_file};
///
/// let df = read_flights_file("flights.csv", b';')?;
/// let result = Pipeline::builder()
///     .config(CleaningConfig::builder().step(10).build()?)
///     .build()?
///     .process_frame(&df)?;
///
/// println!("{}", result.cleaned.to_dataframe()?);
/// ```
pub struct Pipeline {
    config: CleaningConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    reconstructor: IdentifierReconstructor,
    splitter: RouteSplitter,
    normalizer: NameNormalizer,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Clean a flight table.
    ///
    /// The input is only read; the returned [`CleanedTable`] has the same
    /// length and row order.
    pub fn process(&self, table: &FlightTable) -> Result<PipelineResult> {
        self.run(|| Ok((table.clone(), Vec::new())))
    }

    /// Convert a parsed frame into a [`FlightTable`] and clean it.
    ///
    /// Defects found while converting (such as unparseable flight codes) are
    /// included in the summary.
    pub fn process_frame(&self, df: &DataFrame) -> Result<PipelineResult> {
        self.run(|| FlightTable::from_dataframe(df))
    }

    fn run<F>(&self, load: F) -> Result<PipelineResult>
    where
        F: FnOnce() -> Result<(FlightTable, Vec<FieldDefect>)>,
    {
        match self.process_internal(load) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Cleaning completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal<F>(&self, load: F) -> Result<PipelineResult>
    where
        F: FnOnce() -> Result<(FlightTable, Vec<FieldDefect>)>,
    {
        let start_time = Instant::now();

        info!("Starting flight cleaning pipeline...");
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Initializing,
            0.0,
            "Loading flight records...",
        ));

        let (table, load_defects) = load()?;
        let mut summary = CleaningSummary::new(table.len());
        summary.defects = load_defects;
        let mut processing_steps = Vec::new();

        // Step 1: flight codes
        self.report_progress(ProgressUpdate::new(
            CleaningStage::IdentifierReconstruction,
            0.0,
            "Reconstructing flight codes...",
        ));
        info!(
            "Step 1: Reconstructing flight codes (step {})...",
            self.reconstructor.step()
        );
        let flight_codes =
            self.reconstruct_flight_codes(&table, &mut summary, &mut processing_steps)?;

        // Step 2: routes
        self.report_progress(ProgressUpdate::new(
            CleaningStage::RouteSplitting,
            0.0,
            "Splitting routes...",
        ));
        info!("Step 2: Splitting routes...");
        let routes = self.split_routes(&table, &mut summary, &mut processing_steps);

        // Step 3: airline names
        self.report_progress(ProgressUpdate::new(
            CleaningStage::NameNormalization,
            0.0,
            "Normalizing airline names...",
        ));
        info!("Step 3: Normalizing airline names...");
        let airline_codes = self.normalize_names(&table, &mut summary, &mut processing_steps);

        let records: Vec<CleanedRecord> = table
            .iter()
            .zip(flight_codes)
            .zip(routes)
            .zip(airline_codes)
            .map(|(((record, flight_code), route), airline_code)| CleanedRecord {
                airline_code,
                delay_times: record.delay_times.clone(),
                flight_code,
                to: route.to,
                from: route.from,
            })
            .collect();

        debug_assert_eq!(records.len(), table.len());

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Cleaned {} rows in {}ms ({} field defects)",
            records.len(),
            summary.duration_ms,
            summary.defects.len()
        );

        Ok(PipelineResult {
            cleaned: CleanedTable::new(records),
            summary,
            processing_steps,
        })
    }

    fn reconstruct_flight_codes(
        &self,
        table: &FlightTable,
        summary: &mut CleaningSummary,
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<i64>> {
        let column = table.flight_codes();

        for (row, code) in column.iter().enumerate() {
            if !code.is_some_and(|c| c.is_finite()) {
                summary.flight_codes_missing += 1;
                let already_reported = summary.defects.iter().any(|d| {
                    d.row == row
                        && d.column == FLIGHT_CODES_COLUMN
                        && d.kind == DefectKind::UnparseableNumeric
                });
                if !already_reported {
                    summary.defects.push(FieldDefect::missing(row, FLIGHT_CODES_COLUMN));
                }
            }
        }
        summary.flight_codes_unparseable = summary.defect_count(DefectKind::UnparseableNumeric);

        let reconstruction = self.reconstructor.reconstruct(&column)?;
        summary.anchor = reconstruction.anchor;
        summary.flight_codes_overwritten = reconstruction.overwritten.len();

        match reconstruction.anchor {
            Some(anchor) => processing_steps.push(format!(
                "Rebuilt {} flight codes from {} at row {} (step {}, {} missing, {} replaced)",
                reconstruction.values.len(),
                anchor.value,
                anchor.index,
                self.reconstructor.step(),
                summary.flight_codes_missing,
                summary.flight_codes_overwritten
            )),
            None => processing_steps.push(format!(
                "No flight codes present; generated {} codes from 0 (step {})",
                reconstruction.values.len(),
                self.reconstructor.step()
            )),
        }

        Ok(reconstruction.values)
    }

    fn split_routes(
        &self,
        table: &FlightTable,
        summary: &mut CleaningSummary,
        processing_steps: &mut Vec<String>,
    ) -> Vec<Route> {
        let routes: Vec<Route> = table
            .iter()
            .enumerate()
            .map(|(row, record)| {
                match record.route.as_deref() {
                    None => {
                        debug!("Row {}: route missing", row);
                        summary.routes_missing += 1;
                        summary.defects.push(FieldDefect::missing(row, ROUTE_COLUMN));
                    }
                    Some(raw) if raw.trim().is_empty() => {
                        summary.routes_missing += 1;
                        summary.defects.push(FieldDefect::missing(row, ROUTE_COLUMN));
                    }
                    Some(raw) if !self.splitter.has_separator(raw) => {
                        debug!("Row {}: route {:?} has no separator", row, raw);
                        summary.routes_without_separator += 1;
                    }
                    Some(_) => {}
                }
                self.splitter.split(record.route.as_deref())
            })
            .collect();

        processing_steps.push(format!(
            "Split {} routes into To/From ({} missing, {} without separator)",
            routes.len(),
            summary.routes_missing,
            summary.routes_without_separator
        ));
        routes
    }

    fn normalize_names(
        &self,
        table: &FlightTable,
        summary: &mut CleaningSummary,
        processing_steps: &mut Vec<String>,
    ) -> Vec<String> {
        let names: Vec<String> = table
            .iter()
            .map(|record| {
                let normalized = self.normalizer.normalize(&record.airline_code);
                if normalized != record.airline_code {
                    summary.airline_codes_changed += 1;
                }
                normalized
            })
            .collect();

        processing_steps.push(format!(
            "Normalized {} airline names ({} changed)",
            names.len(),
            summary.airline_codes_changed
        ));
        names
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<CleaningConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Fails with [`CleaningError::InvalidStep`](crate::CleaningError::InvalidStep)
    /// for a non-positive step, before any row is processed.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            reconstructor: IdentifierReconstructor::new(config.step)?,
            splitter: RouteSplitter::new(config.route_separator),
            normalizer: NameNormalizer,
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CleaningError;
    use crate::table::FlightRecord;
    use crate::types::FlightCode;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn record(name: &str, delays: &str, code: Option<i64>, route: &str) -> FlightRecord {
        FlightRecord::new(
            name,
            Some(delays),
            code.map(FlightCode::Exact),
            Some(route),
        )
    }

    fn sample_table() -> FlightTable {
        FlightTable::new(vec![
            record(
                "Air Canada (!)",
                "[21, 40]",
                Some(20015),
                "WAterLoo_NEWYork",
            ),
            record("<Air France> (12)", "[]", None, "Montreal_TORONTO"),
            record(
                "(Porter Airways. )",
                "[60, 22, 87]",
                Some(20035),
                "CALgary_Ottawa",
            ),
            record("12. Air France", "[78, 66]", None, "Ottawa_VANcouvER"),
            record("Lufthansa", "[12, 33]", Some(20055), "london_MONTreal"),
        ])
    }

    fn pipeline() -> Pipeline {
        Pipeline::builder().build().unwrap()
    }

    #[test]
    fn test_process_sample_table() {
        let result = pipeline().process(&sample_table()).unwrap();
        let cleaned = &result.cleaned;

        assert_eq!(cleaned.len(), 5);
        assert_eq!(cleaned.flight_codes(), vec![20015, 20025, 20035, 20045, 20055]);

        let first = &cleaned.records()[0];
        assert_eq!(first.airline_code, "Air Canada ");
        assert_eq!(first.delay_times.as_deref(), Some("[21, 40]"));
        assert_eq!(first.to, "WATERLOO");
        assert_eq!(first.from, "NEWYORK");

        assert_eq!(result.summary.rows, 5);
        assert_eq!(result.summary.flight_codes_missing, 2);
        assert_eq!(result.summary.flight_codes_overwritten, 0);
        assert_eq!(result.summary.airline_codes_changed, 4);
        assert_eq!(result.processing_steps.len(), 3);
    }

    #[test]
    fn test_input_table_is_not_modified() {
        let table = sample_table();
        let before = table.clone();
        let _ = pipeline().process(&table).unwrap();
        assert_eq!(table, before);
    }

    #[test]
    fn test_empty_table() {
        let result = pipeline().process(&FlightTable::default()).unwrap();
        assert!(result.cleaned.is_empty());
        assert_eq!(result.summary.anchor, None);
    }

    #[test]
    fn test_missing_fields_degrade_to_defaults() {
        let table = FlightTable::new(vec![
            FlightRecord::new("", None, None, None),
            FlightRecord::new("  ", None, None, Some("WATERLOO")),
        ]);

        let result = pipeline().process(&table).unwrap();
        let records = result.cleaned.records();

        assert_eq!(result.cleaned.flight_codes(), vec![0, 10]);
        assert_eq!((records[0].to.as_str(), records[0].from.as_str()), ("", ""));
        assert_eq!((records[1].to.as_str(), records[1].from.as_str()), ("WATERLOO", ""));
        assert_eq!(records[0].airline_code, "");
        assert_eq!(records[1].airline_code, "");

        assert_eq!(result.summary.routes_missing, 1);
        assert_eq!(result.summary.routes_without_separator, 1);
        assert_eq!(result.summary.defect_count(DefectKind::MissingValue), 3);
    }

    #[test]
    fn test_large_codes_keep_exact_step() {
        let table = FlightTable::new(vec![
            record("a", "[]", Some(9_007_199_254_740_993), "x_y"),
            record("b", "[]", None, "y_z"),
        ]);
        let config = CleaningConfig::builder().step(1).build().unwrap();
        let result = Pipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .process(&table)
            .unwrap();

        assert_eq!(
            result.cleaned.flight_codes(),
            vec![9_007_199_254_740_993, 9_007_199_254_740_994]
        );
        assert_eq!(result.summary.flight_codes_overwritten, 0);
    }

    #[test]
    fn test_invalid_step_rejected_at_build() {
        let config = CleaningConfig {
            step: 0,
            ..Default::default()
        };
        let err = Pipeline::builder().config(config).build().err().unwrap();
        assert!(matches!(err, CleaningError::InvalidStep(0)));
    }

    #[test]
    fn test_custom_step() {
        let config = CleaningConfig::builder().step(5).build().unwrap();
        let result = Pipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .process(&sample_table())
            .unwrap();

        assert_eq!(result.cleaned.flight_codes(), vec![20015, 20020, 20025, 20030, 20035]);
        assert_eq!(result.summary.flight_codes_overwritten, 2);
    }

    #[test]
    fn test_progress_reported_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stages);

        Pipeline::builder()
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap()
            .process(&sample_table())
            .unwrap();

        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                CleaningStage::Initializing,
                CleaningStage::IdentifierReconstruction,
                CleaningStage::RouteSplitting,
                CleaningStage::NameNormalization,
                CleaningStage::Complete,
            ]
        );
    }

    #[test]
    fn test_failure_reported() {
        let failed = Arc::new(Mutex::new(false));
        let sink = Arc::clone(&failed);
        let table = FlightTable::new(vec![FlightRecord::new(
            "x",
            None,
            Some(FlightCode::from(9.3e18)),
            None,
        )]);

        let result = Pipeline::builder()
            .on_progress(move |update| {
                if update.stage == CleaningStage::Failed {
                    *sink.lock().unwrap() = true;
                }
            })
            .build()
            .unwrap()
            .process(&table);

        assert!(matches!(result, Err(CleaningError::SequenceOverflow { row: 0 })));
        assert!(*failed.lock().unwrap());
    }
}
