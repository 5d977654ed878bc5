//! Flight code reconstruction.
//!
//! Every row's code is derived from its distance to the anchor row (the first
//! row holding a present value): `anchor + (row - anchor_row) * step`,
//! truncated toward zero. Present codes that disagree with the formula are
//! replaced, not preserved.

use crate::error::{CleaningError, Result};
use crate::types::{Anchor, FlightCode};
use tracing::{debug, warn};

/// Output of [`IdentifierReconstructor::reconstruct`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    /// One code per input row, in row order.
    pub values: Vec<i64>,
    /// `None` when every input value was missing.
    pub anchor: Option<Anchor>,
    /// Rows whose present value differed from the reconstructed one.
    pub overwritten: Vec<usize>,
}

/// Rebuilds a flight code column as an arithmetic sequence.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierReconstructor {
    step: i64,
}

impl IdentifierReconstructor {
    /// Create a reconstructor with the given step.
    ///
    /// Fails with [`CleaningError::InvalidStep`] when `step <= 0`, before any
    /// row is looked at.
    pub fn new(step: i64) -> Result<Self> {
        if step <= 0 {
            return Err(CleaningError::InvalidStep(step));
        }
        Ok(Self { step })
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Reconstruct the column. The output always has the input's length.
    ///
    /// Non-finite values are treated as missing. With no present value at
    /// all the sequence starts at zero: `[0, step, 2 * step, ...]`. A present
    /// code counts as overwritten only when its truncated value differs from
    /// the reconstructed one.
    pub fn reconstruct(&self, column: &[Option<FlightCode>]) -> Result<Reconstruction> {
        let anchor = column.iter().enumerate().find_map(|(index, value)| {
            value
                .filter(FlightCode::is_finite)
                .map(|value| Anchor { index, value })
        });

        let (anchor_row, (whole, fraction)) = match anchor {
            Some(anchor) => {
                debug!(
                    "Anchoring flight codes at row {} (value {})",
                    anchor.index, anchor.value
                );
                (anchor.index, anchor.value.split())
            }
            None => {
                debug!(
                    "No flight code present in {} rows, anchoring sequence at 0",
                    column.len()
                );
                (0, (0, 0.0))
            }
        };

        let mut values = Vec::with_capacity(column.len());
        let mut overwritten = Vec::new();

        for (row, original) in column.iter().enumerate() {
            let offset = row as i128 - anchor_row as i128;
            let value = sequence_value(whole, fraction, offset, self.step)
                .ok_or(CleaningError::SequenceOverflow { row })?;

            if let Some(original) = original.filter(FlightCode::is_finite)
                && original.truncated() != Some(value)
            {
                warn!(
                    "Flight code {} at row {} replaced by {}",
                    original, row, value
                );
                overwritten.push(row);
            }
            values.push(value);
        }

        Ok(Reconstruction {
            values,
            anchor,
            overwritten,
        })
    }
}

/// `trunc(whole + fraction + offset * step)` in integer arithmetic.
///
/// `fraction` has the sign of `whole` (or `whole` is zero), so only a sum whose
/// sign differs from the remainder's moves one unit toward zero.
fn sequence_value(whole: i128, fraction: f64, offset: i128, step: i64) -> Option<i64> {
    let sum = offset.checked_mul(i128::from(step))?.checked_add(whole)?;
    let truncated = if sum > 0 && fraction < 0.0 {
        sum - 1
    } else if sum < 0 && fraction > 0.0 {
        sum + 1
    } else {
        sum
    };
    i64::try_from(truncated).ok()
}
