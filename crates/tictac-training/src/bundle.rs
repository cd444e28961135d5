//! Serialized network weights.
//!
//! ```json
//! {
//!   "w1": [[...9 values...], ...H rows...],
//!   "b1": [...H values...],
//!   "w2": [[...H values...], ...9 rows...],
//!   "b2": [...9 values...]
//! }
//! ```
//!
//! The hidden width is not stored; it is the length of `b1`.

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError,
    mlp::{INPUT_SIZE, OUTPUT_SIZE},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightBundle {
    pub w1: Vec<Vec<f32>>,
    pub b1: Vec<f32>,
    pub w2: Vec<Vec<f32>>,
    pub b2: Vec<f32>,
}

/// Error returned when a bundle's matrices do not fit together.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("b1 is empty")]
    EmptyHiddenLayer,
    #[display("{name} has {found} rows, expected {expected}")]
    Rows {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    #[display("{name} row {row} has {found} columns, expected {expected}")]
    Columns {
        name: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("b2 has {found} entries, expected {expected}")]
    OutputBias { expected: usize, found: usize },
    #[display("{name} contains a non-finite value")]
    NonFinite { name: &'static str },
}

/// Error returned when a bundle cannot be turned into a network.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum LoadError {
    #[display("malformed weights: {_0}")]
    Shape(#[error(not(source))] ShapeError),
    #[display("invalid network setting: {_0}")]
    Config(#[error(not(source))] ConfigError),
}

impl WeightBundle {
    /// Checks that the matrices describe a `9 → H → 9` network and returns `H`.
    pub fn validate(&self) -> Result<usize, ShapeError> {
        let hidden = self.b1.len();
        if hidden == 0 {
            return Err(ShapeError::EmptyHiddenLayer);
        }
        check_matrix("w1", &self.w1, hidden, INPUT_SIZE)?;
        check_matrix("w2", &self.w2, OUTPUT_SIZE, hidden)?;
        if self.b2.len() != OUTPUT_SIZE {
            return Err(ShapeError::OutputBias {
                expected: OUTPUT_SIZE,
                found: self.b2.len(),
            });
        }
        for (name, values) in [("b1", &self.b1), ("b2", &self.b2)] {
            if !values.iter().all(|v| v.is_finite()) {
                return Err(ShapeError::NonFinite { name });
            }
        }
        Ok(hidden)
    }
}

fn check_matrix(
    name: &'static str,
    rows: &[Vec<f32>],
    expected_rows: usize,
    expected_columns: usize,
) -> Result<(), ShapeError> {
    if rows.len() != expected_rows {
        return Err(ShapeError::Rows {
            name,
            expected: expected_rows,
            found: rows.len(),
        });
    }
    for (row, values) in rows.iter().enumerate() {
        if values.len() != expected_columns {
            return Err(ShapeError::Columns {
                name,
                row,
                expected: expected_columns,
                found: values.len(),
            });
        }
        if !values.iter().all(|v| v.is_finite()) {
            return Err(ShapeError::NonFinite { name });
        }
    }
    Ok(())
}
