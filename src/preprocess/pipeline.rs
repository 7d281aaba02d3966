use tracing::warn;

use super::encoding::{EncodingTable, PassThrough};
use super::scaler::MinMaxScaler;
use crate::dataset::{Row, Value};
use crate::error::{Result, ServeError};
use crate::ml::Tensor;

/// Output of one pipeline run.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// `(1, n_features)` input for the network.
    pub tensor: Tensor,
    /// Columns the encoder could not encode.
    pub pass_through: PassThrough,
}

/// Target-encode, then min-max scale, then tensorize a single row.
pub struct ProcessingPipeline<'a> {
    encodings: &'a EncodingTable,
    scaler: &'a MinMaxScaler,
}

impl<'a> ProcessingPipeline<'a> {
    pub fn new(encodings: &'a EncodingTable, scaler: &'a MinMaxScaler) -> Self {
        Self { encodings, scaler }
    }

    pub fn output_width(&self) -> usize {
        self.scaler.n_features()
    }

    /// Encode a copy of `row`; the caller's row is untouched.
    pub fn target_encode(&self, row: &Row) -> (Row, PassThrough) {
        let mut encoded = row.clone();
        let report = self.encodings.encode(&mut encoded);
        (encoded, report)
    }

    /// Lay out an encoded row in scaler feature order as raw f64 values.
    ///
    /// Missing cells become NaN. Text that survived encoding cannot be scaled.
    pub fn numeric_features(&self, encoded: &Row) -> Result<Vec<f64>> {
        if let Some(extra) = encoded
            .columns()
            .find(|c| !self.scaler.feature_names.iter().any(|f| f == c))
        {
            return Err(ServeError::ShapeMismatch(format!(
                "column {extra} was not seen when the scaler was fitted"
            )));
        }

        self.scaler
            .feature_names
            .iter()
            .map(|name| match encoded.get(name) {
                None => Err(ServeError::ShapeMismatch(format!(
                    "row is missing feature {name}"
                ))),
                Some(Value::Number(n)) => Ok(*n),
                Some(Value::Missing) => Ok(f64::NAN),
                Some(Value::Category(s)) => Err(ServeError::NonNumeric {
                    column: name.clone(),
                    value: s.clone(),
                }),
            })
            .collect()
    }

    pub fn run(&self, row: &Row) -> Result<Preprocessed> {
        let (encoded, pass_through) = self.target_encode(row);
        if !pass_through.is_empty() {
            warn!(
                columns = ?pass_through.columns,
                "values missing from encoding table were passed through unencoded"
            );
        }

        let raw = self.numeric_features(&encoded)?;
        let scaled = self.scaler.transform(&raw)?;

        Ok(Preprocessed {
            tensor: Tensor::from_f64_row(&scaled),
            pass_through,
        })
    }
}
