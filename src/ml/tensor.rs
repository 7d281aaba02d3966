use crate::error::{Result, ServeError};

/// Dense row-major f32 matrix with shape `(rows, cols)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Tensor {
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if rows * cols != data.len() {
            return Err(ServeError::ShapeMismatch(format!(
                "tensor ({rows}, {cols}) needs {} values, got {}",
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Single-row batch of shape `(1, values.len())`.
    pub fn row_vector(values: Vec<f32>) -> Self {
        Self {
            rows: 1,
            cols: values.len(),
            data: values,
        }
    }

    /// Narrow f64 features to single precision.
    pub fn from_f64_row(values: &[f64]) -> Self {
        Self::row_vector(values.iter().map(|v| *v as f32).collect())
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks(self.cols.max(1)).take(self.rows)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
