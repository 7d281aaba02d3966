//! The destination classifier.
//!
//! Fixed topology:
//! `input -> fc1 -> bn1 -> relu -> fc2 -> bn2 -> relu -> fc3 -> logits`.
//! Layer widths come from [`ModelConfig`]; the weight file must match them
//! exactly or loading fails.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::dense::{relu, BatchNorm1d, Linear};
use super::tensor::Tensor;
use crate::config::ModelConfig;
use crate::error::{Result, ServeError};

/// Serialized parameters, keyed like the training framework's state dict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDict {
    pub fc1: Linear,
    pub bn1: BatchNorm1d,
    pub fc2: Linear,
    pub bn2: BatchNorm1d,
    pub fc3: Linear,

    /// Optional free-form metadata (versioning, training info, etc).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct AirbnbNet {
    config: ModelConfig,
    params: StateDict,
}

impl AirbnbNet {
    pub fn from_state_dict(config: ModelConfig, params: StateDict) -> Result<Self> {
        validate(&config, &params).map_err(ServeError::ShapeMismatch)?;
        Ok(Self { config, params })
    }

    pub fn from_file<P: AsRef<Path>>(path: P, config: ModelConfig) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServeError::artifact(path, e.to_string()))?;
        let params: StateDict = serde_json::from_str(&content)
            .map_err(|e| ServeError::artifact(path, e.to_string()))?;
        validate(&config, &params).map_err(|reason| ServeError::artifact(path, reason))?;
        Ok(Self { config, params })
    }

    pub fn input_size(&self) -> usize {
        self.config.input_size
    }

    pub fn output_size(&self) -> usize {
        self.config.output_size
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.params.metadata
    }

    /// Logits for a single feature vector.
    pub fn forward_row(&self, input: &[f32]) -> Result<Vec<f32>> {
        if input.len() != self.config.input_size {
            return Err(ServeError::ShapeMismatch(format!(
                "AirbnbNet input dim mismatch: got {}, expected {}",
                input.len(),
                self.config.input_size
            )));
        }

        let p = &self.params;
        let mut x = p.fc1.forward(input);
        p.bn1.forward(&mut x);
        relu(&mut x);
        let mut x = p.fc2.forward(&x);
        p.bn2.forward(&mut x);
        relu(&mut x);
        Ok(p.fc3.forward(&x))
    }

    /// Logits for every row of a `(batch, input_size)` tensor.
    pub fn forward(&self, input: &Tensor) -> Result<Vec<Vec<f32>>> {
        let (_, cols) = input.shape();
        if cols != self.config.input_size {
            return Err(ServeError::ShapeMismatch(format!(
                "AirbnbNet input dim mismatch: got {cols}, expected {}",
                self.config.input_size
            )));
        }
        input.rows().map(|row| self.forward_row(row)).collect()
    }
}

fn validate(config: &ModelConfig, p: &StateDict) -> std::result::Result<(), String> {
    let ModelConfig {
        input_size,
        hidden_size,
        output_size,
    } = *config;
    if input_size == 0 || hidden_size == 0 || output_size == 0 {
        return Err("layer sizes must be > 0".to_string());
    }
    p.fc1.validate("fc1", input_size, hidden_size)?;
    p.bn1.validate("bn1", hidden_size)?;
    p.fc2.validate("fc2", hidden_size, hidden_size)?;
    p.bn2.validate("bn2", hidden_size)?;
    p.fc3.validate("fc3", hidden_size, output_size)?;
    Ok(())
}

/// Index of the largest logit; the first one wins ties. NaN compares as the
/// maximum, matching torch.argmax.
pub fn argmax(logits: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in logits.iter().enumerate() {
        if v.is_nan() {
            return Some(i);
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
