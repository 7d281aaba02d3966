//! Inference-only building blocks: fully-connected and batch-norm layers.
//!
//! Parameters are stored the way PyTorch lays out a state dict so exported
//! weights can be dumped to JSON without reshaping.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Linear {
    /// Weights shape: [out_dim][in_dim]
    pub weight: Vec<Vec<f32>>,
    /// Bias shape: [out_dim]
    pub bias: Vec<f32>,
}

impl Linear {
    pub fn in_dim(&self) -> usize {
        self.weight.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn out_dim(&self) -> usize {
        self.weight.len()
    }

    pub fn validate(&self, name: &str, in_dim: usize, out_dim: usize) -> Result<(), String> {
        if self.out_dim() != out_dim {
            return Err(format!(
                "{name}.weight has {} rows, expected {out_dim}",
                self.out_dim()
            ));
        }
        if self.bias.len() != out_dim {
            return Err(format!(
                "{name}.bias len {} != out_dim {out_dim}",
                self.bias.len()
            ));
        }
        for (r, row) in self.weight.iter().enumerate() {
            if row.len() != in_dim {
                return Err(format!(
                    "{name}.weight row {r} len {} != expected in_dim {in_dim}",
                    row.len()
                ));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(format!("{name}.weight contains non-finite values"));
            }
        }
        if self.bias.iter().any(|v| !v.is_finite()) {
            return Err(format!("{name}.bias contains non-finite values"));
        }
        Ok(())
    }

    pub fn forward(&self, x: &[f32]) -> Vec<f32> {
        self.weight
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                debug_assert_eq!(row.len(), x.len());
                row.iter().zip(x).fold(*b, |acc, (w, xi)| acc + w * xi)
            })
            .collect()
    }
}

fn default_eps() -> f32 {
    1e-5
}

/// Batch normalization evaluated with the running statistics captured during
/// training, so a batch of one is well defined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchNorm1d {
    pub weight: Vec<f32>,
    pub bias: Vec<f32>,
    pub running_mean: Vec<f32>,
    pub running_var: Vec<f32>,
    #[serde(default = "default_eps")]
    pub eps: f32,
}

impl BatchNorm1d {
    pub fn validate(&self, name: &str, features: usize) -> Result<(), String> {
        for (field, values) in [
            ("weight", &self.weight),
            ("bias", &self.bias),
            ("running_mean", &self.running_mean),
            ("running_var", &self.running_var),
        ] {
            if values.len() != features {
                return Err(format!(
                    "{name}.{field} len {} != {features} features",
                    values.len()
                ));
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(format!("{name}.{field} contains non-finite values"));
            }
        }
        if !(self.eps.is_finite() && self.eps >= 0.0) {
            return Err(format!("{name}.eps must be finite and >= 0"));
        }
        if self.running_var.iter().any(|v| v + self.eps <= 0.0) {
            return Err(format!("{name}.running_var + eps must be > 0"));
        }
        Ok(())
    }

    pub fn forward(&self, x: &mut [f32]) {
        for (i, v) in x.iter_mut().enumerate() {
            let inv_std = 1.0 / (self.running_var[i] + self.eps).sqrt();
            *v = (*v - self.running_mean[i]) * inv_std * self.weight[i] + self.bias[i];
        }
    }
}

pub fn relu(x: &mut [f32]) {
    for v in x.iter_mut() {
        *v = v.max(0.0);
    }
}
