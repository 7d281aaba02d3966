use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, ServeError};

/// Fitted min-max scaler.
///
/// Each feature is mapped with `x * scale + min` where
/// `scale = (hi - lo) / (data_max - data_min)` and `min = lo - data_min * scale`.
/// Inputs outside the fitted range produce outputs outside `feature_range`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    /// Feature order the scaler was fitted on. This is also the input order of
    /// the network.
    pub feature_names: Vec<String>,
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

impl MinMaxScaler {
    pub fn new(feature_names: Vec<String>, data_min: Vec<f64>, data_max: Vec<f64>) -> Self {
        Self {
            feature_names,
            data_min,
            data_max,
            feature_range: default_feature_range(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServeError::artifact(path, e.to_string()))?;
        let scaler: Self = serde_json::from_str(&content)
            .map_err(|e| ServeError::artifact(path, e.to_string()))?;
        scaler
            .validate()
            .map_err(|reason| ServeError::artifact(path, reason))?;
        Ok(scaler)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err("feature_names must not be empty".to_string());
        }
        if self.data_min.len() != n {
            return Err(format!("data_min length {} != {n} features", self.data_min.len()));
        }
        if self.data_max.len() != n {
            return Err(format!("data_max length {} != {n} features", self.data_max.len()));
        }
        let (lo, hi) = self.feature_range;
        if lo.partial_cmp(&hi) != Some(std::cmp::Ordering::Less) {
            return Err(format!("feature_range ({lo}, {hi}) must be increasing"));
        }
        for (i, (min, max)) in self.data_min.iter().zip(&self.data_max).enumerate() {
            if !min.is_finite() || !max.is_finite() {
                return Err(format!("feature {} bounds are not finite", self.feature_names[i]));
            }
            if min > max {
                return Err(format!(
                    "feature {} has data_min {min} > data_max {max}",
                    self.feature_names[i]
                ));
            }
        }
        let mut names: Vec<&str> = self.feature_names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != n {
            return Err("feature_names contain duplicates".to_string());
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    fn scale_and_min(&self, i: usize) -> (f64, f64) {
        let (lo, hi) = self.feature_range;
        let mut range = self.data_max[i] - self.data_min[i];
        // Constant features would divide by zero.
        if range == 0.0 {
            range = 1.0;
        }
        let scale = (hi - lo) / range;
        (scale, lo - self.data_min[i] * scale)
    }

    /// Scale one vector already laid out in `feature_names` order.
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        if values.len() != self.n_features() {
            return Err(ServeError::ShapeMismatch(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                values.len()
            )));
        }
        Ok(values
            .iter()
            .enumerate()
            .map(|(i, x)| {
                let (scale, min) = self.scale_and_min(i);
                x * scale + min
            })
            .collect())
    }

    pub fn inverse_transform(&self, scaled: &[f64]) -> Result<Vec<f64>> {
        if scaled.len() != self.n_features() {
            return Err(ServeError::ShapeMismatch(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                scaled.len()
            )));
        }
        Ok(scaled
            .iter()
            .enumerate()
            .map(|(i, y)| {
                let (scale, min) = self.scale_and_min(i);
                (y - min) / scale
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler() -> MinMaxScaler {
        MinMaxScaler::new(
            vec!["age".to_string(), "gender".to_string(), "secs".to_string()],
            vec![18.0, 0.0, 5.0],
            vec![98.0, 2.0, 5.0],
        )
    }

    #[test]
    fn maps_fitted_range_onto_unit_interval() {
        let s = scaler();
        let out = s.transform(&[18.0, 2.0, 5.0]).unwrap();
        assert_eq!(out, vec![0.0, 1.0, 0.0]);

        let mid = s.transform(&[58.0, 1.0, 5.0]).unwrap();
        assert!((mid[0] - 0.5).abs() < 1e-12);
        assert!((mid[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn does_not_clamp_out_of_range_inputs() {
        let out = scaler().transform(&[138.0, -2.0, 6.0]).unwrap();
        assert!((out[0] - 1.5).abs() < 1e-12);
        assert!((out[1] + 1.0).abs() < 1e-12);
        // Constant feature uses unit range.
        assert!((out[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn nan_propagates() {
        let out = scaler().transform(&[f64::NAN, 1.0, 5.0]).unwrap();
        assert!(out[0].is_nan());
    }

    #[test]
    fn inverse_recovers_input() {
        let s = scaler();
        let input = [44.0, 1.0, 5.0];
        let back = s.inverse_transform(&s.transform(&input).unwrap()).unwrap();
        for (a, b) in input.iter().zip(&back) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn custom_feature_range() {
        let mut s = scaler();
        s.feature_range = (-1.0, 1.0);
        let out = s.transform(&[18.0, 2.0, 5.0]).unwrap();
        assert!((out[0] + 1.0).abs() < 1e-12);
        assert!((out[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_wrong_width() {
        assert!(matches!(
            scaler().transform(&[1.0]),
            Err(ServeError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn validates_bounds() {
        let mut s = scaler();
        s.data_max.pop();
        assert!(s.validate().is_err());

        let mut s = scaler();
        s.data_min[0] = 100.0;
        assert!(s.validate().unwrap_err().contains("age"));

        let mut s = scaler();
        s.feature_names[1] = "age".to_string();
        assert_eq!(s.validate().unwrap_err(), "feature_names contain duplicates");
    }

    #[test]
    fn feature_range_defaults_when_absent() {
        let s: MinMaxScaler = serde_json::from_str(
            r#"{"feature_names": ["age"], "data_min": [18.0], "data_max": [98.0]}"#,
        )
        .unwrap();
        assert_eq!(s.feature_range, (0.0, 1.0));
    }
}
