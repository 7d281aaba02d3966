use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, ServeError};

/// Class index -> destination label (e.g. `0 -> "NDF"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMapping {
    labels: BTreeMap<usize, String>,
}

impl LabelMapping {
    pub fn new(labels: BTreeMap<usize, String>) -> Self {
        Self { labels }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServeError::artifact(path, e.to_string()))?;
        let mapping: Self = serde_json::from_str(&content)
            .map_err(|e| ServeError::artifact(path, e.to_string()))?;
        Ok(mapping)
    }

    pub fn label(&self, class: usize) -> Result<&str> {
        self.labels
            .get(&class)
            .map(String::as_str)
            .ok_or(ServeError::UnknownClass(class))
    }

    /// Every class in `0..output_size` must have a non-empty label.
    pub fn validate(&self, output_size: usize) -> std::result::Result<(), String> {
        for class in 0..output_size {
            match self.labels.get(&class) {
                None => return Err(format!("no label for class {class}")),
                Some(label) if label.trim().is_empty() => {
                    return Err(format!("empty label for class {class}"))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destinations() -> LabelMapping {
        serde_json::from_str(r#"{"0": "NDF", "1": "US", "2": "other", "3": "FR"}"#).unwrap()
    }

    #[test]
    fn every_class_maps_to_a_non_empty_label() {
        let mapping = destinations();
        mapping.validate(4).unwrap();
        for class in 0..4 {
            assert!(!mapping.label(class).unwrap().is_empty());
        }
        assert_eq!(mapping.label(1).unwrap(), "US");
    }

    #[test]
    fn unknown_class_is_an_error() {
        let mapping = destinations();
        assert!(matches!(mapping.label(9), Err(ServeError::UnknownClass(9))));
        assert!(mapping.validate(5).is_err());
    }

    #[test]
    fn blank_label_fails_validation() {
        let mut labels = BTreeMap::new();
        labels.insert(0, "NDF".to_string());
        labels.insert(1, "  ".to_string());
        let mapping = LabelMapping::new(labels);
        assert_eq!(mapping.validate(2).unwrap_err(), "empty label for class 1");
    }
}
