//! Startup loading of every artifact the service needs.
//!
//! Everything is read once and bundled into an immutable [`InferenceContext`].
//! Cross-artifact shape checks happen here so a mismatched artifact set stops
//! the process before it accepts traffic.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::{ArtifactsConfig, ModelConfig};
use crate::dataset::Dataset;
use crate::error::{Result, ServeError};
use crate::labels::LabelMapping;
use crate::ml::AirbnbNet;
use crate::preprocess::{EncodingTable, MinMaxScaler, ProcessingPipeline};

/// Read-only state shared by every prediction.
#[derive(Debug, Clone)]
pub struct InferenceContext {
    pub dataset: Dataset,
    pub encodings: EncodingTable,
    pub scaler: MinMaxScaler,
    pub labels: LabelMapping,
    pub network: AirbnbNet,
}

impl InferenceContext {
    /// Assemble a context from already-loaded parts, checking they agree.
    pub fn new(
        dataset: Dataset,
        encodings: EncodingTable,
        scaler: MinMaxScaler,
        labels: LabelMapping,
        network: AirbnbNet,
    ) -> Result<Self> {
        let ctx = Self {
            dataset,
            encodings,
            scaler,
            labels,
            network,
        };
        ctx.check_consistency()?;
        Ok(ctx)
    }

    pub fn load(artifacts: &ArtifactsConfig, model: ModelConfig) -> Result<Self> {
        let network = AirbnbNet::from_file(&artifacts.model, model)?;
        info!(
            path = %artifacts.model.display(),
            metadata = %network.metadata(),
            "Loaded network weights"
        );

        let labels = LabelMapping::from_file(&artifacts.mappings)?;
        info!(
            path = %artifacts.mappings.display(),
            classes = labels.len(),
            "Loaded label mapping"
        );

        let encodings = EncodingTable::from_file(&artifacts.encoder)?;
        info!(
            path = %artifacts.encoder.display(),
            columns = encodings.columns().count(),
            "Loaded encoding table"
        );

        let scaler = MinMaxScaler::from_file(&artifacts.scaler)?;
        info!(
            path = %artifacts.scaler.display(),
            features = scaler.n_features(),
            "Loaded scaler"
        );

        let dataset = load_dataset(&artifacts.dataset)?;
        info!(
            path = %artifacts.dataset.display(),
            rows = dataset.len(),
            columns = dataset.columns().len(),
            "Loaded held-out dataset"
        );

        Self::new(dataset, encodings, scaler, labels, network)
    }

    pub fn pipeline(&self) -> ProcessingPipeline<'_> {
        ProcessingPipeline::new(&self.encodings, &self.scaler)
    }

    fn check_consistency(&self) -> Result<()> {
        let width = self.pipeline().output_width();
        if width != self.network.input_size() {
            return Err(ServeError::InvalidConfig(format!(
                "scaler produces {width} features but the network expects {}",
                self.network.input_size()
            )));
        }

        let mut columns: Vec<&str> = self
            .dataset
            .columns()
            .iter()
            .map(String::as_str)
            .collect();
        let mut features: Vec<&str> = self
            .scaler
            .feature_names
            .iter()
            .map(String::as_str)
            .collect();
        columns.sort_unstable();
        features.sort_unstable();
        if columns != features {
            return Err(ServeError::InvalidConfig(format!(
                "dataset columns {:?} do not match scaler features {:?}",
                self.dataset.columns(),
                self.scaler.feature_names
            )));
        }

        if self.dataset.columns() != self.scaler.feature_names.as_slice() {
            debug!(
                dataset = ?self.dataset.columns(),
                scaler = ?self.scaler.feature_names,
                "dataset column order differs from scaler order; rows are realigned"
            );
        }

        // An uncovered class only fails the requests that predict it.
        if let Err(reason) = self.labels.validate(self.network.output_size()) {
            warn!(%reason, "label mapping does not cover every class");
        }

        let ambiguous = self.encodings.ambiguous_columns();
        if !ambiguous.is_empty() {
            warn!(columns = ?ambiguous, "encoding table has non-unique codes");
        }

        Ok(())
    }
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    let dataset = Dataset::from_csv(path)?;
    if dataset.is_empty() {
        return Err(ServeError::artifact(path, "dataset has no rows"));
    }
    Ok(dataset)
}
