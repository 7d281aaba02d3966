pub mod api;
pub mod artifacts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod labels;
pub mod logging;
pub mod ml;
pub mod preprocess;
pub mod service;

pub use artifacts::InferenceContext;
pub use config::AppConfig;
pub use dataset::{Dataset, Row, Value};
pub use error::{Result, ServeError};
pub use labels::LabelMapping;
pub use ml::{AirbnbNet, StateDict, Tensor};
pub use preprocess::{EncodingTable, MinMaxScaler, ProcessingPipeline};
pub use service::{Prediction, Predictor};
