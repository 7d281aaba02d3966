//! Inference-time preprocessing: target encoding, min-max scaling and
//! tensor conversion, applied in that fixed order.

pub mod encoding;
pub mod pipeline;
pub mod scaler;

pub use encoding::{EncodingTable, PassThrough};
pub use pipeline::{Preprocessed, ProcessingPipeline};
pub use scaler::MinMaxScaler;
