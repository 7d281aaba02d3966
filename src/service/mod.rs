pub mod predictor;

pub use predictor::{pick_index, predict, predict_row, Prediction, Predictor};
