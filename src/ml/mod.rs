//! Lightweight CPU inference for the destination classifier.

pub mod dense;
pub mod network;
pub mod tensor;

pub use dense::{BatchNorm1d, Linear};
pub use network::{argmax, AirbnbNet, StateDict};
pub use tensor::Tensor;
