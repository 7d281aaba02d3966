use airbnb_serve::{
    config::ModelConfig,
    ml::{BatchNorm1d, Linear, StateDict},
    AirbnbNet, Dataset, EncodingTable, InferenceContext, LabelMapping, MinMaxScaler,
};
use serde_json::Value;
use std::collections::BTreeMap;

fn identity_bn(n: usize) -> BatchNorm1d {
    BatchNorm1d {
        weight: vec![1.0; n],
        bias: vec![0.0; n],
        running_mean: vec![0.0; n],
        running_var: vec![1.0; n],
        eps: 0.0,
    }
}

fn identity(n: usize) -> Linear {
    Linear {
        weight: (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect(),
        bias: vec![0.0; n],
    }
}

/// Two features, two classes: whichever scaled feature is larger wins.
pub fn context(csv: &str, labels: &[(usize, &str)]) -> InferenceContext {
    let model = ModelConfig {
        input_size: 2,
        hidden_size: 2,
        output_size: 2,
    };
    let params = StateDict {
        fc1: identity(2),
        bn1: identity_bn(2),
        fc2: identity(2),
        bn2: identity_bn(2),
        fc3: identity(2),
        metadata: Value::Null,
    };
    let network = AirbnbNet::from_state_dict(model, params).unwrap();
    let encodings: EncodingTable =
        serde_json::from_str(r#"{"signup_method": {"basic": 0, "facebook": 1}}"#).unwrap();
    let scaler = MinMaxScaler::new(
        vec!["signup_method".to_string(), "age".to_string()],
        vec![0.0, 18.0],
        vec![1.0, 98.0],
    );
    let labels = LabelMapping::new(
        labels
            .iter()
            .map(|(i, l)| (*i, l.to_string()))
            .collect::<BTreeMap<_, _>>(),
    );
    let dataset = Dataset::from_csv_str(csv).unwrap();
    InferenceContext::new(dataset, encodings, scaler, labels, network).unwrap()
}
