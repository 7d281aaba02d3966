//! Write a self-consistent random artifact set so the server can be run
//! without the training pipeline.
//!
//! Usage: `generate_sample [OUT_DIR]` (defaults to the current directory).

use airbnb_serve::config::{ArtifactsConfig, ModelConfig};
use airbnb_serve::ml::{BatchNorm1d, Linear, StateDict};
use airbnb_serve::{AirbnbNet, EncodingTable, LabelMapping, MinMaxScaler};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DESTINATIONS: [&str; 12] = [
    "AU", "CA", "DE", "ES", "FR", "GB", "IT", "NDF", "NL", "PT", "US", "other",
];

const CATEGORICAL: &[(&str, &[&str])] = &[
    ("gender", &["-unknown-", "FEMALE", "MALE", "OTHER"]),
    ("signup_method", &["basic", "facebook", "google"]),
    ("signup_flow", &["0", "1", "2", "3", "12", "23", "24", "25", "other"]),
    ("language", &["de", "en", "es", "fr", "it", "ko", "zh", "other"]),
    (
        "affiliate_channel",
        &["api", "content", "direct", "other", "sem-brand", "sem-non-brand", "seo"],
    ),
    ("affiliate_provider", &["bing", "craigslist", "direct", "facebook", "google", "other"]),
    (
        "first_affiliate_tracked",
        &["linked", "omg", "tracked-other", "untracked", "other"],
    ),
    ("signup_app", &["Android", "Moweb", "Web", "iOS"]),
    (
        "first_device_type",
        &[
            "Android Phone",
            "Desktop (Other)",
            "Mac Desktop",
            "Windows Desktop",
            "iPad",
            "iPhone",
        ],
    ),
    (
        "first_browser",
        &["-unknown-", "Chrome", "Firefox", "IE", "Mobile Safari", "Safari", "other"],
    ),
];

/// (name, min, max) for integer-valued features.
const NUMERIC: &[(&str, i64, i64)] = &[
    ("age", 18, 100),
    ("hour_first_active", 0, 23),
    ("day_first_active", 1, 31),
    ("weekday_first_active", 0, 6),
    ("month_first_active", 1, 12),
    ("year_first_active", 2009, 2014),
    ("day_account_created", 1, 31),
    ("weekday_account_created", 0, 6),
    ("month_account_created", 1, 12),
    ("year_account_created", 2010, 2014),
];

const HIDDEN_SIZE: usize = 64;
const ROWS: usize = 500;

fn linear(rng: &mut StdRng, in_dim: usize, out_dim: usize) -> Linear {
    let bound = 1.0 / (in_dim as f32).sqrt();
    Linear {
        weight: (0..out_dim)
            .map(|_| (0..in_dim).map(|_| rng.gen_range(-bound..bound)).collect())
            .collect(),
        bias: (0..out_dim).map(|_| rng.gen_range(-bound..bound)).collect(),
    }
}

fn batch_norm(rng: &mut StdRng, features: usize) -> BatchNorm1d {
    BatchNorm1d {
        weight: (0..features).map(|_| rng.gen_range(0.8..1.2)).collect(),
        bias: (0..features).map(|_| rng.gen_range(-0.1..0.1)).collect(),
        running_mean: (0..features).map(|_| rng.gen_range(-0.2..0.2)).collect(),
        running_var: (0..features).map(|_| rng.gen_range(0.5..1.5)).collect(),
        eps: 1e-5,
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, payload).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let out = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let paths = ArtifactsConfig::default().rooted_at(&out);
    let mut rng = StdRng::seed_from_u64(42);

    let feature_names: Vec<String> = CATEGORICAL
        .iter()
        .map(|(name, _)| name.to_string())
        .chain(NUMERIC.iter().map(|(name, _, _)| name.to_string()))
        .collect();

    let model = ModelConfig {
        input_size: feature_names.len(),
        hidden_size: HIDDEN_SIZE,
        output_size: DESTINATIONS.len(),
    };

    // Codes follow list position.
    let encodings = EncodingTable::new(
        CATEGORICAL
            .iter()
            .map(|(name, categories)| {
                let codes = categories
                    .iter()
                    .enumerate()
                    .map(|(code, category)| (category.to_string(), code as i64))
                    .collect::<BTreeMap<_, _>>();
                (name.to_string(), codes)
            })
            .collect(),
    );

    let (data_min, data_max): (Vec<f64>, Vec<f64>) = CATEGORICAL
        .iter()
        .map(|(_, categories)| (0.0, (categories.len() - 1) as f64))
        .chain(NUMERIC.iter().map(|(_, lo, hi)| (*lo as f64, *hi as f64)))
        .unzip();
    let scaler = MinMaxScaler::new(feature_names.clone(), data_min, data_max);

    let labels = LabelMapping::new(
        DESTINATIONS
            .iter()
            .enumerate()
            .map(|(i, label)| (i, label.to_string()))
            .collect(),
    );

    let params = StateDict {
        fc1: linear(&mut rng, model.input_size, model.hidden_size),
        bn1: batch_norm(&mut rng, model.hidden_size),
        fc2: linear(&mut rng, model.hidden_size, model.hidden_size),
        bn2: batch_norm(&mut rng, model.hidden_size),
        fc3: linear(&mut rng, model.hidden_size, model.output_size),
        metadata: serde_json::json!({"version": "0.1.0", "source": "generate_sample", "seed": 42}),
    };
    // Refuse to write weights the server would reject.
    AirbnbNet::from_state_dict(model, params.clone())?;

    if let Some(parent) = paths.dataset.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(&paths.dataset)
        .with_context(|| format!("creating {}", paths.dataset.display()))?;
    writer.write_record(&feature_names)?;
    for _ in 0..ROWS {
        let mut record: Vec<String> = Vec::with_capacity(feature_names.len());
        for (_, categories) in CATEGORICAL {
            record.push(categories[rng.gen_range(0..categories.len())].to_string());
        }
        for (_, lo, hi) in NUMERIC {
            record.push(rng.gen_range(*lo..=*hi).to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;

    write_json(&paths.model, &params)?;
    write_json(&paths.mappings, &labels)?;
    write_json(&paths.encoder, &encodings)?;
    write_json(&paths.scaler, &scaler)?;

    println!("Wrote sample artifacts under {}", out.display());
    println!(
        "[model]\ninput_size = {}\nhidden_size = {}\noutput_size = {}",
        model.input_size, model.hidden_size, model.output_size
    );
    Ok(())
}
