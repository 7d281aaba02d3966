use airbnb_serve::api;
use airbnb_serve::config::AppConfig;
use airbnb_serve::logging::{init_logging, init_logging_simple};
use airbnb_serve::service::{predict_row, Prediction, Predictor};
use airbnb_serve::InferenceContext;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "airbnb-serve")]
#[command(version)]
#[command(about = "Serve random-record destination predictions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config directory (default.toml, {AIRBNB_ENV}.toml)
    #[arg(short, long, default_value = "config", env = "AIRBNB_CONFIG_DIR")]
    config: PathBuf,

    /// Resolve relative artifact paths against this directory
    #[arg(long)]
    root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Override server.port
        #[arg(short, long)]
        port: Option<u16>,
        /// Seed the row picker for reproducible sessions
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print one prediction and exit
    Predict {
        /// Seed the row picker
        #[arg(long)]
        seed: Option<u64>,
        /// Predict this row instead of a random one
        #[arg(long, conflicts_with = "seed")]
        row: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = AppConfig::load_from(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(root) = &cli.root {
        cfg.artifacts = cfg.artifacts.rooted_at(root);
    }

    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        seed: None,
    }) {
        Commands::Serve { port, seed } => {
            if let Some(port) = port {
                cfg.server.port = port;
            }
            if seed.is_some() {
                cfg.service.seed = seed;
            }
            init_logging(&cfg.logging);
            run_server(cfg).await
        }
        Commands::Predict { seed, row } => {
            init_logging_simple();
            run_predict(cfg, seed, row)
        }
    }
}

fn validate(cfg: &AppConfig) -> Result<()> {
    if let Err(errors) = cfg.validate() {
        for e in &errors {
            error!("Config: {}", e);
        }
        bail!("invalid configuration: {}", errors.join("; "));
    }
    Ok(())
}

async fn run_server(cfg: AppConfig) -> Result<()> {
    validate(&cfg)?;

    let ctx = InferenceContext::load(&cfg.artifacts, cfg.model).context("loading artifacts")?;
    let predictor = Arc::new(Predictor::new(Arc::new(ctx), cfg.service.seed));
    if let Some(seed) = cfg.service.seed {
        info!(seed, "Row picker seeded");
    }

    api::start_server_with_shutdown(
        predictor,
        &cfg.server.host,
        cfg.server.port,
        shutdown_signal(),
    )
    .await?;

    info!("Shutdown complete");
    Ok(())
}

fn run_predict(cfg: AppConfig, seed: Option<u64>, row: Option<usize>) -> Result<()> {
    let prediction = predict_once(&cfg, seed, row)?;

    println!("{}", prediction.display_row);
    println!("Predicted destination: {}", prediction.label);
    Ok(())
}

/// One prediction for `row`, or for a row picked with `seed` (falling back to
/// `service.seed`).
fn predict_once(cfg: &AppConfig, seed: Option<u64>, row: Option<usize>) -> Result<Prediction> {
    validate(cfg)?;

    let ctx = Arc::new(
        InferenceContext::load(&cfg.artifacts, cfg.model).context("loading artifacts")?,
    );
    let prediction = match row {
        Some(index) => predict_row(&ctx, index)?,
        None => Predictor::new(ctx, seed.or(cfg.service.seed)).predict_random()?,
    };
    Ok(prediction)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airbnb_serve::config::{
        ArtifactsConfig, LoggingConfig, ModelConfig, ServerConfig, ServiceConfig,
    };
    use airbnb_serve::ml::{BatchNorm1d, Linear, StateDict};
    use airbnb_serve::ServeError;
    use std::path::Path;

    fn identity(n: usize) -> Linear {
        Linear {
            weight: (0..n)
                .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
                .collect(),
            bias: vec![0.0; n],
        }
    }

    fn identity_bn(n: usize) -> BatchNorm1d {
        BatchNorm1d {
            weight: vec![1.0; n],
            bias: vec![0.0; n],
            running_mean: vec![0.0; n],
            running_var: vec![1.0; n],
            eps: 0.0,
        }
    }

    /// Two-feature artifact set: row 0 predicts NDF, row 1 predicts US.
    fn write_artifacts(dir: &Path) -> AppConfig {
        let artifacts = ArtifactsConfig::default().rooted_at(dir);
        std::fs::create_dir_all(artifacts.model.parent().unwrap()).unwrap();
        std::fs::create_dir_all(artifacts.dataset.parent().unwrap()).unwrap();

        let params = StateDict {
            fc1: identity(2),
            bn1: identity_bn(2),
            fc2: identity(2),
            bn2: identity_bn(2),
            fc3: identity(2),
            metadata: serde_json::Value::Null,
        };
        std::fs::write(&artifacts.model, serde_json::to_string(&params).unwrap()).unwrap();
        std::fs::write(&artifacts.mappings, r#"{"0": "NDF", "1": "US"}"#).unwrap();
        std::fs::write(
            &artifacts.encoder,
            r#"{"signup_method": {"basic": 0, "facebook": 1}}"#,
        )
        .unwrap();
        std::fs::write(
            &artifacts.scaler,
            r#"{"feature_names": ["signup_method", "age"], "data_min": [0, 18], "data_max": [1, 98]}"#,
        )
        .unwrap();
        std::fs::write(
            &artifacts.dataset,
            "signup_method,age\nfacebook,20\nbasic,90\nbasic,95\n",
        )
        .unwrap();

        AppConfig {
            model: ModelConfig {
                input_size: 2,
                hidden_size: 2,
                output_size: 2,
            },
            artifacts,
            server: ServerConfig::default(),
            service: ServiceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    fn scratch() -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "airbnb-cli-{}",
            uuid::Uuid::new_v4().simple()
        ))
    }

    #[test]
    fn predict_fixed_row() {
        let dir = scratch();
        let cfg = write_artifacts(&dir);

        let first = predict_once(&cfg, None, Some(0)).unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.label, "NDF");
        assert!(first.display_row.contains("facebook"));

        let second = predict_once(&cfg, None, Some(1)).unwrap();
        assert_eq!(second.label, "US");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn predict_row_out_of_range_fails() {
        let dir = scratch();
        let cfg = write_artifacts(&dir);

        let err = predict_once(&cfg, None, Some(7)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServeError>(),
            Some(ServeError::RowOutOfRange { index: 7, rows: 3 })
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn seeded_predict_is_reproducible() {
        let dir = scratch();
        let mut cfg = write_artifacts(&dir);

        let a = predict_once(&cfg, Some(42), None).unwrap();
        let b = predict_once(&cfg, Some(42), None).unwrap();
        assert_eq!(a.index, b.index);
        assert_eq!(a.label, b.label);

        // service.seed is used when no seed is given on the command line.
        cfg.service.seed = Some(42);
        let c = predict_once(&cfg, None, None).unwrap();
        assert_eq!(c.index, a.index);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn invalid_config_is_rejected_before_loading() {
        let dir = scratch();
        let mut cfg = write_artifacts(&dir);
        cfg.logging.level = "loud".to_string();

        let err = predict_once(&cfg, None, Some(0)).unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_artifacts_fail_predict() {
        let dir = scratch();
        let cfg = write_artifacts(&dir);
        std::fs::remove_file(&cfg.artifacts.mappings).unwrap();

        assert!(predict_once(&cfg, None, Some(0)).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["airbnb-serve"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config"));
    }

    #[test]
    fn cli_parses_predict_flags() {
        let cli = Cli::try_parse_from(["airbnb-serve", "predict", "--row", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Predict {
                row: Some(2),
                seed: None
            })
        ));

        let cli = Cli::try_parse_from(["airbnb-serve", "serve", "--port", "9000", "--seed", "5"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Serve {
                port: Some(9000),
                seed: Some(5)
            })
        ));
    }

    #[test]
    fn cli_rejects_row_with_seed() {
        assert!(
            Cli::try_parse_from(["airbnb-serve", "predict", "--row", "1", "--seed", "3"]).is_err()
        );
    }
}
