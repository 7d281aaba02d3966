use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Layer widths of the classifier. These are fixed at training time and must
/// agree with the weight file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ModelConfig {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Network weights (state dict JSON)
    pub model: PathBuf,
    /// Class index -> label name
    pub mappings: PathBuf,
    /// Categorical target-encoding table
    pub encoder: PathBuf,
    /// Fitted min-max scaler
    pub scaler: PathBuf,
    /// Held-out rows to draw predictions from
    pub dataset: PathBuf,
}

impl ArtifactsConfig {
    /// Resolve every relative path against `base`.
    pub fn rooted_at<P: AsRef<Path>>(&self, base: P) -> Self {
        let base = base.as_ref();
        let join = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                base.join(p)
            }
        };
        Self {
            model: join(&self.model),
            mappings: join(&self.mappings),
            encoder: join(&self.encoder),
            scaler: join(&self.scaler),
            dataset: join(&self.dataset),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("artifacts/model-0.1.0.json"),
            mappings: PathBuf::from("artifacts/mappings.json"),
            encoder: PathBuf::from("artifacts/target_encoder.json"),
            scaler: PathBuf::from("artifacts/scaler.json"),
            dataset: PathBuf::from("data/processed/test.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServiceConfig {
    /// Fixed seed for row selection. Unset means seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily-rotated log files
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let defaults = ArtifactsConfig::default();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("artifacts.model", path_default(&defaults.model))?
            .set_default("artifacts.mappings", path_default(&defaults.mappings))?
            .set_default("artifacts.encoder", path_default(&defaults.encoder))?
            .set_default("artifacts.scaler", path_default(&defaults.scaler))?
            .set_default("artifacts.dataset", path_default(&defaults.dataset))?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("AIRBNB_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (AIRBNB_SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("AIRBNB")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.model.input_size == 0 {
            errors.push("model.input_size must be > 0".to_string());
        }
        if self.model.hidden_size == 0 {
            errors.push("model.hidden_size must be > 0".to_string());
        }
        if self.model.output_size == 0 {
            errors.push("model.output_size must be > 0".to_string());
        }

        if self.server.port == 0 {
            errors.push("server.port must be non-zero".to_string());
        }

        if !matches!(
            self.logging.level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            errors.push(format!("unknown logging.level: {}", self.logging.level));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn path_default(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
