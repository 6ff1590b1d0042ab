use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const TOKEN_VAR: &str = "REPLICATE_API_TOKEN";
pub const FPS_VAR: &str = "SVD_FPS";
pub const MOTION_BUCKET_ID_VAR: &str = "SVD_MOTION_BUCKET_ID";
pub const SEED_VAR: &str = "SVD_SEED";
pub const VIDEO_LENGTH_VAR: &str = "SVD_VIDEO_LENGTH";
pub const BASE_URL_VAR: &str = "REPLICATE_BASE_URL";
pub const POLL_INTERVAL_VAR: &str = "REPLICATE_POLL_INTERVAL";

const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const ANIMATIONS_DIR: &str = "animations";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("REPLICATE_API_TOKEN is not set.")]
    MissingToken,
    #[error("Invalid integer for {name}: {value}")]
    InvalidInteger { name: &'static str, value: String },
    #[error("Invalid duration for {name}: {value}")]
    InvalidDuration { name: &'static str, value: String },
}

/// Optional model parameters. A `None` field is left out of the request so
/// the model's own default applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationParams {
    pub fps: Option<i64>,
    pub motion_bucket_id: Option<i64>,
    pub seed: Option<i64>,
    pub video_length: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub params: GenerationParams,
    pub root_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves the configuration through `lookup`. The credential is checked
    /// first, so a missing token is reported even if other values are bad.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = non_empty(&lookup, TOKEN_VAR).ok_or(ConfigError::MissingToken)?;

        let params = GenerationParams {
            fps: optional_int(&lookup, FPS_VAR)?,
            motion_bucket_id: optional_int(&lookup, MOTION_BUCKET_ID_VAR)?,
            seed: optional_int(&lookup, SEED_VAR)?,
            video_length: non_empty(&lookup, VIDEO_LENGTH_VAR),
        };

        let api_base_url = non_empty(&lookup, BASE_URL_VAR)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let poll_interval = match non_empty(&lookup, POLL_INTERVAL_VAR) {
            Some(value) => parse_seconds(&value).ok_or(ConfigError::InvalidDuration {
                name: POLL_INTERVAL_VAR,
                value,
            })?,
            None => DEFAULT_POLL_INTERVAL,
        };

        let root_dir = PathBuf::from(".");
        let output_dir = root_dir.join(ANIMATIONS_DIR);

        Ok(Self {
            api_token,
            api_base_url,
            poll_interval,
            params,
            root_dir,
            output_dir,
        })
    }

    /// Moves image lookup to `root`. The output dir follows unless it was set
    /// explicitly afterwards with [`Config::with_output_dir`].
    pub fn with_root_dir(mut self, root: impl AsRef<Path>) -> Self {
        self.root_dir = root.as_ref().to_path_buf();
        self.output_dir = self.root_dir.join(ANIMATIONS_DIR);
        self
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.is_empty())
}

fn optional_int<F>(lookup: &F, name: &'static str) -> Result<Option<i64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = non_empty(lookup, name) else {
        return Ok(None);
    };
    value
        .trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidInteger { name, value })
}

fn parse_seconds(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}
