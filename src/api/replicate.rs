use crate::api::VideoBackend;
use crate::config::Config;
use crate::logi;
use crate::output::ModelOutput;
use crate::payload::ModelInput;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const SVD_MODEL: &str = "stability-ai/stable-video-diffusion:3f0457e4619daac51203dedb472816fd4af51f3149fa7a9e0b5ffcf1b8172438";

const BODY_SNIPPET_CHARS: usize = 800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub owner: String,
    pub name: String,
    pub version: Option<String>,
}

impl ModelRef {
    pub fn parse(reference: &str) -> Result<Self> {
        let (path, version) = match reference.split_once(':') {
            Some((path, version)) => (path, Some(version)),
            None => (reference, None),
        };
        let (owner, name) = path
            .split_once('/')
            .with_context(|| format!("Invalid model reference (expected owner/name): {reference}"))?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            bail!("Invalid model reference (expected owner/name): {reference}");
        }
        if version.is_some_and(str::is_empty) {
            bail!("Invalid model reference (empty version): {reference}");
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            version: version.map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Aborted,
    #[serde(other)]
    Unknown,
}

impl PredictionStatus {
    fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled | Self::Aborted)
    }
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: PredictionStatus,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Value,
    urls: Option<PredictionUrls>,
}

impl Prediction {
    fn error_message(&self) -> String {
        match &self.error {
            Value::Null => "no error message".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct CreatePrediction<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    input: &'a ModelInput,
}

pub struct ReplicateClient {
    http: Client,
    base_url: String,
    token: String,
    poll_interval: Duration,
}

impl ReplicateClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("figure-animations/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: cfg.api_base_url.clone(),
            token: cfg.api_token.clone(),
            poll_interval: cfg.poll_interval,
        })
    }

    async fn create_prediction(&self, model: &ModelRef, input: &ModelInput) -> Result<Prediction> {
        let url = match model.version {
            Some(_) => format!("{}/predictions", self.base_url),
            None => format!("{}/models/{}/{}/predictions", self.base_url, model.owner, model.name),
        };
        let body = CreatePrediction {
            version: model.version.as_deref(),
            input,
        };

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .context("Replicate create prediction request failed")?;

        read_prediction(resp, "create prediction").await
    }

    async fn get_prediction(&self, url: &str) -> Result<Prediction> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("Replicate get prediction request failed")?;

        read_prediction(resp, "get prediction").await
    }
}

#[async_trait]
impl VideoBackend for ReplicateClient {
    async fn run_model(&self, model: &str, input: &ModelInput) -> Result<ModelOutput> {
        let model = ModelRef::parse(model)?;
        let mut prediction = self.create_prediction(&model, input).await?;
        logi(format!("Prediction {} created ({:?})", prediction.id, prediction.status));

        let poll_url = prediction
            .urls
            .as_ref()
            .and_then(|urls| urls.get.clone())
            .unwrap_or_else(|| format!("{}/predictions/{}", self.base_url, prediction.id));

        while !prediction.status.is_terminal() {
            tokio::time::sleep(self.poll_interval).await;
            prediction = self.get_prediction(&poll_url).await?;
        }

        match prediction.status {
            PredictionStatus::Succeeded => Ok(ModelOutput::from(prediction.output)),
            status => bail!(
                "Prediction {} ended {:?}: {}",
                prediction.id,
                status,
                prediction.error_message()
            ),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(data) = url.strip_prefix("data:") {
            return decode_data_url(data);
        }

        let bytes = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Download request failed: {url}"))?
            .error_for_status()
            .with_context(|| format!("Download failed: {url}"))?
            .bytes()
            .await
            .with_context(|| format!("Download read failed: {url}"))?;
        Ok(bytes.to_vec())
    }
}

async fn read_prediction(resp: reqwest::Response, what: &str) -> Result<Prediction> {
    let status = resp.status();
    let raw = resp
        .text()
        .await
        .with_context(|| format!("Replicate {what} response read failed"))?;

    if !status.is_success() {
        bail!("Replicate {what} HTTP {}: {}", status.as_u16(), snippet(&raw));
    }

    serde_json::from_str(&raw).with_context(|| format!("Replicate {what} response parse failed"))
}

fn snippet(raw: &str) -> String {
    raw.chars().take(BODY_SNIPPET_CHARS).collect()
}

/// Decodes the part of a `data:` URL after the scheme. Only base64 payloads
/// are produced by the service.
fn decode_data_url(data: &str) -> Result<Vec<u8>> {
    let (meta, payload) = data.split_once(',').context("Malformed data URL")?;
    if !meta.ends_with(";base64") {
        bail!("Unsupported data URL encoding: {meta}");
    }
    STANDARD.decode(payload).context("Invalid base64 in data URL")
}
