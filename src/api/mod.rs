use crate::output::ModelOutput;
use crate::payload::ModelInput;
use anyhow::Result;
use async_trait::async_trait;

pub mod replicate;

#[async_trait]
pub trait VideoBackend: Send + Sync {
    /// Blocks until the prediction for `owner/name[:version]` finishes.
    async fn run_model(&self, model: &str, input: &ModelInput) -> Result<ModelOutput>;

    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
