use crate::config::GenerationParams;
use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInput {
    pub input_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion_bucket_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_length: Option<String>,
}

impl ModelInput {
    pub fn new(input_image: String, params: &GenerationParams) -> Self {
        Self {
            input_image,
            fps: params.fps,
            motion_bucket_id: params.motion_bucket_id,
            seed: params.seed,
            video_length: params.video_length.clone(),
        }
    }

    /// Reads the image at `path` into a data URI. The file handle is closed
    /// before this returns, on success and on error alike.
    pub async fn from_image(path: &Path, params: &GenerationParams) -> Result<Self> {
        let bytes = {
            let mut file = fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open image {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .await
                .with_context(|| format!("Failed to read image {}", path.display()))?;
            buf
        };

        Ok(Self::new(data_uri(path, &bytes), params))
    }
}

fn data_uri(path: &Path, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_for(path), STANDARD.encode(bytes))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_image_when_no_params() {
        let input = ModelInput::new("data:image/png;base64,AA==".into(), &GenerationParams::default());
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value, json!({"input_image": "data:image/png;base64,AA=="}));
    }

    #[test]
    fn present_params_are_merged() {
        let params = GenerationParams {
            fps: Some(10),
            motion_bucket_id: None,
            seed: Some(7),
            video_length: Some("14_frames_with_svd".into()),
        };
        let value = serde_json::to_value(ModelInput::new("img".into(), &params)).unwrap();
        assert_eq!(
            value,
            json!({
                "input_image": "img",
                "fps": 10,
                "seed": 7,
                "video_length": "14_frames_with_svd",
            })
        );
        assert!(value.get("motion_bucket_id").is_none());
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a")), "application/octet-stream");
    }

    #[tokio::test]
    async fn from_image_encodes_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let input = ModelInput::from_image(&path, &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(input.input_image, "data:image/png;base64,iVBORw==");
    }

    #[tokio::test]
    async fn from_image_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.png");
        let err = ModelInput::from_image(&path, &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("absent.png"));
    }
}
