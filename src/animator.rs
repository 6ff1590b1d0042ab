use crate::api::VideoBackend;
use crate::api::replicate::SVD_MODEL;
use crate::config::Config;
use crate::manifest::{FIGURES, Figure};
use crate::output::resolve_output_url;
use crate::payload::ModelInput;
use crate::{logi, logok, logw};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Terminal state of one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FigureOutcome {
    Saved(PathBuf),
    MissingImage(PathBuf),
    NoOutputUrl,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<(&'static str, FigureOutcome)>,
}

impl RunSummary {
    pub fn saved(&self) -> usize {
        self.count(|o| matches!(o, FigureOutcome::Saved(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FigureOutcome::MissingImage(_) | FigureOutcome::NoOutputUrl))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FigureOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&FigureOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

async fn file_exists(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

async fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create dir {}", path.display()))
}

/// Writes `bytes` verbatim to `path`, creating parent directories as needed.
pub async fn save_video(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }
    fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn display_path(cfg: &Config, path: &Path) -> String {
    pathdiff::diff_paths(path, &cfg.root_dir)
        .filter(|rel| !rel.starts_with(".."))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

async fn animate_figure(
    cfg: &Config,
    backend: &dyn VideoBackend,
    figure: &Figure,
    image_path: &Path,
) -> Result<FigureOutcome> {
    let input = ModelInput::from_image(image_path, &cfg.params).await?;
    let output = backend
        .run_model(SVD_MODEL, &input)
        .await
        .with_context(|| format!("Generation failed for {}", figure.name))?;

    let Some(url) = resolve_output_url(&output) else {
        logw(format!("No output URL returned for {}.", figure.name));
        return Ok(FigureOutcome::NoOutputUrl);
    };

    let out_path = cfg.output_dir.join(figure.output_file_name());
    let bytes = backend.fetch(&url).await?;
    save_video(&bytes, &out_path).await?;
    logok(format!("Saved {} to {}", figure.name, display_path(cfg, &out_path)));
    Ok(FigureOutcome::Saved(out_path))
}

pub async fn run_figures(
    cfg: &Config,
    backend: &dyn VideoBackend,
    figures: &[Figure],
) -> Result<RunSummary> {
    ensure_dir(&cfg.output_dir).await?;

    let mut summary = RunSummary::default();
    for figure in figures {
        let image_path = cfg.root_dir.join(figure.image);
        if !file_exists(&image_path).await {
            logw(format!("Skipping {}: missing {}.", figure.name, figure.image));
            summary
                .outcomes
                .push((figure.name, FigureOutcome::MissingImage(image_path)));
            continue;
        }

        logi(format!("Generating {} animation...", figure.name));
        tracing::debug!(figure = figure.name, prompt = figure.prompt, "submitting");
        let outcome = match animate_figure(cfg, backend, figure, &image_path).await {
            Ok(outcome) => outcome,
            Err(err) => {
                logw(format!("FAILED: {}: {:#}", figure.name, err));
                FigureOutcome::Failed(format!("{err:#}"))
            }
        };
        summary.outcomes.push((figure.name, outcome));
    }

    logi(format!(
        "All done. Saved: {}, skipped: {}, failed: {}",
        summary.saved(),
        summary.skipped(),
        summary.failed()
    ));
    Ok(summary)
}

/// Runs the whole manifest. Each figure is isolated: a failure is logged and
/// recorded, and the batch moves on.
pub async fn run_animations(cfg: &Config, backend: &dyn VideoBackend) -> Result<RunSummary> {
    run_figures(cfg, backend, FIGURES).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_video_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/out.mp4");

        save_video(b"first", &path).await.unwrap();
        save_video(b"second", &path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn summary_counts_by_outcome() {
        let summary = RunSummary {
            outcomes: vec![
                ("a", FigureOutcome::Saved(PathBuf::from("a.mp4"))),
                ("b", FigureOutcome::MissingImage(PathBuf::from("b.png"))),
                ("c", FigureOutcome::NoOutputUrl),
                ("d", FigureOutcome::Failed("boom".into())),
            ],
        };
        assert_eq!(summary.saved(), 1);
        assert_eq!(summary.skipped(), 2);
        assert_eq!(summary.failed(), 1);
    }
}
