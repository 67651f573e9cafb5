//! Export service: render once, then walk the delivery chain.

use super::render::RasterVerdictRenderer;
use super::strategies::{ClipboardStrategy, DownloadStrategy, ExportOutcome, ExportStrategy};
use super::view::VerdictView;
use crate::core::config::{ConfigValidator, ExportConfig};
use crate::core::errors::ExportError;
use crate::core::traits::{ClipboardSink, VerdictRenderer};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Renders verdict views and delivers them through an ordered list of
/// strategies.
pub struct ExportService {
    renderer: Arc<dyn VerdictRenderer>,
    strategies: Vec<Box<dyn ExportStrategy>>,
    scale: u32,
}

impl std::fmt::Debug for ExportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("ExportService")
            .field("strategies", &names)
            .field("scale", &self.scale)
            .finish()
    }
}

impl ExportService {
    /// Creates the standard chain: clipboard first, download as fallback.
    ///
    /// Fails with `ExportError::Config` when `config` does not validate.
    pub fn new(config: &ExportConfig, clipboard: Arc<dyn ClipboardSink>) -> Result<Self, ExportError> {
        config.validate()?;
        let renderer = RasterVerdictRenderer::from_config(config)?;
        Ok(Self {
            renderer: Arc::new(renderer),
            strategies: vec![
                Box::new(ClipboardStrategy::new(clipboard)),
                Box::new(DownloadStrategy::new(
                    config.download_dir.clone(),
                    config.file_prefix.clone(),
                )),
            ],
            scale: config.scale,
        })
    }

    /// Creates a service from explicit parts.
    pub fn with_parts(
        renderer: Arc<dyn VerdictRenderer>,
        strategies: Vec<Box<dyn ExportStrategy>>,
        scale: u32,
    ) -> Self {
        Self {
            renderer,
            strategies,
            scale,
        }
    }

    /// Renders `view` to an image at the configured scale.
    pub fn render(&self, view: &VerdictView) -> Result<image::RgbImage, ExportError> {
        self.renderer.render(view, self.scale)
    }

    /// Renders and delivers `view`.
    ///
    /// Never returns an error: a render failure, or the failure of every
    /// strategy, is reported as `ExportOutcome::Failed`.
    pub async fn export(&self, view: &VerdictView) -> ExportOutcome {
        let image = match self.render(view) {
            Ok(image) => image,
            Err(err) => {
                error!(error = %err, "verdict rendering failed");
                return ExportOutcome::Failed(err);
            }
        };

        let mut last_error = None;
        for strategy in &self.strategies {
            match strategy.deliver(&image, view).await {
                Ok(outcome) => {
                    info!(strategy = strategy.name(), "verdict exported");
                    return outcome;
                }
                Err(err) => {
                    warn!(strategy = strategy.name(), error = %err, "export strategy failed, trying next");
                    last_error = Some(err);
                }
            }
        }

        let last = last_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "no export strategies configured".to_string());
        error!(%last, "verdict export failed");
        ExportOutcome::Failed(ExportError::Exhausted { last })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::NoClipboard;
    use crate::domain::{
        ExtractionStatus, IdentityOutcome, KillCountOutcome, ProfileOutcome, Verdict,
    };
    use async_trait::async_trait;
    use image::RgbImage;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClipboard {
        writes: Mutex<Vec<(u32, u32)>>,
        deny: bool,
    }

    #[async_trait]
    impl ClipboardSink for RecordingClipboard {
        async fn write_image(&self, image: &RgbImage) -> Result<(), ExportError> {
            if self.deny {
                return Err(ExportError::clipboard_denied("NotAllowedError"));
            }
            self.writes
                .lock()
                .unwrap()
                .push((image.width(), image.height()));
            Ok(())
        }
    }

    struct FailingRenderer;

    impl VerdictRenderer for FailingRenderer {
        fn render(&self, _view: &VerdictView, _scale: u32) -> Result<RgbImage, ExportError> {
            Err(ExportError::render("canvas unavailable"))
        }
    }

    fn view() -> VerdictView {
        let verdict = Verdict::new(
            "Aeris",
            IdentityOutcome::evaluate("Aeris"),
            KillCountOutcome::new(10306, true, vec![998, 10306], 3000, ExtractionStatus::Recognized),
            ProfileOutcome::new(true, ExtractionStatus::Recognized),
        );
        VerdictView::from(&verdict)
    }

    fn service(dir: &std::path::Path, clipboard: Arc<dyn ClipboardSink>) -> ExportService {
        ExportService::with_parts(
            Arc::new(RasterVerdictRenderer::without_font()),
            vec![
                Box::new(ClipboardStrategy::new(clipboard)),
                Box::new(DownloadStrategy::new(dir, "verification")),
            ],
            2,
        )
    }

    #[tokio::test]
    async fn test_clipboard_success_copies_at_double_scale() {
        let dir = tempfile::tempdir().unwrap();
        let clipboard = Arc::new(RecordingClipboard::default());
        let outcome = service(dir.path(), clipboard.clone()).export(&view()).await;

        assert!(matches!(outcome, ExportOutcome::Copied));
        let writes = clipboard.writes.lock().unwrap().clone();
        assert_eq!(writes.len(), 1);
        let single = RasterVerdictRenderer::without_font().render(&view(), 1).unwrap();
        assert_eq!(writes[0], (single.width() * 2, single.height() * 2));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_denied_clipboard_falls_back_to_download() {
        let dir = tempfile::tempdir().unwrap();
        let clipboard = Arc::new(RecordingClipboard {
            deny: true,
            ..RecordingClipboard::default()
        });
        let outcome = service(dir.path(), clipboard).export(&view()).await;

        let path = match outcome {
            ExportOutcome::Downloaded(path) => path,
            other => panic!("expected a download, got {other:?}"),
        };
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("verification_Aeris_"));
        assert!(name.ends_with(".png"));
        let saved = image::open(&path).unwrap();
        assert!(saved.width() > 0);
    }

    #[tokio::test]
    async fn test_unsupported_clipboard_falls_back_to_download() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = service(dir.path(), Arc::new(NoClipboard)).export(&view()).await;
        assert!(matches!(outcome, ExportOutcome::Downloaded(_)));
    }

    #[tokio::test]
    async fn test_render_failure_is_failed() {
        let dir = tempfile::tempdir().unwrap();
        let clipboard = Arc::new(RecordingClipboard::default());
        let service = ExportService::with_parts(
            Arc::new(FailingRenderer),
            vec![
                Box::new(ClipboardStrategy::new(clipboard.clone())),
                Box::new(DownloadStrategy::new(dir.path(), "verification")),
            ],
            2,
        );

        let outcome = service.export(&view()).await;
        assert!(matches!(outcome, ExportOutcome::Failed(ExportError::Render { .. })));
        assert!(clipboard.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_every_strategy_failing_is_failed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let outcome = service(&missing, Arc::new(NoClipboard)).export(&view()).await;
        assert!(matches!(outcome, ExportOutcome::Failed(ExportError::Exhausted { .. })));
        assert!(!outcome.is_delivered());
    }

    #[tokio::test]
    async fn test_out_of_range_scale_never_renders() {
        let config = crate::core::config::VerificationConfig::from_json_str(
            r#"{"export": {"scale": 200000}}"#,
        )
        .unwrap();
        let err = ExportService::new(&config.export, Arc::new(NoClipboard)).unwrap_err();
        assert!(matches!(err, ExportError::Config { .. }));

        let dir = tempfile::tempdir().unwrap();
        let service = ExportService::with_parts(
            Arc::new(RasterVerdictRenderer::without_font()),
            vec![Box::new(DownloadStrategy::new(dir.path(), "verification"))],
            200_000,
        );
        let outcome = service.export(&view()).await;
        assert!(matches!(outcome, ExportOutcome::Failed(ExportError::Render { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_new_uses_config() {
        let config = ExportConfig {
            font_path: None,
            ..ExportConfig::default()
        };
        let service = ExportService::new(&config, Arc::new(NoClipboard)).unwrap();
        let debug = format!("{service:?}");
        assert!(debug.contains("clipboard"));
        assert!(debug.contains("download"));
    }
}
