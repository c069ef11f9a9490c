//! The slide assembly orchestrator.
//!
//! Sequences the separation stages for each page and packages the
//! result: text acquisition with source fallback, paragraph merging,
//! overlap resolution, graphic detection, text-vs-graphic arbitration,
//! and background reconstruction. Pages are independent; batches run
//! with bounded parallelism and the packaged sequence is re-sorted by
//! page number.

use crate::core::{MergeConfig, SepResult, SeparationConfig, SeparationError};
use crate::domain::{Degradation, PageStage, SlideLayers, SourceKind, TextSpan};
use crate::pipeline::stats::{SeparationStats, StatsManager};
use crate::processors::{
    collapse_overlaps, detect_graphics, filter_text_in_graphics, merge_paragraphs,
    reconstruct_background, text_occupancy_mask,
};
use crate::sources::{
    DocTextSource, OcrBackend, OcrTextSource, TextLayerProvider, VisionClient, analysis_to_spans,
};
use futures_util::stream::{self, StreamExt};
use image::RgbImage;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Builder for [`SlideSeparator`] instances.
///
/// The vision client is constructed from configuration alone; the local
/// OCR engine and the document text layer are external collaborators
/// plugged in here.
#[derive(Default)]
pub struct SlideSeparatorBuilder {
    config: SeparationConfig,
    ocr_backend: Option<Arc<dyn OcrBackend>>,
    text_layer: Option<Arc<dyn TextLayerProvider>>,
}

impl SlideSeparatorBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pipeline configuration.
    pub fn config(mut self, config: SeparationConfig) -> Self {
        self.config = config;
        self
    }

    /// Plugs in a local OCR engine.
    pub fn ocr_backend(mut self, backend: Arc<dyn OcrBackend>) -> Self {
        self.ocr_backend = Some(backend);
        self
    }

    /// Plugs in a document text layer provider.
    pub fn text_layer(mut self, provider: Arc<dyn TextLayerProvider>) -> Self {
        self.text_layer = Some(provider);
        self
    }

    /// Validates the configuration and builds the separator.
    pub fn build(self) -> SepResult<SlideSeparator> {
        self.config.validate()?;

        let vision = VisionClient::from_config(&self.config.vision)?;
        if vision.is_some() {
            info!("vision service configured as primary text source");
        }

        let ocr = self
            .ocr_backend
            .filter(|_| self.config.ocr.enabled)
            .map(OcrTextSource::new);
        let doc_text = self.text_layer.map(DocTextSource::new);

        Ok(SlideSeparator {
            config: self.config,
            vision,
            ocr,
            doc_text,
            stats: StatsManager::new(),
        })
    }
}

/// The slide layer separation engine.
///
/// One instance serves any number of pages; per-page state lives
/// entirely inside [`separate_page`](Self::separate_page).
pub struct SlideSeparator {
    config: SeparationConfig,
    vision: Option<VisionClient>,
    ocr: Option<OcrTextSource>,
    doc_text: Option<DocTextSource>,
    stats: StatsManager,
}

impl SlideSeparator {
    /// Creates a builder.
    pub fn builder() -> SlideSeparatorBuilder {
        SlideSeparatorBuilder::new()
    }

    /// The active configuration.
    pub fn config(&self) -> &SeparationConfig {
        &self.config
    }

    /// A snapshot of the run statistics.
    pub fn stats(&self) -> SeparationStats {
        self.stats.snapshot()
    }

    /// Separates one page image into its layers.
    ///
    /// Walks the page through the stage sequence in order, degrading
    /// gracefully where a stage cannot produce a full result. Only an
    /// unreadable (empty) input image is fatal for the page.
    pub async fn separate_page(
        &self,
        image: &RgbImage,
        page_number: usize,
    ) -> SepResult<SlideLayers> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            self.stats.record_failure();
            return Err(SeparationError::invalid_input(format!(
                "page {page_number}: empty input image"
            )));
        }

        info!(page = page_number, width, height, "separating page");
        let mut degradations = Vec::new();

        // RAW -> TEXT_EXTRACTED
        let (raw_spans, provenance, merge_config) =
            self.acquire_spans(image, page_number, &mut degradations).await;
        debug!(
            page = page_number,
            stage = %PageStage::TextExtracted,
            spans = raw_spans.len(),
            source = ?provenance,
            "stage complete"
        );

        // TEXT_EXTRACTED -> TEXT_RESOLVED
        let merged = merge_paragraphs(&raw_spans, &merge_config);
        let resolved = collapse_overlaps(&merged, &self.config.resolver);
        debug!(
            page = page_number,
            stage = %PageStage::TextResolved,
            paragraphs = resolved.len(),
            "stage complete"
        );

        // TEXT_RESOLVED -> GRAPHICS_DETECTED
        let text_mask = text_occupancy_mask(width, height, &resolved, &self.config.background);
        let graphics = detect_graphics(image, &text_mask, &resolved, &self.config.graphics);
        debug!(
            page = page_number,
            stage = %PageStage::GraphicsDetected,
            graphics = graphics.len(),
            "stage complete"
        );

        // GRAPHICS_DETECTED -> TEXT_ARBITRATED
        let final_spans = filter_text_in_graphics(&resolved, &graphics, &self.config.arbiter);
        debug!(
            page = page_number,
            stage = %PageStage::TextArbitrated,
            spans = final_spans.len(),
            "stage complete"
        );

        // TEXT_ARBITRATED -> BACKGROUND_CLEANED
        let watermark_region = self.config.watermark.resolve(width, height);
        let background = reconstruct_background(
            image,
            &text_mask,
            &graphics,
            &watermark_region,
            &self.config.background,
        );
        debug!(page = page_number, stage = %PageStage::BackgroundCleaned, "stage complete");

        // BACKGROUND_CLEANED -> PACKAGED
        for degradation in &degradations {
            warn!(
                page = page_number,
                stage = %degradation.stage,
                reason = %degradation.reason,
                "page degraded"
            );
        }
        self.stats.record_page(
            provenance == Some(SourceKind::Vision),
            matches!(
                provenance,
                Some(SourceKind::LocalOcr) | Some(SourceKind::DocumentText)
            ),
            !degradations.is_empty(),
        );

        Ok(SlideLayers {
            page_number,
            text_spans: final_spans,
            graphics,
            background,
            provenance,
            degradations,
        })
    }

    /// Separates a batch of pages with bounded parallelism.
    ///
    /// Page failures are isolated: each page yields its own `Result`.
    /// Pages may complete out of order internally; the returned sequence
    /// is sorted by page number.
    pub async fn separate_batch(
        &self,
        pages: Vec<(usize, RgbImage)>,
    ) -> Vec<(usize, SepResult<SlideLayers>)> {
        let limit = self.config.max_concurrent_pages.max(1);

        let mut results: Vec<(usize, SepResult<SlideLayers>)> =
            stream::iter(pages.into_iter().map(|(page_number, image)| async move {
                let result = self.separate_page(&image, page_number).await;
                if let Err(err) = &result {
                    warn!(page = page_number, error = %err, "page failed");
                }
                (page_number, result)
            }))
            .buffer_unordered(limit)
            .collect()
            .await;

        results.sort_by_key(|(page_number, _)| *page_number);
        results
    }

    /// Acquires raw text spans from the first source in the priority
    /// list that yields any.
    ///
    /// Each source gets one attempt per page. A source that is not
    /// plugged in is skipped silently; a configured source that fails or
    /// comes up empty records a degradation and the next source is
    /// tried.
    async fn acquire_spans(
        &self,
        image: &RgbImage,
        page_number: usize,
        degradations: &mut Vec<Degradation>,
    ) -> (Vec<TextSpan>, Option<SourceKind>, MergeConfig) {
        let (width, height) = image.dimensions();

        for source in &self.config.source_priority {
            match source {
                SourceKind::Vision => {
                    let Some(client) = &self.vision else {
                        continue;
                    };
                    let wait = Duration::from_secs(self.config.vision.timeout_secs);
                    match timeout(wait, client.analyze_page(image, page_number)).await {
                        Ok(Ok(Some(analysis))) => {
                            let spans = analysis_to_spans(
                                &analysis,
                                width,
                                height,
                                &self.config.watermark,
                            );
                            if spans.is_empty() {
                                degrade(degradations, "vision analysis contained no text elements");
                                continue;
                            }
                            return (spans, Some(SourceKind::Vision), self.config.vision.merge);
                        }
                        Ok(Ok(None)) => {
                            degrade(degradations, "vision service unavailable");
                        }
                        Ok(Err(err)) => {
                            degrade(degradations, format!("vision adapter error: {err}"));
                        }
                        Err(_) => {
                            degrade(
                                degradations,
                                format!(
                                    "vision service timed out after {}s",
                                    self.config.vision.timeout_secs
                                ),
                            );
                        }
                    }
                }
                SourceKind::LocalOcr => {
                    let Some(ocr) = &self.ocr else {
                        continue;
                    };
                    match ocr.extract(image, &self.config.watermark) {
                        Ok(spans) if !spans.is_empty() => {
                            return (spans, Some(SourceKind::LocalOcr), self.config.ocr.merge);
                        }
                        Ok(_) => {
                            degrade(degradations, "local OCR found no text");
                        }
                        Err(err) => {
                            degrade(degradations, format!("local OCR failed: {err}"));
                        }
                    }
                }
                SourceKind::DocumentText => {
                    let Some(doc_text) = &self.doc_text else {
                        continue;
                    };
                    match doc_text.extract(
                        page_number,
                        width,
                        height,
                        &self.config.doc_text,
                        &self.config.resolver,
                    ) {
                        Ok(spans) if !spans.is_empty() => {
                            return (
                                spans,
                                Some(SourceKind::DocumentText),
                                self.config.doc_text.merge,
                            );
                        }
                        Ok(_) => {
                            degrade(degradations, "document text layer is empty");
                        }
                        Err(err) => {
                            degrade(degradations, format!("document text layer failed: {err}"));
                        }
                    }
                }
            }
        }

        (Vec::new(), None, MergeConfig::strict())
    }
}

/// Records a text-acquisition degradation.
fn degrade(degradations: &mut Vec<Degradation>, reason: impl Into<String>) {
    degradations.push(Degradation {
        stage: PageStage::TextExtracted,
        reason: reason.into(),
    });
}
