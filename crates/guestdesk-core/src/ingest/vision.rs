use std::sync::Arc;

use tracing::debug;

use super::error::{ExtractionError, ExtractionResult, Stage};
use super::guard::CallGuard;
use super::normalizer::GenerativeNormalizer;
use crate::guest::GuestRecord;
use crate::providers::{OcrProvider, TextBlock};

/// Reads raw text with OCR and hands it to the [`GenerativeNormalizer`].
pub struct FallbackVisionExtractor {
    ocr: Arc<dyn OcrProvider>,
    normalizer: GenerativeNormalizer,
}

impl FallbackVisionExtractor {
    pub fn new(ocr: Arc<dyn OcrProvider>, normalizer: GenerativeNormalizer) -> Self {
        Self { ocr, normalizer }
    }

    pub async fn extract(&self, image: &[u8], guard: &CallGuard) -> ExtractionResult<GuestRecord> {
        let blocks = guard.run(Stage::Ocr, self.ocr.read_text(image)).await?;
        let text = join_lines(&blocks);

        if text.trim().is_empty() {
            return Err(ExtractionError::NoData { stage: Stage::Ocr });
        }

        debug!(blocks = blocks.len(), chars = text.chars().count(), "OCR text read");
        self.normalizer.normalize(&text, guard).await
    }
}

/// Every line of every block, in provider order, separated by single spaces.
#[must_use]
pub fn join_lines(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .flat_map(|block| block.lines.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
