//! Optical character recognition boundary

use crate::core::alias::AliasResolver;
use crate::core::extract::{ExtractOptions, extract_holdings};
use crate::core::rebalance::CurrentValues;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Progress callback receiving a percentage between 0 and 100.
pub type ProgressFn<'a> = dyn Fn(u8) + Send + Sync + 'a;

/// Turns an image into text. Recognition cannot be cancelled; callers that lose interest
/// simply drop the result.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &[u8], progress: &ProgressFn<'_>) -> Result<String>;
}

/// Recognizes `image` and extracts holdings from the text with the given options.
#[instrument(name = "ImageExtraction", skip_all, fields(bytes = image.len()))]
pub async fn extract_holdings_from_image(
    recognizer: &dyn TextRecognizer,
    image: &[u8],
    allowed: Option<&BTreeSet<String>>,
    resolver: &AliasResolver,
    options: &ExtractOptions,
    progress: &ProgressFn<'_>,
) -> Result<CurrentValues> {
    let text = recognizer
        .recognize(image, progress)
        .await
        .context("Text extraction failed")?;
    debug!(chars = text.len(), "Recognized text");

    Ok(extract_holdings(&text, allowed, resolver, options))
}
