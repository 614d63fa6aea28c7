use crate::core::ocr::{ProgressFn, TextRecognizer};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Runs the `tesseract` binary over an in-memory image.
pub struct TesseractRecognizer {
    command: String,
    language: String,
}

impl TesseractRecognizer {
    pub fn new(command: &str, language: &str) -> Self {
        TesseractRecognizer {
            command: command.to_string(),
            language: language.to_string(),
        }
    }

    fn args(&self) -> Vec<&str> {
        // Block layout keeps each holding on one line; spacing matters for ticker/amount pairing.
        vec![
            "stdin",
            "stdout",
            "-l",
            &self.language,
            "--psm",
            "6",
            "-c",
            "preserve_interword_spaces=1",
        ]
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    #[instrument(name = "Tesseract", skip(self, image, progress), fields(bytes = image.len()))]
    async fn recognize(&self, image: &[u8], progress: &ProgressFn<'_>) -> Result<String> {
        progress(0);
        let mut child = Command::new(&self.command)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start `{}`", self.command))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(image)
                .await
                .context("Failed to send image to OCR engine")?;
        }

        let output = child
            .wait_with_output()
            .await
            .context("OCR engine did not finish")?;
        if !output.status.success() {
            bail!(
                "OCR engine exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(lines = text.lines().count(), "Recognized text");
        progress(100);
        Ok(text)
    }
}
