//! Optical character recognition through the `tesseract` tool

use std::path::Path;
use std::process::Command as StdCommand;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use super::{CapabilityError, OcrEngine};

/// Per-image OCR via `tesseract ... stdout`
pub struct TesseractOcr {
    languages: String,
    tool_timeout: Duration,
}

impl TesseractOcr {
    pub fn new(languages: String, tool_timeout: Duration) -> Self {
        Self {
            languages,
            tool_timeout,
        }
    }

    /// True when the binary responds on this system
    pub fn probe() -> bool {
        StdCommand::new("tesseract").arg("--version").output().is_ok()
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: &Path) -> Result<String, CapabilityError> {
        let mut cmd = Command::new("tesseract");
        cmd.arg(image).arg("stdout").arg("-l").arg(&self.languages);

        let output = timeout(self.tool_timeout, cmd.output())
            .await
            .map_err(|_| CapabilityError::Timeout {
                tool: "tesseract",
                seconds: self.tool_timeout.as_secs(),
            })??;

        if !output.status.success() {
            return Err(CapabilityError::Tool {
                tool: "tesseract",
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
