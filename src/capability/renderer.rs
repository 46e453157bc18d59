//! Page rasterization through the Poppler `pdftoppm` tool

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::{CapabilityError, PageRenderer, RenderedPages};

/// Renders PDF pages to PNG via `pdftoppm`
pub struct PdftoppmRenderer {
    tool_timeout: Duration,
}

impl PdftoppmRenderer {
    pub fn new(tool_timeout: Duration) -> Self {
        Self { tool_timeout }
    }

    /// True when the binary responds on this system
    pub fn probe() -> bool {
        StdCommand::new("pdftoppm").arg("-v").output().is_ok()
    }
}

#[async_trait]
impl PageRenderer for PdftoppmRenderer {
    async fn render(&self, path: &Path, dpi: u32) -> Result<RenderedPages, CapabilityError> {
        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("page");

        let mut cmd = Command::new("pdftoppm");
        cmd.arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .arg(path)
            .arg(&prefix);

        let output = timeout(self.tool_timeout, cmd.output())
            .await
            .map_err(|_| CapabilityError::Timeout {
                tool: "pdftoppm",
                seconds: self.tool_timeout.as_secs(),
            })??;

        if !output.status.success() {
            return Err(CapabilityError::Tool {
                tool: "pdftoppm",
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // pdftoppm names output page-<n>.png; order numerically, not
        // lexically, since padding width depends on the page count
        let mut numbered: Vec<(u32, PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(dir.path())? {
            let entry_path = entry?.path();
            if let Some(number) = page_number(&entry_path) {
                numbered.push((number, entry_path));
            }
        }
        numbered.sort_by_key(|(n, _)| *n);
        debug!(pages = numbered.len(), "rendered document");

        let pages = numbered.into_iter().map(|(_, p)| p).collect();
        Ok(RenderedPages::new(pages, Some(dir)))
    }
}

fn page_number(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    let rest = name.strip_prefix("page-")?.strip_suffix(".png")?;
    rest.parse().ok()
}
