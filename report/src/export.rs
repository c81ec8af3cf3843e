//! Standalone HTML export.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ReportError, Result};
use crate::figure::{FIGURE_TITLE, Figure};

/// File name of the exported page, relative to the working directory.
pub const DEFAULT_OUTPUT_FILE: &str = "vector_visualization.html";

const TEMPLATE: &str = include_str!("../templates/figure.html");

/// Configuration for figure export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Where the HTML page is written. Existing files are overwritten.
    pub output_path: PathBuf,

    /// Whether to open the page in the default browser after writing it.
    pub open_browser: bool,
}

impl ExportConfig {
    /// Set the output path.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Enable or disable opening the browser.
    pub fn with_open_browser(mut self, open: bool) -> Self {
        self.open_browser = open;
        self
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            open_browser: true,
        }
    }
}

/// Render the figure as a self-contained HTML page.
pub fn render_html(figure: &Figure) -> Result<String> {
    let json = serde_json::to_string(figure)?;
    Ok(TEMPLATE
        .replace("{{TITLE}}", FIGURE_TITLE)
        .replace("{{FIGURE}}", &escape_script(&json)))
}

/// Keep stored text from terminating the surrounding `<script>` element.
///
/// The escapes are only valid inside JSON strings, which is the only place
/// these characters can appear in serialized JSON.
fn escape_script(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Write the figure to `config.output_path` and optionally open it.
///
/// Returns the path that was written. A browser that cannot be launched is
/// only logged since the page already exists on disk.
pub fn export(figure: &Figure, config: &ExportConfig) -> Result<PathBuf> {
    let html = render_html(figure)?;
    let path = config.output_path.clone();

    std::fs::write(&path, html).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    info!("Wrote visualization to {}", path.display());

    if config.open_browser {
        open_in_browser(&path);
    }

    Ok(path)
}

fn open_in_browser(path: &Path) {
    let target = match std::path::absolute(path) {
        Ok(absolute) => format!("file://{}", absolute.display()),
        Err(e) => {
            warn!("Could not resolve {}: {e}", path.display());
            return;
        }
    };

    match webbrowser::open(&target) {
        Ok(()) => info!("Opened {target} in the default browser"),
        Err(e) => warn!("Could not open a browser for {target}: {e}"),
    }
}
