//! # Report
//!
//! Turns analyzed records into an interactive Plotly figure and writes it
//! out as a standalone HTML page.
//!
//! ```text
//! PlotPoint[] + VarianceSummary ──► compose_figure ──► Figure
//!                                                         │
//!                                                         ▼
//!                                   export ──► vector_visualization.html
//!                                                         │
//!                                                         ▼
//!                                                  default browser
//! ```

pub mod error;
pub mod export;
pub mod figure;
pub mod text;

pub use error::{ReportError, Result};
pub use export::{DEFAULT_OUTPUT_FILE, ExportConfig, export, render_html};
pub use figure::{Figure, PlotPoint, VarianceSummary, compose_figure};
pub use text::{DEFAULT_MAX_LEN, truncate_text};
