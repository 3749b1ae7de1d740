//! Prometheus recorder and textfile output
//!
//! The crawler is a batch job, so instead of serving `/metrics` it renders the
//! exposition once at exit for node-exporter's textfile collector. Metric
//! names are defined by `reddit_client::metrics`.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")
}

/// Render all metrics to `path`.
///
/// Writes a sibling temp file first and renames it over `path`, so the
/// collector never reads a half-written file.
pub fn write_textfile(handle: &PrometheusHandle, path: &Path) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    std::fs::write(tmp, handle.render())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(tmp, path)
        .with_context(|| format!("failed to move metrics into {}", path.display()))?;
    Ok(())
}
