use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::rebin::model::RebinOptions;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load [`RebinOptions`] from a file.  Dispatch by extension.
///
/// Convenience loader for callers; it sits outside the rebinning engine,
/// which itself does no file I/O.
///
/// Supported formats:
/// * `.json` – `{ "method": "listmode", "warn_on_partial_overlap": false, "seed": 42 }`
///
/// Missing fields take their defaults.
pub fn load_options(path: &Path) -> Result<RebinOptions> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading options file {}", path.display()))?;
            parse_options(&text).with_context(|| format!("in {}", path.display()))
        }
        other => bail!("Unsupported options file extension: .{other}"),
    }
}

/// Parse [`RebinOptions`] from JSON text.
pub fn parse_options(text: &str) -> Result<RebinOptions> {
    let options: RebinOptions = serde_json::from_str(text).context("parsing rebin options JSON")?;
    if options.max_events == Some(0) {
        bail!("max_events must be positive when given");
    }
    Ok(options)
}
