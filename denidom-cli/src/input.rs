//! Input files and output destinations

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use denidom_core::calculator::{validate_items, CalculatorOptions};
use denidom_core::EstimateItem;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Estimate JSON accepted by `calculate`, `analyze` and `export`
///
/// ```json
/// {"title": "Ремонт кухни", "items": [...], "options": {"include_vat": false}}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateFile {
    #[serde(default)]
    pub title: Option<String>,
    pub items: Vec<EstimateItem>,
    #[serde(default)]
    pub options: CalculatorOptions,
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Load an estimate and reject invalid items or rates
pub fn load_estimate(path: &Path) -> Result<EstimateFile> {
    let estimate: EstimateFile = read_json(path)?;
    estimate.options.validate()?;
    validate_items(&estimate.items)?;
    debug!("Loaded {} items from {}", estimate.items.len(), path.display());
    Ok(estimate)
}

/// Actual material consumption for M-29, keyed by material name
pub fn load_actuals(path: Option<&Path>) -> Result<HashMap<String, f64>> {
    match path {
        Some(path) => read_json(path),
        None => Ok(HashMap::new()),
    }
}

/// Write to `path`, or print to stdout when no path is given
///
/// Both destinations receive the same bytes; CSV already carries its CRLF.
pub fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
            debug!("Wrote {} bytes to {}", contents.len(), path.display());
        }
        None => emit(&mut io::stdout().lock(), contents).context("Failed to write to stdout")?,
    }
    Ok(())
}

fn emit(out: &mut impl Write, contents: &str) -> io::Result<()> {
    out.write_all(contents.as_bytes())?;
    out.flush()
}
