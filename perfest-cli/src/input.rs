/// Reading contest definitions and rating lists.
use perfest_core::ContestInput;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

use crate::bail;

pub fn parse_contest(content: &str) -> Result<ContestInput, serde_json::Error> {
    serde_json::from_str(content)
}

/// Load a contest definition from a JSON file.
pub fn load_contest(path: &Path) -> ContestInput {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| bail(format!("Failed to read contest file {}: {e}", path.display())));
    parse_contest(&content)
        .unwrap_or_else(|e| bail(format!("Failed to parse contest file {}: {e}", path.display())))
}

/// Parse ratings as either a JSON array of numbers or plain text with one
/// rating per line. Blank lines and `#` comments are skipped.
pub fn parse_ratings(content: &str) -> Result<Vec<f64>, String> {
    let trimmed = content.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| format!("looks like JSON but failed to parse: {e}"));
    }
    trimmed
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.parse::<f64>().map_err(|_| format!("not a rating: \"{l}\"")))
        .collect()
}

/// Ratings from all sources: --ratings file, --rating flags, or stdin.
pub fn load_ratings(file: Option<&Path>, inline: &[f64]) -> Vec<f64> {
    let mut ratings = Vec::new();

    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| bail(format!("Failed to read ratings file {}: {e}", path.display())));
        ratings = parse_ratings(&content).unwrap_or_else(|e| bail(format!("{}: {e}", path.display())));
    }

    ratings.extend_from_slice(inline);

    if ratings.is_empty() {
        let mut stdin = io::stdin();
        if stdin.is_terminal() {
            bail("No ratings provided. Use --ratings <file>, --rating <value>, or pipe ratings via stdin.");
        }
        let mut content = String::new();
        stdin
            .read_to_string(&mut content)
            .unwrap_or_else(|e| bail(format!("Failed to read from stdin: {e}")));
        ratings = parse_ratings(&content).unwrap_or_else(|e| bail(format!("stdin: {e}")));
    }

    if let Some(bad) = ratings.iter().find(|r| !r.is_finite()) {
        bail(format!("Ratings must be finite, got {bad}"));
    }
    ratings
}
