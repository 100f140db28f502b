// ─── Release Links ───
// Pairs the slash-delimited `ver` column with the `download_link` column.

use serde::Serialize;
use serde_json::Value;

/// Split a version list such as `"1.0/2.0/3.0"`. Blank entries are dropped.
pub fn split_versions(raw: Option<&str>) -> Vec<String> {
    raw.map(|v| {
        v.split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Split a download link list.
///
/// Accepts a JSON array literal, a `|`-delimited list, or one link per line.
/// A string starting with `[` that is not a valid JSON array falls back to
/// delimiter splitting.
pub fn split_links(raw: Option<&str>) -> Vec<String> {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Vec::new(),
    };

    if raw.starts_with('[') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) {
            return items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .filter(|s| !s.is_empty())
                .collect();
        }
    }

    let delimiter = if raw.contains('|') { '|' } else { '\n' };
    raw.split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Version and link counts when they disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountMismatch {
    pub versions: usize,
    pub links: usize,
}

/// Parsed versions and their download links for one train.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseLinks {
    versions: Vec<String>,
    links: Vec<String>,
}

impl ReleaseLinks {
    pub fn parse(ver: Option<&str>, download_link: Option<&str>) -> Self {
        Self {
            versions: split_versions(ver),
            links: split_links(download_link),
        }
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    /// Version preselected in the detail view.
    pub fn default_version(&self) -> Option<&str> {
        self.versions.first().map(String::as_str)
    }

    pub fn contains_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    /// Counts when both lists are non-empty and of different length.
    pub fn mismatch(&self) -> Option<CountMismatch> {
        let (v, l) = (self.versions.len(), self.links.len());
        (v > 0 && l > 0 && v != l).then_some(CountMismatch {
            versions: v,
            links: l,
        })
    }

    /// Download URL for `version`.
    ///
    /// With mismatched counts the pairing is unreliable, so every version
    /// maps to the first link. Unknown or absent versions also get the first
    /// link. `None` only when there are no links at all.
    pub fn resolve(&self, version: Option<&str>) -> Option<&str> {
        let first = self.links.first()?;
        let paired = version
            .filter(|_| self.versions.len() == self.links.len())
            .and_then(|v| self.versions.iter().position(|candidate| candidate == v))
            .and_then(|idx| self.links.get(idx));
        Some(paired.unwrap_or(first).as_str())
    }

    /// `(version, link)` pairs as offered in the version picker.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.versions
            .iter()
            .filter_map(|v| self.resolve(Some(v)).map(|link| (v.as_str(), link)))
            .collect()
    }
}
