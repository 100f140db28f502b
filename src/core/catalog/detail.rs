// ─── Train Detail View ───
// Everything the detail panel shows for the selected train, derived on
// demand from the record and the chosen version.

use serde::Serialize;

use super::image::build_image_url;
use super::model::Train;
use crate::core::release::{CountMismatch, ReleaseLinks};

/// Fallback version label used in the suggested filename.
const LATEST_LABEL: &str = "latest";

/// One entry of the version picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionLink {
    pub version: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainDetail {
    pub id: u64,
    pub name: String,
    pub image_url: Option<String>,
    pub regions: Vec<&'static str>,
    pub features: Vec<&'static str>,
    pub description: Option<String>,
    pub download_pass: Option<String>,
    pub versions: Vec<String>,
    pub version_links: Vec<VersionLink>,
    pub current_version: Option<String>,
    pub download_url: Option<String>,
    pub download_available: bool,
    pub mismatch: Option<CountMismatch>,
    pub has_terms: bool,
    pub suggested_filename: String,
}

impl TrainDetail {
    /// `session_cache_bust` is used only when the record carries no image
    /// timestamp.
    pub fn build(
        train: &Train,
        base_url: &str,
        current_version: Option<&str>,
        session_cache_bust: Option<i64>,
    ) -> Self {
        let releases = ReleaseLinks::parse(train.ver.as_deref(), train.download_link.as_deref());
        let download_url = releases.resolve(current_version).map(str::to_string);

        let cache_bust = train
            .cache_bust()
            .map(ToString::to_string)
            .or_else(|| session_cache_bust.map(|ms| ms.to_string()));

        Self {
            id: train.id,
            name: train.name.clone(),
            image_url: build_image_url(
                base_url,
                train.header_image_path.as_deref(),
                cache_bust.as_deref(),
            ),
            regions: train.regions().into_iter().map(|r| r.label()).collect(),
            features: train.features().into_iter().map(|f| f.label()).collect(),
            description: train.description.clone().filter(|d| !d.trim().is_empty()),
            download_pass: train.download_pass.clone().filter(|p| !p.trim().is_empty()),
            versions: releases.versions().to_vec(),
            version_links: releases
                .pairs()
                .into_iter()
                .map(|(version, url)| VersionLink {
                    version: version.to_string(),
                    url: url.to_string(),
                })
                .collect(),
            current_version: current_version.map(str::to_string),
            download_available: download_url.is_some(),
            download_url,
            mismatch: releases.mismatch(),
            has_terms: train.terms_text().is_some(),
            suggested_filename: suggested_filename(&train.name, current_version),
        }
    }
}

pub fn suggested_filename(name: &str, version: Option<&str>) -> String {
    format!("{}-{}.zip", name, version.unwrap_or(LATEST_LABEL))
}
