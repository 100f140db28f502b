use serde::{Deserialize, Serialize};

use super::model::{Feature, Region, Train};

/// Search box text plus badge filters.
///
/// Text matches name or description, case-insensitively. A train must carry
/// at least one of `regions` and every one of `features`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainQuery {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl TrainQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle().is_none() && self.regions.is_empty() && self.features.is_empty()
    }

    fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, train: &Train) -> bool {
        if let Some(needle) = self.needle() {
            let in_name = train.name.to_lowercase().contains(&needle);
            let in_description = train
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_name && !in_description {
                return false;
            }
        }

        if !self.regions.is_empty() && !self.regions.iter().any(|r| train.has_region(*r)) {
            return false;
        }

        self.features.iter().all(|f| train.has_feature(*f))
    }

    pub fn apply<'a>(&self, trains: &'a [Train]) -> Vec<&'a Train> {
        trains.iter().filter(|t| self.matches(t)).collect()
    }
}
