// ─── Train List View ───
// Load state of the catalog list plus the cards rendered from it.

use serde::Serialize;
use tracing::{debug, warn};

use super::image::build_image_url;
use super::model::Train;
use super::query::TrainQuery;
use crate::core::error::ManagerResult;

/// What the list currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    Failed(String),
    Ready(Vec<Train>),
}

/// Identifies one outstanding fetch. Results carrying an older ticket are
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// A row of the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainCard {
    pub id: u64,
    pub name: String,
    pub image_url: Option<String>,
    pub regions: Vec<&'static str>,
    pub features: Vec<&'static str>,
}

impl TrainCard {
    pub fn from_train(train: &Train, base_url: &str) -> Self {
        Self {
            id: train.id,
            name: train.name.clone(),
            image_url: build_image_url(base_url, train.header_image_path.as_deref(), None),
            regions: train.regions().into_iter().map(|r| r.label()).collect(),
            features: train.features().into_iter().map(|f| f.label()).collect(),
        }
    }
}

#[derive(Debug)]
pub struct TrainList {
    state: ListState,
    generation: u64,
    mounted: bool,
}

impl Default for TrainList {
    fn default() -> Self {
        Self {
            state: ListState::Loading,
            generation: 0,
            mounted: false,
        }
    }
}

impl TrainList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Start a fetch: the list is mounted and shows the loading state.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.mounted = true;
        self.generation += 1;
        self.state = ListState::Loading;
        LoadTicket(self.generation)
    }

    /// Teardown. In-flight results are discarded when they arrive; the
    /// request itself keeps running.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    /// Apply a fetch result. Returns `false` when the result was stale.
    pub fn finish(&mut self, ticket: LoadTicket, result: ManagerResult<Vec<Train>>) -> bool {
        if !self.mounted || ticket.0 != self.generation {
            debug!("Discarding stale train list result (ticket {})", ticket.0);
            return false;
        }

        self.state = match result {
            Ok(trains) => ListState::Ready(trains),
            Err(e) => {
                warn!("Train list fetch failed: {}", e);
                ListState::Failed(e.to_string())
            }
        };
        true
    }

    /// Loaded trains; empty while loading or after a failure.
    pub fn trains(&self) -> &[Train] {
        match &self.state {
            ListState::Ready(trains) => trains.as_slice(),
            _ => &[],
        }
    }

    pub fn find(&self, id: u64) -> Option<&Train> {
        self.trains().iter().find(|t| t.id == id)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ListState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Cards matching `query`, in API order.
    pub fn cards(&self, base_url: &str, query: &TrainQuery) -> Vec<TrainCard> {
        query
            .apply(self.trains())
            .into_iter()
            .map(|t| TrainCard::from_train(t, base_url))
            .collect()
    }
}
