pub mod api;
pub mod detail;
pub mod image;
pub mod list;
pub mod model;
pub mod query;

pub use api::{TrainApi, TrainSource};
pub use detail::{TrainDetail, VersionLink};
pub use list::{ListState, LoadTicket, TrainCard, TrainList};
pub use model::{CacheBust, Feature, Region, Train};
pub use query::TrainQuery;
