pub mod series;
pub mod snapshot;

pub use series::SeriesStore;
pub use snapshot::{CollectionStatus, DataQuality, MarketSummary, SnapshotReport, MAX_SNAPSHOTS};
