pub mod axes;
pub mod cache;
pub mod cohort;
pub mod extract;
pub mod profile;
pub mod source;
pub mod stats;
pub mod trend;

pub use axes::{score_all, scorers, AxisScorer};
pub use cache::{CachedProfile, ProfileCache, ProfileService};
pub use extract::{DataUnavailable, FieldSeries, MatchWindow, MetricExtractor};
pub use source::{IngestionStatus, MatchSource, SourceError};
