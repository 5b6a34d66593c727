pub mod adapters;
pub mod normalize;
pub mod orchestrator;

pub use adapters::{
    ApifyAdsAdapter, ApifyShoppingAdapter, FixtureAdapter, SerperShoppingAdapter, SourceAdapter,
};
pub use normalize::{normalize_record, RawRecord};
pub use orchestrator::{ScrapeOrchestrator, ScrapeReport};
