pub mod bootstrap;
pub mod catalog;
pub mod classifier;
pub mod comparison;
pub mod coordinator;
pub mod options;
pub mod pipeline;
pub mod resolver;
pub mod social;
pub mod synthesis;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use coordinator::{AnalysisCoordinator, AnalysisRequest, AnalysisStage, AnalysisTrace};
pub use options::PipelineOptions;
