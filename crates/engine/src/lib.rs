pub mod pipeline;
pub mod portfolio;
pub mod status;
pub mod training;

pub use pipeline::StrategyPipeline;
pub use portfolio::{Holding, PortfolioValuation, PositionValue};
pub use status::PipelineStatus;
pub use training::{derivable_examples, examples_from_series};
