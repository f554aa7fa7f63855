//! Retail product analytics: clean a product CSV, derive pricing metrics,
//! summarise by category and brand, and export the results.
//!
//! ```text
//! CSV -> RuleNormalizer -> FeatureEngineer -> Aggregator -> InsightExtractor
//!                                                  |
//!                           cleaned CSV, chart data JSON, console report
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod processor;
pub mod report;
pub mod storage;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::{AnalysisOutput, RetailPipeline};
