pub mod aggregator;
pub mod feature_engineer;
pub mod insights;
pub mod numeric_extractor;
pub mod rule_normalizer;

pub use aggregator::*;
pub use feature_engineer::*;
pub use insights::*;
pub use numeric_extractor::*;
pub use rule_normalizer::*;
