pub mod analysis;
pub mod prompt;
pub mod variation;

pub use analysis::{Enhancement, IntentResult, Metric, Metrics, QualityAnalysis, Suggestion};
pub use prompt::PromptRecord;
pub use variation::{Recommendation, Variation, VariationKind, VariationSet, Variations};
