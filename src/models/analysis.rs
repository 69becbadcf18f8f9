//! Ephemeral payloads returned by the enhancement service.
//!
//! None of these are persisted; each one lives only as "the latest result"
//! in the view that displays it.

use serde::Deserialize;

/// Coarse classification of what a prompt is for.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IntentResult {
    pub intent: String,
    pub tone: String,
    /// In `[0, 1]`.
    pub confidence: f64,
}

impl IntentResult {
    /// Text for the intent badge, e.g. `CODING • direct • 87% confident`.
    pub fn badge_text(&self) -> String {
        let percent = (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u32;
        format!(
            "{} • {} • {}% confident",
            self.intent.to_uppercase(),
            self.tone,
            percent
        )
    }
}

/// Result of the enhance endpoint, lifted out of the response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Enhancement {
    pub enhanced: String,
    pub improvement: Option<f64>,
    pub model: Option<String>,
}

/// The six fixed quality dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Clarity,
    Specificity,
    Structure,
    Context,
    Constraints,
    OutputFormat,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Clarity,
        Metric::Specificity,
        Metric::Structure,
        Metric::Context,
        Metric::Constraints,
        Metric::OutputFormat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Clarity => "clarity",
            Metric::Specificity => "specificity",
            Metric::Structure => "structure",
            Metric::Context => "context",
            Metric::Constraints => "constraints",
            Metric::OutputFormat => "output_format",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct MetricScore {
    pub score: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Metrics {
    pub clarity: MetricScore,
    pub specificity: MetricScore,
    pub structure: MetricScore,
    pub context: MetricScore,
    pub constraints: MetricScore,
    pub output_format: MetricScore,
}

impl Metrics {
    pub fn score(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Clarity => self.clarity.score,
            Metric::Specificity => self.specificity.score,
            Metric::Structure => self.structure.score,
            Metric::Context => self.context.score,
            Metric::Constraints => self.constraints.score,
            Metric::OutputFormat => self.output_format.score,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Suggestion {
    pub category: String,
    pub issue: String,
    pub fix: String,
}

/// Multi-metric quality breakdown ("heatmap") of a prompt.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct QualityAnalysis {
    pub overall: f64,
    pub grade: String,
    pub metrics: Metrics,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}
