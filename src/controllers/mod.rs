//! Per-feature orchestration on top of [`crate::lifecycle::RequestLifecycle`].

pub mod analyze;
pub mod compare;
pub mod enhance;

pub use analyze::{AnalyzeController, AnalyzeView, HeatmapView, MetricRow, SuggestionList};
pub use compare::{CompareController, CompareView, ComparisonView, UseVariation, VariationCard};
pub use enhance::{EnhanceController, EnhanceView, SaveOutcome};

/// Destination for the enhance view's copy action.
pub trait Clipboard: Send + Sync + 'static {
    fn set_text(&self, text: &str) -> anyhow::Result<()>;
}

/// The desktop clipboard via `arboard`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> anyhow::Result<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text)?;
        Ok(())
    }
}
