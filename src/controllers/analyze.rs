use std::sync::Arc;

use crate::lifecycle::{ActionSpec, Outcome, RequestLifecycle, TriggerControl};
use crate::models::{Metric, QualityAnalysis, Suggestion};
use crate::notify::ToastNotifier;
use crate::service::PromptService;
use crate::shared::Shared;

const ANALYZE: ActionSpec = ActionSpec {
    name: "analyze",
    empty_message: "Please enter a prompt to analyze",
    success_title: "Analyzed!",
    failure_message: "Failed to analyze prompt",
};

/// Shown when an analysis comes back with nothing to fix.
pub const NO_ISSUES: &str = "Your prompt looks great! No major issues found.";

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub metric: Metric,
    /// e.g. `7.5/10`
    pub label: String,
    /// Bar width as a fraction of the full bar.
    pub fill: f64,
}

impl MetricRow {
    fn new(metric: Metric, score: f64) -> Self {
        Self {
            metric,
            label: format!("{score}/10"),
            fill: (score / 10.0).clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionList {
    NoIssues,
    Items(Vec<Suggestion>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapView {
    pub overall: String,
    pub grade: String,
    pub metrics: Vec<MetricRow>,
    pub suggestions: SuggestionList,
}

impl From<QualityAnalysis> for HeatmapView {
    fn from(analysis: QualityAnalysis) -> Self {
        let metrics = Metric::ALL
            .into_iter()
            .map(|metric| MetricRow::new(metric, analysis.metrics.score(metric)))
            .collect();
        let suggestions = if analysis.suggestions.is_empty() {
            SuggestionList::NoIssues
        } else {
            SuggestionList::Items(analysis.suggestions)
        };
        Self {
            overall: analysis.overall.to_string(),
            grade: analysis.grade,
            metrics,
            suggestions,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzeView {
    pub input: String,
    /// `None` until the first successful analysis.
    pub results: Option<HeatmapView>,
}

#[derive(Clone)]
pub struct AnalyzeController {
    service: Arc<dyn PromptService>,
    lifecycle: RequestLifecycle,
    control: TriggerControl,
    view: Shared<AnalyzeView>,
}

impl AnalyzeController {
    pub fn new(service: Arc<dyn PromptService>, notifier: ToastNotifier) -> Self {
        Self {
            service,
            lifecycle: RequestLifecycle::new(notifier),
            control: TriggerControl::new("Analyze Quality", "Analyzing..."),
            view: Shared::default(),
        }
    }

    pub fn control(&self) -> TriggerControl {
        self.control.clone()
    }

    pub fn view(&self) -> AnalyzeView {
        self.view.snapshot()
    }

    pub fn set_input(&self, text: &str) {
        self.view.with(|view| view.input = text.to_string());
    }

    pub async fn analyze(&self) -> Outcome {
        let input = self.view.with(|view| view.input.clone());
        let service = Arc::clone(&self.service);
        self.lifecycle
            .run(
                &ANALYZE,
                &self.control,
                &input,
                move |prompt| async move { service.analyze(&prompt).await },
                |analysis| {
                    self.view
                        .with(|view| view.results = Some(HeatmapView::from(analysis)));
                    None
                },
            )
            .await
    }
}
