use std::sync::Arc;

use tracing::debug;

use crate::lifecycle::{ActionSpec, Outcome, RequestLifecycle, TriggerControl};
use crate::models::{VariationKind, VariationSet};
use crate::notify::ToastNotifier;
use crate::service::PromptService;
use crate::shared::Shared;

const COMPARE: ActionSpec = ActionSpec {
    name: "compare",
    empty_message: "Please enter a prompt to test",
    success_title: "Generated!",
    failure_message: "Failed to generate variations",
};

/// Hands a chosen variation's text to whoever owns the enhance feature.
pub type UseVariation = Arc<dyn Fn(VariationKind, &str) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct VariationCard {
    pub kind: VariationKind,
    pub text: String,
    pub length: usize,
    pub score: f64,
    pub model: Option<String>,
}

impl VariationCard {
    /// Base label plus the model annotation, composed fresh each time.
    pub fn label(&self) -> String {
        match &self.model {
            Some(model) => format!("{} ({})", self.kind.base_label(), model),
            None => self.kind.base_label().to_string(),
        }
    }

    pub fn score_label(&self) -> String {
        format!("{}/10", self.score)
    }

    pub fn length_label(&self) -> String {
        format!("{} chars", self.length)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    /// Always concise, detailed, structured in that order.
    pub cards: Vec<VariationCard>,
    pub banner: String,
}

impl From<VariationSet> for ComparisonView {
    fn from(set: VariationSet) -> Self {
        let cards = VariationKind::ALL
            .into_iter()
            .map(|kind| {
                let variation = set.variations.get(kind);
                VariationCard {
                    kind,
                    text: variation.text.clone(),
                    length: variation.length,
                    score: variation.quality.overall,
                    model: variation.model.clone(),
                }
            })
            .collect();
        let banner = format!(
            "Best: {} - {}",
            set.recommendation.best_variation.as_str().to_uppercase(),
            set.recommendation.reason
        );
        Self { cards, banner }
    }
}

impl ComparisonView {
    pub fn card(&self, kind: VariationKind) -> Option<&VariationCard> {
        self.cards.iter().find(|card| card.kind == kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompareView {
    pub input: String,
    pub comparison: Option<ComparisonView>,
}

#[derive(Clone)]
pub struct CompareController {
    service: Arc<dyn PromptService>,
    lifecycle: RequestLifecycle,
    notifier: ToastNotifier,
    control: TriggerControl,
    view: Shared<CompareView>,
    on_use: UseVariation,
}

impl CompareController {
    pub fn new(service: Arc<dyn PromptService>, notifier: ToastNotifier, on_use: UseVariation) -> Self {
        Self {
            service,
            lifecycle: RequestLifecycle::new(notifier.clone()),
            notifier,
            control: TriggerControl::new("Generate Variations", "Generating..."),
            view: Shared::default(),
            on_use,
        }
    }

    pub fn control(&self) -> TriggerControl {
        self.control.clone()
    }

    pub fn view(&self) -> CompareView {
        self.view.snapshot()
    }

    pub fn set_input(&self, text: &str) {
        self.view.with(|view| view.input = text.to_string());
    }

    pub async fn compare(&self) -> Outcome {
        let input = self.view.with(|view| view.input.clone());
        let service = Arc::clone(&self.service);
        self.lifecycle
            .run(
                &COMPARE,
                &self.control,
                &input,
                move |prompt| async move { service.compare(&prompt).await },
                |set| {
                    self.view
                        .with(|view| view.comparison = Some(ComparisonView::from(set)));
                    None
                },
            )
            .await
    }

    /// "Use this variation" on a card. Returns false when there is no
    /// comparison on screen yet.
    pub fn use_variation(&self, kind: VariationKind) -> bool {
        let text = self.view.with(|view| {
            view.comparison
                .as_ref()
                .and_then(|comparison| comparison.card(kind))
                .map(|card| card.text.clone())
        });
        let Some(text) = text else {
            debug!(%kind, "no comparison rendered, nothing to use");
            return false;
        };
        (self.on_use)(kind, &text);
        self.notifier
            .success("Loaded!", format!("{kind} variation loaded"));
        true
    }
}
