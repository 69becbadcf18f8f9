use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::controllers::Clipboard;
use crate::error::Result;
use crate::intent::IntentDetector;
use crate::lifecycle::{ActionSpec, Outcome, RequestLifecycle, TriggerControl};
use crate::models::{Enhancement, PromptRecord};
use crate::notify::ToastNotifier;
use crate::service::PromptService;
use crate::shared::Shared;
use crate::storage::HistoryStore;

const ENHANCE: ActionSpec = ActionSpec {
    name: "enhance",
    empty_message: "Please enter a prompt to enhance",
    success_title: "Enhanced!",
    failure_message: "Failed to enhance prompt",
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnhanceView {
    pub input: String,
    pub output: String,
    pub output_visible: bool,
    /// Which model produced the current output. Replaced on every success.
    pub model_badge: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(PromptRecord),
    /// Input or output was blank; nothing was written.
    Skipped,
}

#[derive(Clone)]
pub struct EnhanceController {
    service: Arc<dyn PromptService>,
    lifecycle: RequestLifecycle,
    notifier: ToastNotifier,
    control: TriggerControl,
    view: Shared<EnhanceView>,
    intent: Shared<IntentDetector>,
    history: HistoryStore,
    clipboard: Arc<dyn Clipboard>,
}

impl EnhanceController {
    pub fn new(
        service: Arc<dyn PromptService>,
        notifier: ToastNotifier,
        history: HistoryStore,
        intent: Shared<IntentDetector>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self {
            service,
            lifecycle: RequestLifecycle::new(notifier.clone()),
            notifier,
            control: TriggerControl::new("Enhance Prompt", "Enhancing..."),
            view: Shared::default(),
            intent,
            history,
            clipboard,
        }
    }

    pub fn control(&self) -> TriggerControl {
        self.control.clone()
    }

    pub fn view(&self) -> EnhanceView {
        self.view.snapshot()
    }

    pub fn intent_badge(&self) -> Option<String> {
        self.intent.with(|intent| intent.badge().map(str::to_string))
    }

    /// User edit of the input; feeds intent detection.
    pub fn on_input(&self, text: &str, now: Instant) {
        self.view.with(|view| view.input = text.to_string());
        self.intent.with(|intent| intent.on_input(text, now));
    }

    /// Programmatic fill from another feature. Does not count as typing.
    pub fn fill_input(&self, text: &str) {
        self.view.with(|view| view.input = text.to_string());
        self.intent.with(|intent| intent.replace_text(text));
    }

    /// Shows a saved record as the current input/output pair.
    pub fn load(&self, record: &PromptRecord) {
        self.view.with(|view| {
            view.input = record.original.clone();
            view.output = record.enhanced.clone();
            view.output_visible = true;
            view.model_badge = None;
        });
        self.intent.with(|intent| intent.replace_text(&record.original));
    }

    pub async fn enhance(&self) -> Outcome {
        let input = self.view.with(|view| view.input.clone());
        let service = Arc::clone(&self.service);
        self.lifecycle
            .run(
                &ENHANCE,
                &self.control,
                &input,
                move |prompt| async move { service.enhance(&prompt).await },
                |enhancement| self.apply(enhancement),
            )
            .await
    }

    fn apply(&self, enhancement: Enhancement) -> Option<String> {
        let Enhancement {
            enhanced,
            improvement,
            model,
        } = enhancement;
        self.view.with(|view| {
            view.output = enhanced;
            view.output_visible = true;
            view.model_badge = model
                .as_ref()
                .map(|model| format!("Powered by {}", model.to_uppercase()));
        });
        let message = match (improvement, model) {
            (Some(points), Some(model)) => {
                format!("Quality improved by {points} points using {model}")
            }
            (Some(points), None) => format!("Quality improved by {points} points"),
            (None, Some(model)) => format!("Prompt enhanced using {model}"),
            (None, None) => "Prompt enhanced".to_string(),
        };
        Some(message)
    }

    /// Resets input and output and hides the intent badge.
    pub fn clear(&self) {
        self.view.with(|view| *view = EnhanceView::default());
        self.intent.with(|intent| intent.hide());
    }

    pub fn copy(&self) -> bool {
        let text = self.view.with(|view| view.output.clone());
        match self.clipboard.set_text(&text) {
            Ok(()) => {
                self.notifier
                    .success("Copied!", "Enhanced prompt copied to clipboard");
                true
            }
            Err(err) => {
                warn!(error = %err, "clipboard write failed");
                self.notifier.error("Error", "Clipboard is not available");
                false
            }
        }
    }

    /// Saves the current pair to history. Blank pairs are skipped without
    /// any notification.
    pub async fn save(&self) -> Result<SaveOutcome> {
        let (original, enhanced) = self
            .view
            .with(|view| (view.input.clone(), view.output.clone()));
        let Some(record) = PromptRecord::new(original, enhanced) else {
            debug!("nothing to save: input or enhanced output is empty");
            return Ok(SaveOutcome::Skipped);
        };
        if let Err(err) = self.history.append(record.clone()).await {
            warn!(error = %format!("{err:#}"), "failed to save prompt");
            self.notifier.error("Error", "Failed to save prompt");
            return Err(err.into());
        }
        self.notifier.success("Saved!", "Prompt saved to history");
        Ok(SaveOutcome::Saved(record))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::notify::ToastLevel;
    use crate::storage::MemoryStore;
    use crate::test_support::{FakeService, MemoryClipboard, ReadOnlyStore};

    struct Fixture {
        controller: EnhanceController,
        service: Arc<FakeService>,
        notifier: ToastNotifier,
        history: HistoryStore,
        clipboard: MemoryClipboard,
    }

    fn fixture_with(clipboard: MemoryClipboard) -> Fixture {
        let service = Arc::new(FakeService::default());
        let notifier = ToastNotifier::new(Duration::from_secs(60));
        let history = HistoryStore::new(Arc::new(MemoryStore::new()));
        let intent = Shared::new(IntentDetector::new(
            service.clone(),
            Duration::from_millis(1000),
            20,
        ));
        let controller = EnhanceController::new(
            service.clone(),
            notifier.clone(),
            history.clone(),
            intent,
            Arc::new(clipboard.clone()),
        );
        service.probe(controller.control());
        Fixture {
            controller,
            service,
            notifier,
            history,
            clipboard,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryClipboard::default())
    }

    #[tokio::test]
    async fn enhance_applies_output_and_model_badge() {
        let f = fixture();
        f.controller.on_input("  write a poem about autumn ", Instant::now());

        assert_eq!(f.controller.enhance().await, Outcome::Applied);

        let view = f.controller.view();
        assert!(view.output_visible);
        assert_eq!(view.output, "You are an expert. Write a poem about autumn.");
        assert_eq!(view.model_badge.as_deref(), Some("Powered by GEMINI"));
        assert_eq!(f.service.last_prompt().as_deref(), Some("write a poem about autumn"));
        assert_eq!(f.service.enabled_during_calls(), vec![false]);
        assert!(f.controller.control().is_enabled());
        assert_eq!(f.controller.control().label(), "Enhance Prompt");

        let toast = f.notifier.last().unwrap();
        assert_eq!(toast.title, "Enhanced!");
        assert_eq!(toast.message, "Quality improved by 3.5 points using gemini");
    }

    #[tokio::test]
    async fn model_badge_is_replaced_not_accumulated() {
        let f = fixture();
        f.controller.on_input("write a poem", Instant::now());
        f.controller.enhance().await;

        f.service.set_enhancement(Enhancement {
            enhanced: "Second".into(),
            improvement: None,
            model: Some("deepseek".into()),
        });
        f.controller.enhance().await;
        assert_eq!(
            f.controller.view().model_badge.as_deref(),
            Some("Powered by DEEPSEEK")
        );

        f.service.set_enhancement(Enhancement {
            enhanced: "Third".into(),
            improvement: None,
            model: None,
        });
        f.controller.enhance().await;
        assert_eq!(f.controller.view().model_badge, None);
    }

    #[tokio::test]
    async fn empty_input_sends_nothing() {
        let f = fixture();
        f.controller.on_input("   ", Instant::now());
        assert_eq!(f.controller.enhance().await, Outcome::Rejected);
        assert_eq!(f.service.total_calls(), 0);
        let toast = f.notifier.last().unwrap();
        assert_eq!(toast.title, "Empty Prompt");
        assert_eq!(toast.level, ToastLevel::Error);
    }

    #[tokio::test]
    async fn failure_keeps_previous_output() {
        let f = fixture();
        f.controller.on_input("write a poem", Instant::now());
        f.controller.enhance().await;
        let before = f.controller.view();

        f.service.fail_all();
        assert_eq!(f.controller.enhance().await, Outcome::Failed);
        assert_eq!(f.controller.view(), before);
        assert!(f.controller.control().is_enabled());
        assert_eq!(f.notifier.last().unwrap().message, "Failed to enhance prompt");
    }

    #[tokio::test]
    async fn save_without_enhancement_is_skipped() {
        let f = fixture();
        f.controller.on_input("write a poem", Instant::now());
        assert_eq!(f.controller.save().await.unwrap(), SaveOutcome::Skipped);
        assert!(f.history.list().await.unwrap().is_empty());
        assert!(f.notifier.last().is_none());
    }

    #[tokio::test]
    async fn save_prepends_record() {
        let f = fixture();
        f.controller.on_input("write a poem", Instant::now());
        f.controller.enhance().await;

        let SaveOutcome::Saved(record) = f.controller.save().await.unwrap() else {
            panic!("expected a saved record");
        };
        assert_eq!(record.original, "write a poem");
        assert_eq!(f.history.list().await.unwrap(), vec![record]);
        assert_eq!(f.notifier.last().unwrap().title, "Saved!");
    }

    #[tokio::test]
    async fn save_failure_is_reported() {
        let service = Arc::new(FakeService::default());
        let notifier = ToastNotifier::new(Duration::from_secs(60));
        let controller = EnhanceController::new(
            service.clone(),
            notifier.clone(),
            HistoryStore::new(Arc::new(ReadOnlyStore)),
            Shared::new(IntentDetector::new(service, Duration::from_millis(1000), 20)),
            Arc::new(MemoryClipboard::default()),
        );
        controller.on_input("write a poem", Instant::now());
        controller.enhance().await;

        let err = controller.save().await.unwrap_err();
        assert!(matches!(err, crate::error::WorkbenchError::Storage(_)));
        let toast = notifier.last().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, "Failed to save prompt");
    }

    #[tokio::test]
    async fn clear_resets_view_and_badge() {
        let f = fixture();
        f.service.set_intent("coding", "direct", 0.87);
        let t0 = Instant::now();
        f.controller.on_input("write a function that sorts numbers", t0);
        let ticket = f.controller.intent.with(|i| i.poll(t0 + Duration::from_secs(1))).unwrap();
        let detection = f.controller.intent.with(|i| i.detect(ticket)).await;
        f.controller.intent.with(|i| i.complete(detection));
        f.controller.enhance().await;
        assert!(f.controller.intent_badge().is_some());

        f.controller.clear();
        assert_eq!(f.controller.view(), EnhanceView::default());
        assert_eq!(f.controller.intent_badge(), None);
    }

    #[test]
    fn filled_input_is_what_pending_detection_uses() {
        let f = fixture();
        let t0 = Instant::now();
        f.controller.on_input("Write a function that sorts numbers", t0);
        f.controller.fill_input("Compose a haiku about the autumn sea please");

        let ticket = f.controller.intent.with(|i| i.poll(t0 + Duration::from_secs(1))).unwrap();
        assert_eq!(ticket.prompt, "Compose a haiku about the autumn sea please");
    }

    #[test]
    fn loaded_record_is_what_pending_detection_uses() {
        let f = fixture();
        let t0 = Instant::now();
        f.controller.on_input("Write a function that sorts numbers", t0);
        f.controller
            .load(&PromptRecord::new("Summarise this meeting transcript", "better").unwrap());

        let ticket = f.controller.intent.with(|i| i.poll(t0 + Duration::from_secs(1))).unwrap();
        assert_eq!(ticket.prompt, "Summarise this meeting transcript");
    }

    #[tokio::test]
    async fn loading_a_record_drops_the_model_badge() {
        let f = fixture();
        f.controller.on_input("write a poem about autumn", Instant::now());
        f.controller.enhance().await;
        assert!(f.controller.view().model_badge.is_some());

        f.controller.load(&PromptRecord::new("a", "better a").unwrap());
        let view = f.controller.view();
        assert_eq!(view.model_badge, None);
        assert_eq!(view.output, "better a");
    }

    #[test]
    fn copy_writes_output_to_clipboard() {
        let f = fixture();
        f.controller.load(&PromptRecord::new("a", "better a").unwrap());
        assert!(f.controller.copy());
        assert_eq!(f.clipboard.contents.snapshot().as_deref(), Some("better a"));
        assert_eq!(f.notifier.last().unwrap().title, "Copied!");
    }

    #[test]
    fn copy_reports_broken_clipboard() {
        let f = fixture_with(MemoryClipboard {
            broken: true,
            ..Default::default()
        });
        assert!(!f.controller.copy());
        assert_eq!(f.notifier.last().unwrap().level, ToastLevel::Error);
        assert_eq!(f.service.total_calls(), 0);
    }
}
