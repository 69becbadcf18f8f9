use std::future::Future;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::debug;

use crate::config::Config;
use crate::controllers::{AnalyzeController, Clipboard, CompareController, EnhanceController};
use crate::history::HistoryController;
use crate::intent::{Detection, IntentDetector};
use crate::models::{PromptRecord, VariationKind};
use crate::notify::ToastNotifier;
use crate::service::PromptService;
use crate::shared::Shared;
use crate::storage::{HistoryStore, KeyValueStore};
use crate::tabs::{Tab, TabRouter};

/// Every feature of the workbench, wired together.
///
/// Cloning is cheap and yields another handle onto the same state.
#[derive(Clone)]
pub struct Workbench {
    pub notifier: ToastNotifier,
    pub enhance: EnhanceController,
    pub analyze: AnalyzeController,
    pub compare: CompareController,
    pub history: HistoryController,
    tabs: Shared<TabRouter>,
    intent: Shared<IntentDetector>,
}

impl Workbench {
    pub fn new(
        config: &Config,
        service: Arc<dyn PromptService>,
        backend: Arc<dyn KeyValueStore>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        let notifier = ToastNotifier::new(config.toast_ttl());
        let store = HistoryStore::new(backend);
        let tabs = Shared::new(TabRouter::default());
        let intent = Shared::new(IntentDetector::new(
            Arc::clone(&service),
            config.debounce(),
            config.intent_min_chars,
        ));

        let enhance = EnhanceController::new(
            Arc::clone(&service),
            notifier.clone(),
            store.clone(),
            intent.clone(),
            clipboard,
        );
        let analyze = AnalyzeController::new(Arc::clone(&service), notifier.clone());

        let compare = {
            let enhance = enhance.clone();
            let tabs = tabs.clone();
            CompareController::new(
                Arc::clone(&service),
                notifier.clone(),
                Arc::new(move |kind: VariationKind, text: &str| {
                    debug!(%kind, "variation moved to enhance");
                    enhance.fill_input(text);
                    tabs.with(|tabs| tabs.activate(Tab::Enhance));
                }),
            )
        };

        let history = {
            let enhance = enhance.clone();
            let tabs = tabs.clone();
            HistoryController::new(
                store,
                notifier.clone(),
                Arc::new(move |record: &PromptRecord| {
                    enhance.load(record);
                    tabs.with(|tabs| tabs.activate(Tab::Enhance));
                }),
            )
        };

        Self {
            notifier,
            enhance,
            analyze,
            compare,
            history,
            tabs,
            intent,
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.tabs.with(|tabs| tabs.active())
    }

    pub fn activate(&self, tab: Tab) {
        self.tabs.with(|tabs| tabs.activate(tab));
    }

    pub fn intent_deadline(&self) -> Option<Instant> {
        self.intent.with(|intent| intent.deadline())
    }

    /// The detection to run if the idle timer has elapsed at `now`.
    pub fn poll_intent(&self, now: Instant) -> Option<impl Future<Output = Detection> + Send + 'static> {
        self.intent.with(|intent| {
            let ticket = intent.poll(now)?;
            Some(intent.detect(ticket))
        })
    }

    /// Returns true if the intent badge changed.
    pub fn complete_intent(&self, detection: Detection) -> bool {
        self.intent.with(|intent| intent.complete(detection))
    }
}
