//! Fakes shared by the unit tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::controllers::Clipboard;
use crate::error::RemoteError;
use crate::lifecycle::TriggerControl;
use crate::models::analysis::MetricScore;
use crate::models::variation::VariationQuality;
use crate::models::{
    Enhancement, IntentResult, Metrics, QualityAnalysis, Recommendation, Suggestion, Variation,
    VariationKind, VariationSet, Variations,
};
use crate::service::PromptService;
use crate::shared::Shared;
use crate::storage::KeyValueStore;

#[derive(Debug, Clone)]
struct Script {
    intent: IntentResult,
    enhancement: Enhancement,
    analysis: QualityAnalysis,
    comparison: VariationSet,
    fail: bool,
}

/// Scripted [`PromptService`] that counts calls and can record whether a
/// probed control was disabled while a call was running.
#[derive(Debug, Clone)]
pub struct FakeService {
    script: Shared<Script>,
    calls: Shared<HashMap<&'static str, usize>>,
    prompts: Shared<Vec<String>>,
    probe: Shared<Option<TriggerControl>>,
    enabled_during_call: Shared<Vec<bool>>,
}

impl Default for FakeService {
    fn default() -> Self {
        Self {
            script: Shared::new(Script {
                intent: IntentResult {
                    intent: "general".into(),
                    tone: "neutral".into(),
                    confidence: 0.5,
                },
                enhancement: Enhancement {
                    enhanced: "You are an expert. Write a poem about autumn.".into(),
                    improvement: Some(3.5),
                    model: Some("gemini".into()),
                },
                analysis: analysis(vec![Suggestion {
                    category: "Clarity".into(),
                    issue: "Prompt is too vague".into(),
                    fix: "Add specific details about what you want".into(),
                }]),
                comparison: comparison([6.0, 8.0, 7.0], VariationKind::Detailed),
                fail: false,
            }),
            calls: Shared::default(),
            prompts: Shared::default(),
            probe: Shared::default(),
            enabled_during_call: Shared::default(),
        }
    }
}

impl FakeService {
    pub fn set_intent(&self, intent: &str, tone: &str, confidence: f64) {
        self.script.with(|s| {
            s.intent = IntentResult {
                intent: intent.into(),
                tone: tone.into(),
                confidence,
            }
        });
    }

    pub fn set_enhancement(&self, enhancement: Enhancement) {
        self.script.with(|s| s.enhancement = enhancement);
    }

    pub fn set_analysis(&self, analysis: QualityAnalysis) {
        self.script.with(|s| s.analysis = analysis);
    }

    pub fn set_comparison(&self, comparison: VariationSet) {
        self.script.with(|s| s.comparison = comparison);
    }

    pub fn fail_all(&self) {
        self.script.with(|s| s.fail = true);
    }

    pub fn probe(&self, control: TriggerControl) {
        self.probe.with(|p| *p = Some(control));
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.with(|c| c.get(name).copied().unwrap_or(0))
    }

    pub fn total_calls(&self) -> usize {
        self.calls.with(|c| c.values().sum())
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.with(|p| p.last().cloned())
    }

    pub fn enabled_during_calls(&self) -> Vec<bool> {
        self.enabled_during_call.snapshot()
    }

    fn record<T>(
        &self,
        name: &'static str,
        prompt: &str,
        pick: impl FnOnce(&Script) -> T,
    ) -> Result<T, RemoteError> {
        self.calls.with(|c| *c.entry(name).or_default() += 1);
        self.prompts.with(|p| p.push(prompt.to_string()));
        if let Some(control) = self.probe.snapshot() {
            let enabled = control.is_enabled();
            self.enabled_during_call.with(|v| v.push(enabled));
        }
        self.script.with(|s| {
            if s.fail {
                Err(RemoteError::Status {
                    status: 503,
                    body: "unavailable".into(),
                })
            } else {
                Ok(pick(s))
            }
        })
    }
}

#[async_trait]
impl PromptService for FakeService {
    async fn detect_intent(&self, prompt: &str) -> Result<IntentResult, RemoteError> {
        self.record("detect_intent", prompt, |s| s.intent.clone())
    }

    async fn enhance(&self, prompt: &str) -> Result<Enhancement, RemoteError> {
        self.record("enhance", prompt, |s| s.enhancement.clone())
    }

    async fn analyze(&self, prompt: &str) -> Result<QualityAnalysis, RemoteError> {
        self.record("analyze", prompt, |s| s.analysis.clone())
    }

    async fn compare(&self, prompt: &str) -> Result<VariationSet, RemoteError> {
        self.record("compare", prompt, |s| s.comparison.clone())
    }
}

pub fn analysis(suggestions: Vec<Suggestion>) -> QualityAnalysis {
    let score = |score| MetricScore { score };
    QualityAnalysis {
        overall: 5.2,
        grade: "C".into(),
        metrics: Metrics {
            clarity: score(4.4),
            specificity: score(1.1),
            structure: score(8.0),
            context: score(3.0),
            constraints: score(6.0),
            output_format: score(10.0),
        },
        suggestions,
    }
}

pub fn comparison(scores: [f64; 3], best: VariationKind) -> VariationSet {
    let variation = |text: &str, overall: f64, model: Option<&str>| Variation {
        text: text.to_string(),
        length: text.chars().count(),
        quality: VariationQuality { overall },
        model: model.map(str::to_string),
    };
    VariationSet {
        variations: Variations {
            concise: variation("Write a short autumn poem.", scores[0], Some("gemini")),
            detailed: variation(
                "Write a 16-line poem about autumn leaves, using vivid imagery.",
                scores[1],
                Some("openai"),
            ),
            structured: variation("Task: poem\nTopic: autumn\nLength: 3 stanzas", scores[2], None),
        },
        recommendation: Recommendation {
            best_variation: best,
            reason: format!(
                "{} version has the highest quality score",
                best.base_label()
            ),
        },
    }
}

/// Clipboard that remembers what was written, or refuses every write.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    pub contents: Shared<Option<String>>,
    pub broken: bool,
}

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: &str) -> anyhow::Result<()> {
        if self.broken {
            anyhow::bail!("no clipboard available");
        }
        self.contents.with(|c| *c = Some(text.to_string()));
        Ok(())
    }
}

/// Key-value backend whose disk is full: reads see nothing, writes fail.
#[derive(Debug, Default)]
pub struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    async fn set(&self, key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("no space left on device writing {key}")
    }
}
