//! Background intent detection for the enhance input.
//!
//! Typing schedules a detection one idle period after the last keystroke.
//! Detection is a hint, so failures never reach the user.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::RemoteError;
use crate::models::IntentResult;
use crate::service::PromptService;

/// Holds at most one pending deadline; scheduling replaces it.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True exactly once per schedule, when `now` has reached the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A detection that has been dispatched and not yet completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionTicket {
    pub seq: u64,
    pub prompt: String,
}

#[derive(Debug)]
pub struct Detection {
    pub seq: u64,
    pub result: Result<IntentResult, RemoteError>,
}

pub struct IntentDetector {
    service: Arc<dyn PromptService>,
    debouncer: Debouncer,
    min_chars: usize,
    text: String,
    latest_seq: u64,
    badge: Option<String>,
}

impl IntentDetector {
    pub fn new(service: Arc<dyn PromptService>, delay: Duration, min_chars: usize) -> Self {
        Self {
            service,
            debouncer: Debouncer::new(delay),
            min_chars,
            text: String::new(),
            latest_seq: 0,
            badge: None,
        }
    }

    /// Input-change event. Restarts the idle timer; an empty input hides
    /// the badge right away.
    pub fn on_input(&mut self, text: &str, now: Instant) {
        self.text = text.to_string();
        if text.trim().is_empty() {
            self.hide();
        } else {
            self.debouncer.schedule(now);
        }
    }

    /// The input was replaced without typing. A pending timer fires on
    /// `text`; no new one is scheduled.
    pub fn replace_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    /// Hides the badge, drops any pending timer and invalidates in-flight
    /// detections.
    pub fn hide(&mut self) {
        self.badge = None;
        self.text.clear();
        self.debouncer.cancel();
        self.latest_seq += 1;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Called when the timer may have elapsed. Returns a ticket if a
    /// detection should be dispatched for the current text.
    pub fn poll(&mut self, now: Instant) -> Option<DetectionTicket> {
        if !self.debouncer.fire(now) {
            return None;
        }
        let prompt = self.text.trim();
        if prompt.chars().count() <= self.min_chars {
            trace!(chars = prompt.chars().count(), "input too short for intent detection");
            return None;
        }
        self.latest_seq += 1;
        Some(DetectionTicket {
            seq: self.latest_seq,
            prompt: prompt.to_string(),
        })
    }

    /// The remote call for `ticket`, detached from the detector so it can be
    /// spawned.
    pub fn detect(&self, ticket: DetectionTicket) -> impl Future<Output = Detection> + Send + 'static {
        let service = Arc::clone(&self.service);
        async move {
            let result = service.detect_intent(&ticket.prompt).await;
            Detection {
                seq: ticket.seq,
                result,
            }
        }
    }

    /// Applies a finished detection. Stale results and failures leave the
    /// badge untouched. Returns true if the badge changed.
    pub fn complete(&mut self, detection: Detection) -> bool {
        if detection.seq != self.latest_seq {
            debug!(seq = detection.seq, latest = self.latest_seq, "discarding stale intent detection");
            return false;
        }
        match detection.result {
            Ok(intent) => {
                self.badge = Some(intent.badge_text());
                true
            }
            Err(err) => {
                debug!(error = %err, "intent detection failed");
                false
            }
        }
    }

    pub fn badge(&self) -> Option<&str> {
        self.badge.as_deref()
    }
}
