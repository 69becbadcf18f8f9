//! Line-oriented terminal session over a [`Workbench`].
//!
//! Plain lines are input edits for the active tab; lines starting with `/`
//! are commands. Remote actions run as spawned tasks so typing, the debounce
//! timer and completions are all handled by one `select!` loop.

use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::controllers::{AnalyzeView, CompareView, EnhanceView, SuggestionList};
use crate::history::{HistoryItem, HistoryListing};
use crate::intent::Detection;
use crate::lifecycle::{Outcome, TriggerControl};
use crate::models::VariationKind;
use crate::notify::{Toast, ToastLevel};
use crate::tabs::Tab;
use crate::workbench::Workbench;

pub const HELP: &str = "\
Type text to edit the active tab's input (on the history tab it is the search term).
Commands:
  /tab <enhance|analyze|compare|history>   switch view
  /enhance | /analyze | /compare            run the active feature's action
  /use <concise|detailed|structured>        move a variation into the enhance input
  /clear | /copy | /save                    enhance view actions
  /search [term]                            filter history
  /load <n> | /delete <n>                   open or delete the n-th listed history item
  /show                                     redraw the active view
  /help | /quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Input(String),
    Tab(Tab),
    Enhance,
    Analyze,
    Compare,
    Use(VariationKind),
    Clear,
    Copy,
    Save,
    Search(String),
    Load(usize),
    Delete(usize),
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Input(line.to_string()));
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let index = |arg: &str| -> Result<usize, String> {
            match arg.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(format!("expected a positive item number, got '{arg}'")),
            }
        };
        match name {
            "tab" => arg.parse().map(Command::Tab),
            "enhance" => Ok(Command::Enhance),
            "analyze" => Ok(Command::Analyze),
            "compare" => Ok(Command::Compare),
            "use" => arg.parse().map(Command::Use),
            "clear" => Ok(Command::Clear),
            "copy" => Ok(Command::Copy),
            "save" => Ok(Command::Save),
            "search" => Ok(Command::Search(arg.to_string())),
            "load" => index(arg).map(Command::Load),
            "delete" => index(arg).map(Command::Delete),
            "show" => Ok(Command::Show),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '/{other}' (try /help)")),
        }
    }
}

fn control_line(control: &TriggerControl) -> String {
    if control.is_enabled() {
        format!("[{}]", control.label())
    } else {
        format!("[{} (busy)]", control.label())
    }
}

pub fn render_enhance(view: &EnhanceView, badge: Option<&str>, control: &TriggerControl) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Enhance ==");
    let _ = writeln!(out, "Input: {}", view.input);
    if let Some(badge) = badge {
        let _ = writeln!(out, "Intent: {badge}");
    }
    let _ = writeln!(out, "{}", control_line(control));
    if view.output_visible {
        let _ = writeln!(out, "-- Enhanced --");
        let _ = writeln!(out, "{}", view.output);
        if let Some(model) = &view.model_badge {
            let _ = writeln!(out, "{model}");
        }
    }
    out
}

pub fn render_analyze(view: &AnalyzeView, control: &TriggerControl) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Analyze ==");
    let _ = writeln!(out, "Input: {}", view.input);
    let _ = writeln!(out, "{}", control_line(control));
    let Some(results) = &view.results else {
        return out;
    };
    let _ = writeln!(out, "Overall: {}  Grade: {}", results.overall, results.grade);
    for row in &results.metrics {
        let filled = (row.fill * 20.0).round() as usize;
        let _ = writeln!(
            out,
            "  {:<14} {:>7} {}{}",
            row.metric.name(),
            row.label,
            "#".repeat(filled),
            ".".repeat(20 - filled.min(20))
        );
    }
    match &results.suggestions {
        SuggestionList::NoIssues => {
            let _ = writeln!(out, "{}", crate::controllers::analyze::NO_ISSUES);
        }
        SuggestionList::Items(items) => {
            for suggestion in items {
                let _ = writeln!(out, "x {}", suggestion.category);
                let _ = writeln!(out, "    Issue: {}", suggestion.issue);
                let _ = writeln!(out, "    Fix: {}", suggestion.fix);
            }
        }
    }
    out
}

pub fn render_compare(view: &CompareView, control: &TriggerControl) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Compare ==");
    let _ = writeln!(out, "Input: {}", view.input);
    let _ = writeln!(out, "{}", control_line(control));
    let Some(comparison) = &view.comparison else {
        return out;
    };
    for card in &comparison.cards {
        let _ = writeln!(
            out,
            "-- {} | {} | {} --",
            card.label(),
            card.score_label(),
            card.length_label()
        );
        let _ = writeln!(out, "{}", card.text);
    }
    let _ = writeln!(out, "{}", comparison.banner);
    out
}

pub fn render_history(search: &str, listing: &HistoryListing) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== History ==");
    let _ = writeln!(out, "Search: {search}");
    match listing {
        HistoryListing::Empty { placeholder } => {
            let _ = writeln!(out, "{placeholder}");
        }
        HistoryListing::Items(items) => {
            for (n, HistoryItem { title, date, .. }) in items.iter().enumerate() {
                let _ = writeln!(out, "{:>3}. {title}", n + 1);
                let _ = writeln!(out, "     {date}");
            }
        }
    }
    out
}

fn render_toast(toast: &Toast) -> String {
    let marker = match toast.level {
        ToastLevel::Success => "+",
        ToastLevel::Error => "!",
    };
    format!("{marker} {}: {}", toast.title, toast.message)
}

enum Event {
    Detected(Detection),
    /// A spawned action finished; redraw its tab.
    Finished(Tab, Outcome),
}

struct Session {
    workbench: Workbench,
    events: mpsc::UnboundedSender<Event>,
    /// Ids of the last rendered history listing, for `/load` and `/delete`.
    listed: Vec<String>,
    last_toast: u64,
}

impl Session {
    async fn draw(&mut self, tab: Tab) -> String {
        let wb = &self.workbench;
        match tab {
            Tab::Enhance => render_enhance(
                &wb.enhance.view(),
                wb.enhance.intent_badge().as_deref(),
                &wb.enhance.control(),
            ),
            Tab::Analyze => render_analyze(&wb.analyze.view(), &wb.analyze.control()),
            Tab::Compare => render_compare(&wb.compare.view(), &wb.compare.control()),
            Tab::History => match wb.history.render().await {
                Ok(listing) => self.show_listing(&listing),
                Err(err) => {
                    warn!(error = %err, "failed to read history");
                    self.workbench.notifier.error("Error", "Failed to load history");
                    String::new()
                }
            },
        }
    }

    fn show_listing(&mut self, listing: &HistoryListing) -> String {
        self.listed = match listing {
            HistoryListing::Items(items) => items.iter().map(|item| item.id.clone()).collect(),
            HistoryListing::Empty { .. } => Vec::new(),
        };
        render_history(&self.workbench.history.search(), listing)
    }

    fn spawn_action(&self, tab: Tab) {
        let wb = self.workbench.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = match tab {
                Tab::Enhance => wb.enhance.enhance().await,
                Tab::Analyze => wb.analyze.analyze().await,
                Tab::Compare => wb.compare.compare().await,
                Tab::History => return,
            };
            let _ = events.send(Event::Finished(tab, outcome));
        });
    }

    fn listed_id(&self, n: usize) -> Option<String> {
        let id = self.listed.get(n - 1).cloned();
        if id.is_none() {
            self.workbench
                .notifier
                .error("Not found", format!("No history item #{n}"));
        }
        id
    }

    /// Applies one line of input. Returns the text to print and whether the
    /// session should continue.
    async fn handle_line(&mut self, line: &str) -> (String, bool) {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => return (format!("{message}\n"), true),
        };
        debug!(?command, "command");
        let wb = self.workbench.clone();
        let out = match command {
            Command::Input(text) => match wb.active_tab() {
                Tab::Enhance => {
                    wb.enhance.on_input(&text, Instant::now());
                    String::new()
                }
                Tab::Analyze => {
                    wb.analyze.set_input(&text);
                    String::new()
                }
                Tab::Compare => {
                    wb.compare.set_input(&text);
                    String::new()
                }
                Tab::History => self.search(&text).await,
            },
            Command::Tab(tab) => {
                wb.activate(tab);
                self.draw(tab).await
            }
            Command::Enhance => self.start(Tab::Enhance).await,
            Command::Analyze => self.start(Tab::Analyze).await,
            Command::Compare => self.start(Tab::Compare).await,
            Command::Use(kind) => {
                if wb.compare.use_variation(kind) {
                    self.draw(Tab::Enhance).await
                } else {
                    "Generate variations first.\n".to_string()
                }
            }
            Command::Clear => {
                wb.enhance.clear();
                self.draw(Tab::Enhance).await
            }
            Command::Copy => {
                wb.enhance.copy();
                String::new()
            }
            Command::Save => {
                if let Err(err) = wb.enhance.save().await {
                    warn!(error = %err, "save failed");
                }
                String::new()
            }
            Command::Search(term) => {
                wb.activate(Tab::History);
                self.search(&term).await
            }
            Command::Load(n) => match self.listed_id(n) {
                Some(id) => match wb.history.load(&id).await {
                    Ok(true) => self.draw(Tab::Enhance).await,
                    Ok(false) => String::new(),
                    Err(err) => {
                        warn!(error = %err, "load failed");
                        String::new()
                    }
                },
                None => String::new(),
            },
            Command::Delete(n) => match self.listed_id(n) {
                Some(id) => match wb.history.delete(&id).await {
                    Ok(listing) => self.show_listing(&listing),
                    Err(err) => {
                        warn!(error = %err, "delete failed");
                        String::new()
                    }
                },
                None => String::new(),
            },
            Command::Show => self.draw(wb.active_tab()).await,
            Command::Help => format!("{HELP}\n"),
            Command::Quit => return (String::new(), false),
        };
        (out, true)
    }

    async fn search(&mut self, term: &str) -> String {
        match self.workbench.history.set_search(term).await {
            Ok(listing) => self.show_listing(&listing),
            Err(err) => {
                warn!(error = %err, "history search failed");
                self.workbench.notifier.error("Error", "Failed to load history");
                String::new()
            }
        }
    }

    /// Switches to `tab` and kicks off its action in the background. The
    /// busy label is already visible in the returned drawing.
    async fn start(&mut self, tab: Tab) -> String {
        self.workbench.activate(tab);
        self.spawn_action(tab);
        tokio::task::yield_now().await;
        self.draw(tab).await
    }

    fn take_toasts(&mut self) -> Vec<String> {
        let fresh = self.workbench.notifier.since(self.last_toast, Instant::now());
        if let Some(last) = fresh.last() {
            self.last_toast = last.id;
        }
        fresh.iter().map(render_toast).collect()
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Runs the session on stdin/stdout until `/quit` or end of input.
pub async fn run(workbench: Workbench) -> Result<()> {
    let (events, mut completions) = mpsc::unbounded_channel();
    let mut session = Session {
        workbench,
        events,
        listed: Vec::new(),
        last_toast: 0,
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    let intro = format!("{HELP}\n\n{}", session.draw(Tab::Enhance).await);
    stdout.write_all(intro.as_bytes()).await?;
    stdout.flush().await?;

    loop {
        let deadline = session.workbench.intent_deadline();
        let mut out = tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let (out, keep_going) = session.handle_line(&line).await;
                if !keep_going {
                    break;
                }
                out
            }
            _ = sleep_until_deadline(deadline) => {
                if let Some(detection) = session.workbench.poll_intent(Instant::now()) {
                    let events = session.events.clone();
                    tokio::spawn(async move {
                        let _ = events.send(Event::Detected(detection.await));
                    });
                }
                String::new()
            }
            Some(event) = completions.recv() => match event {
                Event::Detected(detection) => {
                    let changed = session.workbench.complete_intent(detection);
                    match session.workbench.enhance.intent_badge() {
                        Some(badge) if changed => format!("Intent: {badge}\n"),
                        _ => String::new(),
                    }
                }
                Event::Finished(tab, outcome) => {
                    debug!(%tab, ?outcome, "action finished");
                    if outcome == Outcome::Applied && session.workbench.active_tab() == tab {
                        session.draw(tab).await
                    } else {
                        String::new()
                    }
                }
            },
        };
        for toast in session.take_toasts() {
            out.push_str(&toast);
            out.push('\n');
        }
        if !out.is_empty() {
            stdout.write_all(out.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
