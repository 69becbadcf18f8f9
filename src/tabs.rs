use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Enhance,
    Analyze,
    Compare,
    History,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Enhance, Tab::Analyze, Tab::Compare, Tab::History];

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Enhance => "enhance",
            Tab::Analyze => "analyze",
            Tab::Compare => "compare",
            Tab::History => "history",
        }
    }

    /// Identifier of the content panel this tab targets.
    pub fn panel_id(self) -> String {
        format!("{}-tab", self.as_str())
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tab '{}'", s.trim()))
    }
}

/// Exclusive tab selection. The active tab and the visible panel are the
/// same field, so they can never disagree.
#[derive(Debug, Clone, Default)]
pub struct TabRouter {
    active: Tab,
}

impl TabRouter {
    pub fn activate(&mut self, tab: Tab) {
        self.active = tab;
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn is_panel_visible(&self, panel_id: &str) -> bool {
        self.active.panel_id() == panel_id
    }
}
