//! Tab selection contract.
//!
//! [`TabSelector`] is a controlled component: it derives every piece of
//! selection state from the `active_tab` id it is handed and reports user
//! choices as [`DashboardEvent::SelectTab`]. It never stores which tab is
//! active.

use serde::Serialize;

use crate::models::DashboardEvent;

// ── Inputs ────────────────────────────────────────────────────────────────────

/// Activity status shown as a coloured dot next to a tab label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Running,
    Idle,
    Error,
    Warning,
}

impl TabStatus {
    /// Parse a status string case-insensitively.
    ///
    /// Unknown values return `None`, which renders as the muted band.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Some(Self::Running),
            "idle" => Some(Self::Idle),
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }
}

/// One entry of a tab set, supplied by the parent on every render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tab {
    /// Unique within its tab set.
    pub id: String,
    pub label: String,
    /// Counter badge; `None` or `Some(0)` hides it.
    pub badge: Option<u64>,
    pub status: Option<TabStatus>,
    /// Badge turns alert-coloured while the tab is inactive.
    pub urgent: bool,
    /// Badge turns warning-coloured while the tab is inactive.
    pub attention: bool,
}

impl Tab {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_badge(mut self, badge: u64) -> Self {
        self.badge = Some(badge);
        self
    }

    pub fn with_status(mut self, status: Option<TabStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn urgent(mut self, urgent: bool) -> Self {
        self.urgent = urgent;
        self
    }

    pub fn attention(mut self, attention: bool) -> Self {
        self.attention = attention;
        self
    }
}

// ── Outputs ───────────────────────────────────────────────────────────────────

/// Display band of a tab badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeBand {
    Primary,
    Alert,
    Warning,
    Neutral,
}

/// Display band of a tab status dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBand {
    PulsingSuccess,
    Info,
    Error,
    Warning,
    Muted,
}

impl From<Option<TabStatus>> for StatusBand {
    fn from(status: Option<TabStatus>) -> Self {
        match status {
            Some(TabStatus::Running) => StatusBand::PulsingSuccess,
            Some(TabStatus::Idle) => StatusBand::Info,
            Some(TabStatus::Error) => StatusBand::Error,
            Some(TabStatus::Warning) => StatusBand::Warning,
            None => StatusBand::Muted,
        }
    }
}

/// A visible badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeView {
    pub count: u64,
    pub band: BadgeBand,
}

/// Render description of a single tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub id: String,
    pub label: String,
    pub selected: bool,
    /// Exactly one tab of a rendered set is focusable.
    pub focusable: bool,
    pub badge: Option<BadgeView>,
    pub status: StatusBand,
}

/// Keyboard navigation intents, mapped from concrete keys by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabKey {
    Next,
    Previous,
    First,
    Last,
}

// ── TabSelector ───────────────────────────────────────────────────────────────

/// Stateless tab-bar logic.
pub struct TabSelector;

impl TabSelector {
    /// Derive the render description of every tab.
    ///
    /// When `active_tab` matches no tab nothing is selected and the first tab
    /// takes the focus slot, so exactly one tab stays reachable.
    pub fn render(tabs: &[Tab], active_tab: &str) -> Vec<TabView> {
        let focus_index = tabs
            .iter()
            .position(|t| t.id == active_tab)
            .unwrap_or(0);

        tabs.iter()
            .enumerate()
            .map(|(i, tab)| {
                let selected = tab.id == active_tab;
                TabView {
                    id: tab.id.clone(),
                    label: tab.label.clone(),
                    selected,
                    focusable: i == focus_index,
                    badge: Self::badge(tab, selected),
                    status: StatusBand::from(tab.status),
                }
            })
            .collect()
    }

    /// Badge visibility and band for one tab.
    pub fn badge(tab: &Tab, selected: bool) -> Option<BadgeView> {
        let count = tab.badge.filter(|&n| n > 0)?;
        Some(BadgeView {
            count,
            band: Self::badge_band(tab, selected),
        })
    }

    /// Badge band: active wins, then urgent, then attention.
    pub fn badge_band(tab: &Tab, selected: bool) -> BadgeBand {
        if selected {
            BadgeBand::Primary
        } else if tab.urgent {
            BadgeBand::Alert
        } else if tab.attention {
            BadgeBand::Warning
        } else {
            BadgeBand::Neutral
        }
    }

    /// The notification to send upward when the user picks `tab_id`.
    pub fn select(tab_id: &str) -> DashboardEvent {
        DashboardEvent::SelectTab(tab_id.to_string())
    }

    /// Resolve a navigation key against the current selection.
    ///
    /// Next/Previous wrap around. Returns `None` for an empty tab set or when
    /// the key would land on the tab that is already active.
    pub fn navigate(tabs: &[Tab], active_tab: &str, key: TabKey) -> Option<DashboardEvent> {
        if tabs.is_empty() {
            return None;
        }
        let last = tabs.len() - 1;
        let current = tabs.iter().position(|t| t.id == active_tab);

        let target = match (key, current) {
            (TabKey::First, _) => 0,
            (TabKey::Last, _) => last,
            (TabKey::Next, Some(i)) => if i == last { 0 } else { i + 1 },
            (TabKey::Previous, Some(i)) => if i == 0 { last } else { i - 1 },
            (TabKey::Next, None) => 0,
            (TabKey::Previous, None) => last,
        };

        if current == Some(target) {
            return None;
        }
        Some(Self::select(&tabs[target].id))
    }

    /// Select the tab at a 1-based position (digit shortcuts).
    pub fn select_position(
        tabs: &[Tab],
        active_tab: &str,
        position: usize,
    ) -> Option<DashboardEvent> {
        let tab = tabs.get(position.checked_sub(1)?)?;
        if tab.id == active_tab {
            return None;
        }
        Some(Self::select(&tab.id))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
