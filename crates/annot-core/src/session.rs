//! UI mode state machine
//!
//! Mode transitions:
//! ```text
//! Dashboard → AddEntry    → Dashboard   (unseen entry selected; submit or cancel)
//! Dashboard → ReviewEntry → Dashboard   (coded entry selected; submit or cancel)
//! ```
//!
//! The mode travels as an explicit value (the `mode` query parameter),
//! never as ambient state.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dashboard::ExpandedRow;
use crate::error::SessionError;

/// Warning shown when the review page is opened with nothing selected
pub const NO_SELECTION_WARNING: &str = "No article selected for review.";

/// The screen the user is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Dashboard,
    AddEntry,
    ReviewEntry,
}

impl Mode {
    /// Value carried in the `mode` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Mode::Dashboard => "Article Dashboard",
            Mode::AddEntry => "Add Entry",
            Mode::ReviewEntry => "Review Entry",
        }
    }

    /// Parse a query parameter; absent or unknown values mean the dashboard.
    pub fn from_query(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    /// Check if a mode transition is valid
    pub fn can_transition_to(&self, target: &Mode) -> bool {
        matches!(
            (self, target),
            (Mode::Dashboard, Mode::AddEntry)
                | (Mode::Dashboard, Mode::ReviewEntry)
                | (Mode::AddEntry, Mode::Dashboard)
                | (Mode::ReviewEntry, Mode::Dashboard)
        )
    }

    /// Get valid next modes from the current mode
    pub fn valid_transitions(&self) -> Vec<Mode> {
        match self {
            Mode::Dashboard => vec![Mode::AddEntry, Mode::ReviewEntry],
            Mode::AddEntry | Mode::ReviewEntry => vec![Mode::Dashboard],
        }
    }
}

impl FromStr for Mode {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Article Dashboard" => Ok(Mode::Dashboard),
            "Add Entry" => Ok(Mode::AddEntry),
            "Review Entry" => Ok(Mode::ReviewEntry),
            other => Err(SessionError::UnknownMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_query())
    }
}

/// What to render for the current cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View<'a> {
    Dashboard,
    /// Entry form, with the selected dashboard row if there is one
    Entry {
        mode: Mode,
        selection: Option<&'a ExpandedRow>,
    },
    /// Nothing to render this cycle
    Halted { warning: &'static str },
}

/// Mode plus the selected dashboard row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    mode: Mode,
    selection: Option<ExpandedRow>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session reached by direct navigation: the mode comes from the query
    /// parameter and nothing is selected.
    pub fn from_query(value: Option<&str>) -> Self {
        Self {
            mode: Mode::from_query(value),
            selection: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selection(&self) -> Option<&ExpandedRow> {
        self.selection.as_ref()
    }

    /// Current query parameter value.
    pub fn query(&self) -> &'static str {
        self.mode.as_query()
    }

    fn transition(&mut self, target: Mode) -> Result<(), SessionError> {
        if !self.mode.can_transition_to(&target) {
            return Err(SessionError::InvalidTransition {
                from: self.mode.to_string(),
                to: target.to_string(),
            });
        }
        tracing::debug!("Mode {} -> {}", self.mode, target);
        self.mode = target;
        Ok(())
    }

    /// Select a dashboard row. Rows with a stored record open for review,
    /// the rest open a new entry.
    pub fn select(&mut self, row: ExpandedRow) -> Result<Mode, SessionError> {
        let target = if row.entry_coded {
            Mode::ReviewEntry
        } else {
            Mode::AddEntry
        };
        self.transition(target)?;
        self.selection = Some(row);
        Ok(target)
    }

    /// Leave the entry form after submit or cancel.
    pub fn return_to_dashboard(&mut self) -> Result<(), SessionError> {
        self.transition(Mode::Dashboard)?;
        self.selection = None;
        Ok(())
    }

    /// Decide what this cycle renders. Review without a selection halts
    /// with a warning; a new entry without one gets a blank form.
    pub fn view(&self) -> View<'_> {
        match (self.mode, self.selection.as_ref()) {
            (Mode::Dashboard, _) => View::Dashboard,
            (Mode::ReviewEntry, None) => View::Halted {
                warning: NO_SELECTION_WARNING,
            },
            (mode, selection) => View::Entry { mode, selection },
        }
    }
}
