//! Action kinds observed from the event source and assistant actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of ordinary user interaction reported by the event source.
///
/// Each kind has its own trigger window; a copy never pairs with a select.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Copy to clipboard (e.g. Cmd+C / Ctrl+C).
    Copy,
    /// Selection of text or files.
    Select,
    /// Any other interaction the event source chooses to report.
    Custom(String),
}

impl ActionKind {
    /// Stable label used in logs and bindings.
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Copy => "copy",
            ActionKind::Select => "select",
            ActionKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "copy" => ActionKind::Copy,
            "select" => ActionKind::Select,
            other => ActionKind::Custom(other.to_string()),
        })
    }
}

/// What the assistant should do with the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Translate the content.
    Translate,
    /// Explain the content.
    Explain,
    /// Summarize the key points.
    Summarize,
    /// Analyze the content (typically files and images).
    Analyze,
}

impl Action {
    /// All actions, in menu order.
    pub const ALL: [Action; 4] = [
        Action::Translate,
        Action::Explain,
        Action::Summarize,
        Action::Analyze,
    ];

    /// Lowercase name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Translate => "translate",
            Action::Explain => "explain",
            Action::Summarize => "summarize",
            Action::Analyze => "analyze",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "translate" => Ok(Action::Translate),
            "explain" => Ok(Action::Explain),
            "summarize" | "summarise" => Ok(Action::Summarize),
            "analyze" | "analyse" => Ok(Action::Analyze),
            other => Err(format!("unknown action: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_from_str() {
        assert_eq!("copy".parse::<ActionKind>().unwrap(), ActionKind::Copy);
        assert_eq!(" Select ".parse::<ActionKind>().unwrap(), ActionKind::Select);
        assert_eq!(
            "drag".parse::<ActionKind>().unwrap(),
            ActionKind::Custom("drag".to_string())
        );
    }

    #[test]
    fn test_action_kind_serde() {
        let json = serde_json::to_string(&ActionKind::Copy).unwrap();
        assert_eq!(json, "\"copy\"");

        let custom: ActionKind = serde_json::from_str(r#"{"custom":"cut"}"#).unwrap();
        assert_eq!(custom, ActionKind::Custom("cut".to_string()));
        assert_eq!(custom.as_str(), "cut");
    }

    #[test]
    fn test_action_parse() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
        assert_eq!("Summarise".parse::<Action>().unwrap(), Action::Summarize);
        assert!("dance".parse::<Action>().is_err());
    }
}
