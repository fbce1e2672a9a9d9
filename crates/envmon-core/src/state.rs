//! System State
//!
//! The singleton control record pushed back to the device: a display
//! message and an open/closed flag. Each update overwrites the previous
//! value; no history is kept.

use serde::{Deserialize, Serialize};

/// Identifier of the singleton state record
pub const STATE_ID: i64 = 1;

/// Default display message
pub const DEFAULT_TEXT: &str = "Monitoring system active";

/// Singleton control record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemState {
    /// Always [`STATE_ID`]
    #[serde(default = "default_id")]
    pub id: i64,
    /// Display message
    pub text: String,
    /// Open/closed flag
    pub open: bool,
}

fn default_id() -> i64 {
    STATE_ID
}

impl Default for SystemState {
    fn default() -> Self {
        Self {
            id: STATE_ID,
            text: DEFAULT_TEXT.to_string(),
            open: false,
        }
    }
}

impl SystemState {
    /// Apply an update; fields the update leaves out keep their value
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(text) = update.text {
            self.text = text;
        }
        if let Some(open) = update.open {
            self.open = open;
        }
    }
}

/// User command that changes the state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    /// New display message
    #[serde(default)]
    pub text: Option<String>,
    /// New open/closed flag
    #[serde(default)]
    pub open: Option<bool>,
}

impl StateUpdate {
    /// Check if the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.open.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update_keeps_other_field() {
        let mut state = SystemState::default();

        state.apply(StateUpdate {
            open: Some(true),
            ..Default::default()
        });
        assert_eq!(state.text, DEFAULT_TEXT);
        assert!(state.open);

        state.apply(StateUpdate {
            text: Some("Hola".into()),
            open: None,
        });
        assert_eq!(state.text, "Hola");
        assert!(state.open);
    }

    #[test]
    fn test_update_from_json() {
        let update: StateUpdate = serde_json::from_str(r#"{"text": "LCD"}"#).unwrap();
        assert_eq!(update.text.as_deref(), Some("LCD"));
        assert_eq!(update.open, None);
        assert!(!update.is_empty());

        let empty: StateUpdate = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
