//! Messages posted by the microphone permission frame.
//!
//! Nothing in the core reacts to these yet; the type fixes the wire shape.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PermissionMessage {
    #[serde(rename = "MICROPHONE_PERMISSION_GRANTED")]
    MicrophonePermissionGranted,
}

impl PermissionMessage {
    /// Parses a posted message, `None` for anything unrecognised
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_string(&PermissionMessage::MicrophonePermissionGranted).unwrap();
        assert_eq!(json, r#"{"type":"MICROPHONE_PERMISSION_GRANTED"}"#);
    }

    #[test]
    fn test_parse_ignores_other_messages() {
        assert_eq!(
            PermissionMessage::parse(r#"{"type": "MICROPHONE_PERMISSION_GRANTED"}"#),
            Some(PermissionMessage::MicrophonePermissionGranted)
        );
        assert_eq!(PermissionMessage::parse(r#"{"type": "OTHER"}"#), None);
        assert_eq!(PermissionMessage::parse("garbage"), None);
    }
}
