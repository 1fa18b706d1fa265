//! Messages exchanged between the control panel and a page agent
//!
//! Requests are tagged by `action` so they match what the browser delivers:
//! `{"action": "setVolume", "volume": 150}` and `{"action": "debugInfo"}`.

use serde::{Deserialize, Serialize};

/// Request sent from the control panel to the agent of the active page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageMessage {
    /// Apply a volume percent to every media element on the page
    SetVolume {
        /// Volume percent (0-300+)
        volume: u32,
    },

    /// Report a diagnostics snapshot
    DebugInfo,
}

/// Acknowledgement of a `SetVolume` request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeAck {
    /// Always `true` once the agent has adopted the volume
    pub success: bool,
    /// Percent the agent now targets
    pub applied_volume: u32,
}

impl VolumeAck {
    /// Successful acknowledgement for `volume`
    pub fn applied(volume: u32) -> Self {
        Self {
            success: true,
            applied_volume: volume,
        }
    }
}

/// Diagnostics for one media element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDebugInfo {
    /// `VIDEO` or `AUDIO`
    pub tag_name: String,
    /// Current source URL, empty when none is loaded
    pub src: String,
    /// Native volume (0.0-1.0)
    pub volume: f64,
    /// Native mute flag
    pub muted: bool,
    /// Captured native volume, absent until the element has been seen
    pub original_volume: Option<f64>,
    /// Whether a gain stage has been built for the element
    pub has_gain_node: bool,
    /// Current multiplier of that gain stage
    pub gain_value: Option<f32>,
}

/// Diagnostics snapshot of a page agent
///
/// Only for display; nothing in the control flow reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSnapshot {
    /// Target percent of the agent
    pub current_volume: u32,
    /// Media elements found in the document
    pub media_count: usize,
    /// One of `not created`, `suspended`, `running`, `closed`
    pub audio_context_state: String,
    /// Elements with a gain stage
    pub gain_nodes_count: usize,
    /// Per-element details
    pub elements: Vec<ElementDebugInfo>,
}

/// Reply from a page agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageResponse {
    /// Reply to [`PageMessage::SetVolume`]
    VolumeApplied(VolumeAck),

    /// Reply to [`PageMessage::DebugInfo`]
    DebugInfo(DebugSnapshot),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_are_tagged_by_action() {
        let message: PageMessage =
            serde_json::from_value(json!({"action": "setVolume", "volume": 150})).unwrap();
        assert_eq!(message, PageMessage::SetVolume { volume: 150 });

        let message: PageMessage = serde_json::from_value(json!({"action": "debugInfo"})).unwrap();
        assert_eq!(message, PageMessage::DebugInfo);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let result: Result<PageMessage, _> =
            serde_json::from_value(json!({"action": "resetEverything"}));
        assert!(result.is_err());
    }

    #[test]
    fn ack_serializes_like_the_page_reply() {
        let reply = PageResponse::VolumeApplied(VolumeAck::applied(180));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"success": true, "appliedVolume": 180})
        );
    }

    #[test]
    fn debug_reply_is_distinguished_from_ack() {
        let raw = json!({
            "currentVolume": 100,
            "mediaCount": 1,
            "audioContextState": "not created",
            "gainNodesCount": 0,
            "elements": [{
                "tagName": "VIDEO",
                "src": "https://cdn.example.com/a.mp4",
                "volume": 1.0,
                "muted": false,
                "originalVolume": 1.0,
                "hasGainNode": false,
                "gainValue": null
            }]
        });

        let reply: PageResponse = serde_json::from_value(raw).unwrap();
        let PageResponse::DebugInfo(snapshot) = reply else {
            panic!("expected debug snapshot, got {reply:?}");
        };
        assert_eq!(snapshot.media_count, 1);
        assert_eq!(snapshot.elements[0].tag_name, "VIDEO");
    }
}
