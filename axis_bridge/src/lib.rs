//! Shared host↔viewer message protocol.
//!
//! Messages cross the embedding boundary as JSON envelopes tagged by a
//! `type` string. This crate keeps both directions of the protocol in one
//! place so the viewer and its host stay interoperable: requests flow host →
//! viewer, events flow viewer → host.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One uploaded file accompanying a load request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    pub path: String,
    #[serde(default)]
    pub buffer: Vec<u8>,
}

/// Inline XML text standing in for a root document upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineXmlPayload {
    pub file_name: String,
    pub content: String,
}

/// Partial theme update; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_bg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hemi: Option<String>,
}

/// Requests the embedding page sends to the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostRequest {
    #[serde(rename = "LOAD_SCENE")]
    LoadScene {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        root: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        files: Vec<FilePayload>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        xml: Option<InlineXmlPayload>,
    },
    #[serde(rename = "RESET_POSE")]
    ResetPose,
    #[serde(rename = "PAUSE_SIMULATION")]
    PauseSimulation,
    #[serde(rename = "RESUME_SIMULATION")]
    ResumeSimulation,
    #[serde(rename = "SET_THEME")]
    SetTheme { theme: ThemePayload },
    /// Any `type` string this build does not understand.
    #[serde(other)]
    Unknown,
}

/// Notifications the viewer sends back to the embedding page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ViewerEvent {
    /// Sent exactly once on init, before any load request should arrive.
    #[serde(rename = "IFRAME_READY")]
    IframeReady,
    #[serde(rename = "SCENE_LOADED", rename_all = "camelCase")]
    SceneLoaded { scene_name: String },
    #[serde(rename = "BODY_MOUSEOVER", rename_all = "camelCase")]
    BodyMouseover { body_name: String },
    #[serde(rename = "BODY_MOUSEOUT", rename_all = "camelCase")]
    BodyMouseout { body_name: String },
    #[serde(rename = "ERROR")]
    Error { error: String },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("request decode error: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("event encode error: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Decode an inbound request envelope.
pub fn parse_request(raw: &str) -> Result<HostRequest, ProtocolError> {
    serde_json::from_str(raw).map_err(ProtocolError::Decode)
}

/// Encode an outbound event envelope.
pub fn encode_event(event: &ViewerEvent) -> Result<String, ProtocolError> {
    serde_json::to_string(event).map_err(ProtocolError::Encode)
}

/// Wrap any handler failure as the stringified `ERROR` notification the host
/// expects; the viewer never lets an exception escape its boundary.
pub fn error_event(err: &dyn std::fmt::Display) -> ViewerEvent {
    ViewerEvent::Error {
        error: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_load_scene_request() {
        let raw = r#"{
            "type": "LOAD_SCENE",
            "root": "robot.xml",
            "files": [{"path": "robot.xml", "buffer": [60, 109]}],
            "xml": {"fileName": "inline.xml", "content": "<mujoco/>"}
        }"#;
        let request = parse_request(raw).expect("parse");
        match request {
            HostRequest::LoadScene { root, files, xml } => {
                assert_eq!(root.as_deref(), Some("robot.xml"));
                assert_eq!(files.len(), 1);
                assert_eq!(files[0].buffer, vec![60, 109]);
                assert_eq!(xml.expect("xml").file_name, "inline.xml");
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn load_scene_payload_fields_are_optional() {
        let request = parse_request(r#"{"type": "LOAD_SCENE"}"#).expect("parse");
        assert_eq!(
            request,
            HostRequest::LoadScene {
                root: None,
                files: Vec::new(),
                xml: None,
            }
        );
    }

    #[test]
    fn decodes_bare_control_requests() {
        assert_eq!(
            parse_request(r#"{"type": "PAUSE_SIMULATION"}"#).expect("parse"),
            HostRequest::PauseSimulation
        );
        assert_eq!(
            parse_request(r#"{"type": "RESET_POSE"}"#).expect("parse"),
            HostRequest::ResetPose
        );
    }

    #[test]
    fn unknown_type_maps_to_fallback_variant() {
        assert_eq!(
            parse_request(r#"{"type": "TELEPORT", "x": 1}"#).expect("parse"),
            HostRequest::Unknown
        );
    }

    #[test]
    fn theme_update_merges_partial_fields() {
        let request =
            parse_request(r##"{"type": "SET_THEME", "theme": {"sceneBg": "#101010"}}"##)
                .expect("parse");
        match request {
            HostRequest::SetTheme { theme } => {
                assert_eq!(theme.scene_bg.as_deref(), Some("#101010"));
                assert!(theme.hemi.is_none());
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn events_encode_with_wire_names() {
        let encoded = encode_event(&ViewerEvent::SceneLoaded {
            scene_name: "robot.xml".to_string(),
        })
        .expect("encode");
        assert_eq!(encoded, r#"{"type":"SCENE_LOADED","sceneName":"robot.xml"}"#);

        let encoded = encode_event(&ViewerEvent::BodyMouseover {
            body_name: "gripper".to_string(),
        })
        .expect("encode");
        assert!(encoded.contains(r#""bodyName":"gripper""#));
    }

    #[test]
    fn error_event_stringifies_any_failure() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing arm.stl");
        assert_eq!(
            error_event(&err),
            ViewerEvent::Error {
                error: "missing arm.stl".to_string(),
            }
        );
    }
}
