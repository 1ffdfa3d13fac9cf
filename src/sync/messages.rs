//! Wire types for the backend push channel and control endpoint

use serde::{Deserialize, Serialize};

use crate::window::geometry::WindowGeometry;

/// Link state of one referee device channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Connecting,
    Connected,
    Disconnected,
    /// Slot not in use (secondary device in single-device mode)
    #[serde(rename = "n/a")]
    NotApplicable,
}

/// Primary/secondary device link pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub pri: LinkStatus,
    pub sec: LinkStatus,
}

/// Score triple carried by push updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub total: i32,
    pub plus: i32,
    pub minus: i32,
}

/// Payload of `score_update` and `status_update` envelopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePayload {
    pub index: u32,
    pub score: Score,
    pub status: DeviceStatus,
}

/// Inbound push-channel envelope.
///
/// Unrecognized types deserialize to `Unknown` and are dropped without
/// disturbing the connection.
#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    ScoreUpdate(ScorePayload),
    StatusUpdate(ScorePayload),
    Unknown,
}

impl<'de> Deserialize<'de> for PushMessage {
    /// Two-step decode: the `type` discriminant first, then the payload only
    /// for types we know. An unrecognized type keeps whatever payload it
    /// carries without inspecting it, so new backend message kinds never read
    /// as malformed frames.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Envelope {
            #[serde(rename = "type")]
            kind: String,
            #[serde(default)]
            payload: serde_json::Value,
        }

        let envelope = Envelope::deserialize(deserializer)?;
        let payload = |value: serde_json::Value| {
            ScorePayload::deserialize(value).map_err(serde::de::Error::custom)
        };
        Ok(match envelope.kind.as_str() {
            "score_update" => PushMessage::ScoreUpdate(payload(envelope.payload)?),
            "status_update" => PushMessage::StatusUpdate(payload(envelope.payload)?),
            _ => PushMessage::Unknown,
        })
    }
}

/// Device discovered by a backend scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub address: String,
    pub rssi: i32,
    #[serde(default)]
    pub is_target: bool,
}

/// Response body of `GET /scan`
#[derive(Debug, Clone, Deserialize)]
pub struct ScanResponse {
    #[serde(default)]
    pub devices: Vec<DeviceInfo>,
}

/// Referee device topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RefereeMode {
    Single,
    Dual,
}

/// One referee slot in a setup request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefereeDescriptor {
    pub index: u32,
    pub name: String,
    pub mode: RefereeMode,
    /// Primary device address, resolved from a prior scan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pri_addr: Option<String>,
    /// Secondary device address, dual mode only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sec_addr: Option<String>,
}

/// Body of `POST /setup`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupRequest {
    pub referees: Vec<RefereeDescriptor>,
}

/// One frame from the window-tracking feed
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackingFrame {
    pub found: bool,
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: Option<i32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default, rename = "isActive")]
    pub is_active: Option<bool>,
}

impl TrackingFrame {
    /// Rectangle of the tracked window, if it was found with full geometry
    pub fn geometry(&self) -> Option<WindowGeometry> {
        if !self.found {
            return None;
        }
        match (self.x, self.y, self.width, self.height) {
            (Some(x), Some(y), Some(width), Some(height)) => {
                Some(WindowGeometry::new(x, y, width, height))
            }
            _ => None,
        }
    }
}
