//! Wire events exchanged with display clients.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <value>}`. Event
//! names are shared with the browser client and must not change.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events sent from the server to display clients.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// The current payload; `None` means nothing was ever published.
    DataUpdate(Option<Value>),
    /// Whether the floating area should be shown.
    FloatingAreaStatus(bool),
    /// A refresh from this client could not be persisted.
    RefreshFailed(String),
}

/// Events sent from display clients to the server.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "refreshData")]
    RefreshData(Value),
    #[serde(rename = "toggle_floating_area")]
    ToggleFloatingArea(bool),
}
