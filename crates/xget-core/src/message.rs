//! Wire messages exchanged with the background page

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A runtime message, tagged by its `action` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "camelCase")]
#[ts(export)]
pub enum Message {
    /// Background asks the page to show a banner.
    #[serde(rename_all = "camelCase")]
    ShowNotification {
        message: String,
        #[serde(default)]
        show_refresh_button: bool,
    },
    /// Page asks the background for the current settings.
    GetSettings,
}

/// Reply to an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub const OK: Ack = Ack { success: true };
}
