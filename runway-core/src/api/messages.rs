use serde::{Deserialize, Serialize};

use crate::{
    model::{Pipeline, StorageSystem, UsageSample},
    notify::ChangeChannel,
};

/// Full-state snapshots pushed to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SnapshotMessage {
    InitialStorage(Vec<StorageSystem>),
    InitialPipelines(Vec<Pipeline>),
    InitialHistory(Vec<UsageSample>),
}

/// Everything an observer can receive on the live feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObserverMessage {
    /// A store notification, forwarded with its channel tag.
    Notification {
        channel: ChangeChannel,
        payload: serde_json::Value,
    },
    Snapshot(SnapshotMessage),
}

impl ObserverMessage {
    pub fn notification(channel: ChangeChannel, payload: serde_json::Value) -> Self {
        Self::Notification { channel, payload }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<SnapshotMessage> for ObserverMessage {
    fn from(snapshot: SnapshotMessage) -> Self {
        Self::Snapshot(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notification_envelope_carries_channel_and_payload() {
        let message = ObserverMessage::notification(ChangeChannel::StorageChange, json!({ "id": 1 }));
        let value: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({ "channel": "storage_change", "payload": { "id": 1 } }));
    }

    #[test]
    fn snapshot_envelope_uses_type_and_data() {
        let message = ObserverMessage::from(SnapshotMessage::InitialPipelines(Vec::new()));
        let value: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({ "type": "initial_pipelines", "data": [] }));

        let parsed: ObserverMessage = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, message);
    }
}
