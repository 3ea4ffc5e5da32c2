//! Relay server JSON wire types.

use cove_link::EventKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub events: Vec<WireEvent>,
}

/// One stored event as the relay serves it. `data` is the sealed payload,
/// opaque to the relay and to this client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEvent {
    pub id: String,
    pub event_type: EventKind,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_response_parses() {
        let raw = r#"{
            "events": [
                {"id": "e1", "eventType": "request", "data": "sealed"},
                {"id": "e2", "eventType": "requestCanceled", "data": "sealed2"}
            ]
        }"#;
        let parsed: EventsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.events.len(), 2);
        assert_eq!(parsed.events[0].id, "e1");
        assert_eq!(parsed.events[1].event_type, EventKind::RequestCanceled);
    }
}
