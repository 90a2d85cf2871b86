//! Event sink that forwards poll events to `tracing`.

use stakepoll_types::{Address, EventSink, PollEvent};

/// Logs every event at `info` with its JSON payload under the
/// `stakepoll::events` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl TracingEventSink {
    /// The JSON payload logged for `event`.
    pub fn payload(event: &PollEvent) -> String {
        serde_json::to_string(event).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }
}

impl EventSink for TracingEventSink {
    fn emit(&self, event: &PollEvent, involved: &[Address]) {
        let involved: Vec<String> = involved.iter().map(Address::to_string).collect();
        tracing::info!(
            target: "stakepoll::events",
            event = event.name(),
            involved = ?involved,
            payload = %Self::payload(event),
            "event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_tagged_json() {
        let event = PollEvent::Vote {
            poll_id: 4,
            voter: Address::new(vec![0xAB]),
            choice: None,
        };
        let value: serde_json::Value =
            serde_json::from_str(&TracingEventSink::payload(&event)).unwrap();
        assert_eq!(value["Vote"]["poll_id"], 4);
        assert!(value["Vote"]["choice"].is_null());
    }
}
