// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture statistics

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::event::NetworkEvent;
use super::types::NetworkEventType;

/// Summary of a set of captured events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureStats {
    /// Total events, filtered ones included
    pub total_events: u64,
    /// Events marked filtered
    pub filtered_events: u64,
    /// Events per type, keyed by canonical identifier
    pub by_type: BTreeMap<String, u64>,
    /// WebSocket frames per message type, keyed by canonical identifier
    pub by_message_type: BTreeMap<String, u64>,
    /// Sum of bytes sent
    pub bytes_sent: u64,
    /// Sum of bytes received
    pub bytes_received: u64,
    /// Distinct session ids
    pub sessions: u64,
    /// Error events
    pub errors: u64,
    /// Mean duration of HTTP responses with a non-zero duration (ms)
    pub avg_response_ms: f64,
}

impl CaptureStats {
    /// Compute statistics over events
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a NetworkEvent>,
    {
        let mut stats = CaptureStats::default();
        let mut sessions = HashSet::new();
        let mut response_ms_total = 0.0;
        let mut timed_responses = 0u64;

        for event in events {
            stats.total_events += 1;
            if event.is_filtered {
                stats.filtered_events += 1;
            }

            *stats
                .by_type
                .entry(event.event_type.as_str().to_string())
                .or_insert(0) += 1;

            if let Some(message_type) = event.message_type {
                *stats
                    .by_message_type
                    .entry(message_type.as_str().to_string())
                    .or_insert(0) += 1;
            }

            stats.bytes_sent = stats.bytes_sent.saturating_add(event.bytes_sent);
            stats.bytes_received = stats.bytes_received.saturating_add(event.bytes_received);
            sessions.insert(event.session_id.as_str());

            match event.event_type {
                NetworkEventType::Error => stats.errors += 1,
                NetworkEventType::HttpResponse if !event.duration.is_zero() => {
                    response_ms_total += event.duration.as_secs_f64() * 1000.0;
                    timed_responses += 1;
                }
                _ => {}
            }
        }

        stats.sessions = sessions.len() as u64;
        if timed_responses > 0 {
            stats.avg_response_ms = response_ms_total / timed_responses as f64;
        }
        stats
    }

    /// Count for one event type
    pub fn count(&self, event_type: NetworkEventType) -> u64 {
        self.by_type.get(event_type.as_str()).copied().unwrap_or(0)
    }

    /// Events not marked filtered
    pub fn visible_events(&self) -> u64 {
        self.total_events.saturating_sub(self.filtered_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::WebSocketMessageType;
    use std::time::Duration;
    use url::Url;

    fn event(id: u64, session: &str, event_type: NetworkEventType) -> NetworkEvent {
        NetworkEvent::new(id, session, event_type, Url::parse("https://a.test/").unwrap())
    }

    #[test]
    fn test_empty() {
        let stats = CaptureStats::from_events(&Vec::<NetworkEvent>::new());
        assert_eq!(stats.total_events, 0);
        assert_eq!(stats.avg_response_ms, 0.0);
    }

    #[test]
    fn test_counts() {
        let events = vec![
            event(1, "a", NetworkEventType::HttpRequest).with_bytes(100, 0),
            event(2, "a", NetworkEventType::HttpResponse)
                .with_bytes(0, 400)
                .with_duration(Duration::from_millis(30)),
            event(3, "b", NetworkEventType::HttpResponse).with_duration(Duration::from_millis(10)),
            event(4, "c", NetworkEventType::WebSocketMessage)
                .with_message_type(WebSocketMessageType::Text)
                .filtered(),
            event(5, "c", NetworkEventType::Error),
        ];
        let stats = CaptureStats::from_events(&events);

        assert_eq!(stats.total_events, 5);
        assert_eq!(stats.filtered_events, 1);
        assert_eq!(stats.visible_events(), 4);
        assert_eq!(stats.count(NetworkEventType::HttpResponse), 2);
        assert_eq!(stats.count(NetworkEventType::WebSocketConnect), 0);
        assert_eq!(stats.by_message_type.get("text"), Some(&1));
        assert_eq!(stats.bytes_sent, 100);
        assert_eq!(stats.bytes_received, 400);
        assert_eq!(stats.sessions, 3);
        assert_eq!(stats.errors, 1);
        assert!((stats.avg_response_ms - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_visible_events_inconsistent_counts() {
        let stats = CaptureStats {
            total_events: 2,
            filtered_events: 5,
            ..Default::default()
        };
        assert_eq!(stats.visible_events(), 0);
    }

    #[test]
    fn test_keys_are_canonical_identifiers() {
        let events = vec![event(1, "a", NetworkEventType::WebSocketDisconnect)];
        let json = serde_json::to_value(CaptureStats::from_events(&events)).unwrap();

        assert_eq!(json["by_type"]["websocket_disconnect"], 1);
    }
}
