// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network event record
//!
//! A `NetworkEvent` is a plain value: no validation happens on construction or
//! mutation. Producers are expected to uphold the capture invariants:
//! - `id` is unique in a capture session and never reused; `0` means unassigned.
//! - `id`, `session_id`, `event_type` and `url` do not change after capture.
//! - Events of one session are non-decreasing in both `id` and `timestamp`.

use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};
use url::Url;

use super::types::{NetworkEventType, WebSocketMessageType};
use crate::time::{duration_micros, Timestamp};

/// URL carried by a default-constructed record until a real one is assigned
pub const PLACEHOLDER_URL: &str = "http://example.com/";

/// Status code carried by a default-constructed record. Not a claim of success.
pub const DEFAULT_STATUS_CODE: i32 = 200;

/// One captured network occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEvent {
    /// Capture id, `0` until assigned
    pub id: u64,
    /// Logical connection, tab or session this event belongs to
    pub session_id: String,
    /// Capture time
    pub timestamp: Timestamp,
    /// Event kind
    #[serde(rename = "type")]
    pub event_type: NetworkEventType,
    /// Frame sub-type, only for `WebSocketMessage`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<WebSocketMessageType>,
    /// Request URL, or the connection URL for WebSocket events
    pub url: Url,
    /// HTTP method (requests only)
    #[serde(default)]
    pub method: String,
    /// Status or error code (responses and errors only)
    #[serde(default = "default_status_code")]
    pub status_code: i32,
    /// Raw or serialized request header block
    #[serde(default)]
    pub request_headers: String,
    /// Raw or serialized response header block
    #[serde(default)]
    pub response_headers: String,
    /// Request body, possibly truncated or redacted
    #[serde(default)]
    pub request_body: String,
    /// Response body or frame payload, possibly truncated or redacted
    #[serde(default)]
    pub response_body: String,
    /// Time until the exchange or connection completed
    #[serde(default, with = "duration_micros")]
    pub duration: Duration,
    /// Bytes received for this occurrence
    #[serde(default)]
    pub bytes_received: u64,
    /// Bytes sent for this occurrence
    #[serde(default)]
    pub bytes_sent: u64,
    /// Suppressed from downstream consumers; kept for audit
    #[serde(default)]
    pub is_filtered: bool,
    /// Producer-defined free-form text
    #[serde(default)]
    pub metadata: String,
}

fn default_status_code() -> i32 {
    DEFAULT_STATUS_CODE
}

impl Default for NetworkEvent {
    fn default() -> Self {
        Self {
            id: 0,
            session_id: String::new(),
            timestamp: Timestamp::now(),
            event_type: NetworkEventType::HttpRequest,
            message_type: None,
            url: placeholder_url(),
            method: String::new(),
            status_code: DEFAULT_STATUS_CODE,
            request_headers: String::new(),
            response_headers: String::new(),
            request_body: String::new(),
            response_body: String::new(),
            duration: Duration::ZERO,
            bytes_received: 0,
            bytes_sent: 0,
            is_filtered: false,
            metadata: String::new(),
        }
    }
}

impl NetworkEvent {
    /// Create an event with its identity fields set
    pub fn new(
        id: u64,
        session_id: impl Into<String>,
        event_type: NetworkEventType,
        url: Url,
    ) -> Self {
        Self {
            id,
            session_id: session_id.into(),
            event_type,
            url,
            ..Default::default()
        }
    }

    /// Set capture timestamp
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set HTTP method
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set status code
    pub fn with_status(mut self, status_code: i32) -> Self {
        self.status_code = status_code;
        self
    }

    /// Set WebSocket frame sub-type
    pub fn with_message_type(mut self, message_type: WebSocketMessageType) -> Self {
        self.message_type = Some(message_type);
        self
    }

    /// Set request header block
    pub fn with_request_headers(mut self, headers: impl Into<String>) -> Self {
        self.request_headers = headers.into();
        self
    }

    /// Set response header block
    pub fn with_response_headers(mut self, headers: impl Into<String>) -> Self {
        self.response_headers = headers.into();
        self
    }

    /// Set request body
    pub fn with_request_body(mut self, body: impl Into<String>) -> Self {
        self.request_body = body.into();
        self
    }

    /// Set response body
    pub fn with_response_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = body.into();
        self
    }

    /// Set duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set byte counters
    pub fn with_bytes(mut self, sent: u64, received: u64) -> Self {
        self.bytes_sent = sent;
        self.bytes_received = received;
        self
    }

    /// Set metadata
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Mark as filtered
    pub fn filtered(mut self) -> Self {
        self.is_filtered = true;
        self
    }

    /// Attach response data once it arrives
    pub fn attach_response(
        &mut self,
        status_code: i32,
        headers: impl Into<String>,
        body: impl Into<String>,
    ) {
        self.status_code = status_code;
        self.response_headers = headers.into();
        self.response_body = body.into();
    }

    /// Record completion relative to the capture timestamp
    pub fn complete(&mut self, at: Timestamp) {
        self.duration = at.saturating_duration_since(self.timestamp);
    }

    /// Accumulate sent bytes
    pub fn add_bytes_sent(&mut self, n: u64) {
        self.bytes_sent = self.bytes_sent.saturating_add(n);
    }

    /// Accumulate received bytes
    pub fn add_bytes_received(&mut self, n: u64) {
        self.bytes_received = self.bytes_received.saturating_add(n);
    }

    /// Set or clear the filtered flag
    pub fn set_filtered(&mut self, filtered: bool) {
        self.is_filtered = filtered;
    }

    /// Store binary request data base64-encoded in the text body
    pub fn set_binary_request_body(&mut self, bytes: &[u8]) {
        self.request_body = base64::engine::general_purpose::STANDARD.encode(bytes);
    }

    /// Store binary response data base64-encoded in the text body
    pub fn set_binary_response_body(&mut self, bytes: &[u8]) {
        self.response_body = base64::engine::general_purpose::STANDARD.encode(bytes);
    }

    /// Decode a base64-wrapped request body
    pub fn binary_request_body(&self) -> Option<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.request_body)
            .ok()
    }

    /// Decode a base64-wrapped response body
    ///
    /// Returns `None` when the body is not valid base64, which is expected for
    /// text payloads.
    pub fn binary_response_body(&self) -> Option<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.response_body)
            .ok()
    }

    /// URL scheme
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// URL host, if the URL has one
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// URL path
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Whether an id has been assigned
    pub fn is_captured(&self) -> bool {
        self.id != 0
    }

    /// Check if this is an HTTP request or response
    pub fn is_http(&self) -> bool {
        self.event_type.is_http()
    }

    /// Check if this is a WebSocket event
    pub fn is_websocket(&self) -> bool {
        self.event_type.is_websocket()
    }

    /// Check if this is a 2xx response
    ///
    /// Only response events are considered; a request carrying the default
    /// status code is not a success.
    pub fn is_success(&self) -> bool {
        self.event_type == NetworkEventType::HttpResponse
            && (200..300).contains(&self.status_code)
    }

    /// Check the per-session ordering invariant against an earlier event
    ///
    /// Events from different sessions are unordered and always pass.
    pub fn follows(&self, earlier: &NetworkEvent) -> bool {
        if self.session_id != earlier.session_id {
            return true;
        }
        self.id >= earlier.id && self.timestamp >= earlier.timestamp
    }

    /// Serialize as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn placeholder_url() -> Url {
    Url::parse(PLACEHOLDER_URL).unwrap_or_else(|_| unreachable!("constant URL"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_default_event() {
        let event = NetworkEvent::default();

        assert_eq!(event.id, 0);
        assert!(!event.is_captured());
        assert_eq!(event.event_type, NetworkEventType::HttpRequest);
        assert_eq!(event.status_code, 200);
        assert!(!event.is_filtered);
        assert_eq!(event.bytes_received, 0);
        assert_eq!(event.bytes_sent, 0);
        assert!(event.request_headers.is_empty());
        assert!(event.response_body.is_empty());
        assert!(event.metadata.is_empty());
        assert_eq!(event.duration, Duration::ZERO);
        assert_eq!(event.url.as_str(), PLACEHOLDER_URL);
    }

    #[test]
    fn test_url_accessors() {
        let event = NetworkEvent::new(
            1,
            "tab-1",
            NetworkEventType::WebSocketConnect,
            url("wss://chat.example.com/socket?room=1"),
        );

        assert_eq!(event.scheme(), "wss");
        assert_eq!(event.host(), Some("chat.example.com"));
        assert_eq!(event.path(), "/socket");
        assert!(event.is_websocket());
    }

    #[test]
    fn test_incremental_response() {
        let start = Timestamp::from_unix_micros(10_000_000);
        let mut event = NetworkEvent::new(
            7,
            "tab-1",
            NetworkEventType::HttpResponse,
            url("https://api.example.com/users"),
        )
        .with_timestamp(start);

        event.attach_response(404, "content-type: text/plain", "not found");
        event.complete(start + Duration::from_millis(120));
        event.add_bytes_received(9);
        event.add_bytes_received(1);

        assert_eq!(event.status_code, 404);
        assert_eq!(event.response_body, "not found");
        assert_eq!(event.duration, Duration::from_millis(120));
        assert_eq!(event.bytes_received, 10);
        assert!(!event.is_success());
    }

    #[test]
    fn test_request_is_not_success() {
        let event = NetworkEvent::default().with_method("GET");
        assert!(!event.is_success());

        let response = NetworkEvent {
            event_type: NetworkEventType::HttpResponse,
            ..Default::default()
        };
        assert!(response.is_success());
    }

    #[test]
    fn test_follows() {
        let first = NetworkEvent::new(1, "s", NetworkEventType::HttpRequest, url("https://a.test/"))
            .with_timestamp(Timestamp::from_unix_micros(100));
        let second = NetworkEvent::new(2, "s", NetworkEventType::HttpResponse, url("https://a.test/"))
            .with_timestamp(Timestamp::from_unix_micros(100));
        let stale = NetworkEvent::new(3, "s", NetworkEventType::HttpRequest, url("https://a.test/"))
            .with_timestamp(Timestamp::from_unix_micros(50));
        let other = NetworkEvent::new(0, "t", NetworkEventType::HttpRequest, url("https://a.test/"));

        assert!(second.follows(&first));
        assert!(!first.follows(&second));
        assert!(!stale.follows(&second));
        assert!(other.follows(&second));
    }

    #[test]
    fn test_binary_body() {
        let mut event = NetworkEvent::default();
        event.set_binary_response_body(&[0x00, 0xff, 0x10]);

        assert_eq!(event.response_body, "AP8Q");
        assert_eq!(event.binary_response_body(), Some(vec![0x00, 0xff, 0x10]));
        assert_eq!(event.binary_request_body(), Some(vec![]));

        event.set_binary_request_body(b"hi");
        assert_eq!(event.request_body, "aGk=");
        assert_eq!(event.binary_request_body(), Some(b"hi".to_vec()));
    }

    #[test]
    fn test_json_shape() {
        let event = NetworkEvent::new(
            42,
            "ws-9",
            NetworkEventType::WebSocketMessage,
            url("wss://stream.example.com/feed"),
        )
        .with_message_type(WebSocketMessageType::Binary)
        .with_duration(Duration::from_micros(1500))
        .with_bytes(0, 64);

        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "websocket_message");
        assert_eq!(value["message_type"], "binary");
        assert_eq!(value["url"], "wss://stream.example.com/feed");
        assert_eq!(value["duration"], 1500);
        assert_eq!(value["bytes_received"], 64);

        let back = NetworkEvent::from_json(&event.to_json().unwrap()).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_json_minimal_record_uses_defaults() {
        let json = r#"{
            "id": 3,
            "session_id": "tab-2",
            "timestamp": "2024-05-01T12:00:00Z",
            "type": "http_request",
            "url": "https://example.org/"
        }"#;
        let event = NetworkEvent::from_json(json).unwrap();

        assert_eq!(event.status_code, 200);
        assert_eq!(event.message_type, None);
        assert!(!event.is_filtered);
    }

    #[test]
    fn test_json_rejects_unknown_type() {
        let json = r#"{
            "id": 3,
            "session_id": "tab-2",
            "timestamp": "2024-05-01T12:00:00Z",
            "type": "http_redirect",
            "url": "https://example.org/"
        }"#;

        assert!(NetworkEvent::from_json(json).is_err());
    }
}
