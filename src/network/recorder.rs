// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-memory event recorder
//!
//! The recorder is the producer-side half of the capture contract: it hands
//! out ids and timestamps, applies the body and filter policies, keeps a
//! bounded log and forwards every event to live subscribers.
//!
//! `record` is the only place events are emitted. Stamping, storing and
//! broadcasting an event all happen while its session's entry is held, so
//! within a session the log and the live channel see ids and timestamps in
//! non-decreasing order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use url::Url;

use super::event::NetworkEvent;
use super::filter::FilterPolicy;
use super::stats::CaptureStats;
use super::types::{NetworkEventType, WebSocketMessageType};
use crate::config::CaptureConfig;
use crate::error::Result;
use crate::time::Timestamp;

/// Callback invoked for every recorded event
pub type EventCallback = Arc<dyn Fn(&NetworkEvent) + Send + Sync>;

/// Per-session capture state
#[derive(Debug, Default)]
struct SessionState {
    /// Timestamp of the last event emitted for the session
    last_timestamp: Option<Timestamp>,
    /// A WebSocket connection is open on the session
    open: bool,
    /// Frame bytes sent since the connection opened
    frame_bytes_sent: u64,
    /// Frame bytes received since the connection opened
    frame_bytes_received: u64,
    /// Events of the session still in the log
    stored: usize,
}

impl SessionState {
    /// Current time, clamped so it never goes before the last one handed out
    fn next_timestamp(&mut self) -> Timestamp {
        let now = Timestamp::now();
        let timestamp = self.last_timestamp.map_or(now, |last| last.max(now));
        self.last_timestamp = Some(timestamp);
        timestamp
    }

    /// Track connection state and frame byte totals
    fn observe(&mut self, event: &NetworkEvent) {
        match event.event_type {
            NetworkEventType::WebSocketConnect => {
                self.open = true;
                self.frame_bytes_sent = 0;
                self.frame_bytes_received = 0;
            }
            NetworkEventType::WebSocketMessage => {
                self.frame_bytes_sent = self.frame_bytes_sent.saturating_add(event.bytes_sent);
                self.frame_bytes_received =
                    self.frame_bytes_received.saturating_add(event.bytes_received);
            }
            _ => {}
        }
    }

    /// Close the connection and return its (sent, received) frame totals
    fn close(&mut self) -> (u64, u64) {
        self.open = false;
        (
            std::mem::take(&mut self.frame_bytes_sent),
            std::mem::take(&mut self.frame_bytes_received),
        )
    }
}

/// Records network events for one capture session
///
/// Cloning is cheap and clones share the same log, id counter and channel.
#[derive(Clone)]
pub struct EventRecorder {
    /// Captured events, oldest first
    events: Arc<RwLock<VecDeque<NetworkEvent>>>,
    /// Next id to hand out
    next_id: Arc<AtomicU64>,
    /// Sessions with stored events or an open connection
    sessions: Arc<DashMap<String, SessionState>>,
    /// Filter policy applied on record
    filter: Arc<RwLock<FilterPolicy>>,
    /// Event callbacks
    callbacks: Arc<RwLock<Vec<EventCallback>>>,
    /// Live event channel
    sender: broadcast::Sender<NetworkEvent>,
    /// Maximum events to store
    max_events: usize,
    /// Capture bodies and payloads
    capture_bodies: bool,
    /// Maximum body size to keep
    max_body_size: usize,
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRecorder {
    /// Create a recorder with default settings and no filters
    pub fn new() -> Self {
        let defaults = CaptureConfig::default();
        let (sender, _) = broadcast::channel(defaults.broadcast_capacity);
        Self {
            events: Arc::new(RwLock::new(VecDeque::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            sessions: Arc::new(DashMap::new()),
            filter: Arc::new(RwLock::new(FilterPolicy::new())),
            callbacks: Arc::new(RwLock::new(Vec::new())),
            sender,
            max_events: defaults.max_events,
            capture_bodies: defaults.capture_bodies,
            max_body_size: defaults.max_body_size,
        }
    }

    /// Create a recorder from configuration
    pub fn with_config(config: &CaptureConfig) -> Result<Self> {
        config.validate()?;
        let (sender, _) = broadcast::channel(config.broadcast_capacity);
        let recorder = Self {
            sender,
            max_events: config.max_events,
            capture_bodies: config.capture_bodies,
            max_body_size: config.max_body_size,
            ..Self::new()
        };
        *recorder.filter.write() = config.filter_policy()?;
        Ok(recorder)
    }

    /// Set max events
    pub fn max_events(mut self, max: usize) -> Self {
        self.max_events = max.max(1);
        self
    }

    /// Set body capture settings
    pub fn capture_bodies(mut self, capture: bool, max_size: usize) -> Self {
        self.capture_bodies = capture;
        self.max_body_size = max_size;
        self
    }

    /// Set filter policy
    pub fn filter_policy(self, policy: FilterPolicy) -> Self {
        *self.filter.write() = policy;
        self
    }

    /// Register a callback for every recorded event
    pub fn on_event(self, callback: EventCallback) -> Self {
        self.callbacks.write().push(callback);
        self
    }

    /// Replace the filter policy on a running recorder
    ///
    /// Already recorded events keep their flag.
    pub fn set_filter_policy(&self, policy: FilterPolicy) {
        *self.filter.write() = policy;
    }

    /// Subscribe to events recorded from now on
    pub fn subscribe(&self) -> broadcast::Receiver<NetworkEvent> {
        self.sender.subscribe()
    }

    /// Start an event that `record` will stamp and store
    ///
    /// The draft has no id yet; its timestamp is provisional.
    pub fn begin(&self, session_id: &str, event_type: NetworkEventType, url: &str) -> Result<NetworkEvent> {
        let url = Url::parse(url)?;
        Ok(self.begin_with_url(session_id, event_type, url))
    }

    /// Start an event for an already parsed URL
    pub fn begin_with_url(&self, session_id: &str, event_type: NetworkEventType, url: Url) -> NetworkEvent {
        NetworkEvent::new(0, session_id, event_type, url).with_timestamp(Timestamp::now())
    }

    /// Record an event
    ///
    /// The event always gets a fresh id and timestamp here, replacing any the
    /// caller set. Returns the event as stored, after body and filter
    /// policies were applied.
    pub fn record(&self, event: NetworkEvent) -> NetworkEvent {
        self.emit(event, |_, _| {})
    }

    /// Record an outgoing HTTP request
    pub fn http_request(
        &self,
        session_id: &str,
        method: &str,
        url: &str,
        headers: &str,
        body: &str,
    ) -> Result<NetworkEvent> {
        let event = self
            .begin(session_id, NetworkEventType::HttpRequest, url)?
            .with_method(method)
            .with_request_headers(headers)
            .with_request_body(body)
            .with_bytes(body.len() as u64, 0);
        Ok(self.record(event))
    }

    /// Record the response to a previously recorded request
    pub fn http_response(
        &self,
        request: &NetworkEvent,
        status_code: i32,
        headers: &str,
        body: &str,
    ) -> NetworkEvent {
        let mut event = self.begin_with_url(
            &request.session_id,
            NetworkEventType::HttpResponse,
            request.url.clone(),
        );
        event.attach_response(status_code, headers, body);
        event.bytes_received = body.len() as u64;
        self.emit(event, |event, _| {
            event.duration = event.timestamp.saturating_duration_since(request.timestamp);
        })
    }

    /// Record a WebSocket handshake
    ///
    /// Frame byte totals for the session start again from zero.
    pub fn websocket_connect(&self, session_id: &str, url: &str) -> Result<NetworkEvent> {
        let event = self.begin(session_id, NetworkEventType::WebSocketConnect, url)?;
        Ok(self.record(event))
    }

    /// Record a text or control frame on an open connection
    pub fn websocket_message(
        &self,
        connect: &NetworkEvent,
        message_type: WebSocketMessageType,
        payload: &str,
        outgoing: bool,
    ) -> NetworkEvent {
        let mut event = self.frame(connect, message_type);
        if outgoing {
            event.request_body = payload.to_string();
            event.bytes_sent = payload.len() as u64;
        } else {
            event.response_body = payload.to_string();
            event.bytes_received = payload.len() as u64;
        }
        self.record(event)
    }

    /// Record a binary frame; the payload is stored base64-encoded
    pub fn websocket_binary_message(
        &self,
        connect: &NetworkEvent,
        payload: &[u8],
        outgoing: bool,
    ) -> NetworkEvent {
        let mut event = self.frame(connect, WebSocketMessageType::Binary);
        if outgoing {
            event.set_binary_request_body(payload);
            event.bytes_sent = payload.len() as u64;
        } else {
            event.set_binary_response_body(payload);
            event.bytes_received = payload.len() as u64;
        }
        self.record(event)
    }

    /// Record a connection close
    ///
    /// `code` is the close code, `reason` goes into metadata. Byte counters
    /// carry the totals of every frame recorded since the connect, including
    /// frames already evicted from the log or marked filtered.
    pub fn websocket_disconnect(&self, connect: &NetworkEvent, code: i32, reason: &str) -> NetworkEvent {
        let event = self
            .begin_with_url(
                &connect.session_id,
                NetworkEventType::WebSocketDisconnect,
                connect.url.clone(),
            )
            .with_status(code)
            .with_metadata(reason);
        self.emit(event, |event, session| {
            let (sent, received) = session.close();
            event.bytes_sent = sent;
            event.bytes_received = received;
            event.duration = event.timestamp.saturating_duration_since(connect.timestamp);
        })
    }

    /// Record a network-level failure
    pub fn error(&self, session_id: &str, url: &str, code: i32, message: &str) -> Result<NetworkEvent> {
        let event = self
            .begin(session_id, NetworkEventType::Error, url)?
            .with_status(code)
            .with_metadata(message);
        Ok(self.record(event))
    }

    /// Get all captured events
    pub fn events(&self) -> Vec<NetworkEvent> {
        self.events.read().iter().cloned().collect()
    }

    /// Get events not marked filtered
    pub fn visible_events(&self) -> Vec<NetworkEvent> {
        self.filter_events(|e| !e.is_filtered)
    }

    /// Get events by type
    pub fn events_by_type(&self, event_type: NetworkEventType) -> Vec<NetworkEvent> {
        self.filter_events(|e| e.event_type == event_type)
    }

    /// Get events of one session
    pub fn events_for_session(&self, session_id: &str) -> Vec<NetworkEvent> {
        self.filter_events(|e| e.session_id == session_id)
    }

    /// Get events whose URL host equals `host` (case-insensitive)
    pub fn events_for_host(&self, host: &str) -> Vec<NetworkEvent> {
        self.filter_events(|e| {
            e.host()
                .map(|h| h.eq_ignore_ascii_case(host))
                .unwrap_or(false)
        })
    }

    /// Get unique session ids, sorted
    pub fn sessions(&self) -> Vec<String> {
        let mut sessions: Vec<String> = self
            .events
            .read()
            .iter()
            .map(|e| e.session_id.clone())
            .collect();
        sessions.sort();
        sessions.dedup();
        sessions
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    /// Clear all events
    ///
    /// Id allocation continues where it left off so ids stay unique. State is
    /// kept only for sessions with an open WebSocket connection.
    pub fn clear(&self) {
        self.events.write().clear();
        self.sessions.retain(|_, session| {
            session.stored = 0;
            session.open
        });
    }

    /// Statistics over the stored events
    pub fn stats(&self) -> CaptureStats {
        CaptureStats::from_events(self.events.read().iter())
    }

    /// Export events as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.events())
    }

    /// Stamp, store and broadcast an event under its session's entry
    ///
    /// `prepare` runs after stamping with the session state at hand.
    /// Callbacks run once the entry is released, so they may record again.
    fn emit<F>(&self, mut event: NetworkEvent, prepare: F) -> NetworkEvent
    where
        F: FnOnce(&mut NetworkEvent, &mut SessionState),
    {
        let evicted = {
            let mut session = self.sessions.entry(event.session_id.clone()).or_default();
            event.id = self.next_id.fetch_add(1, Ordering::SeqCst);
            event.timestamp = session.next_timestamp();
            session.observe(&event);
            prepare(&mut event, &mut *session);

            self.apply_body_policy(&mut event);
            self.filter.read().apply(&mut event);

            let evicted = self.store_event(event.clone());
            session.stored += 1;

            // No subscribers is fine
            let _ = self.sender.send(event.clone());
            evicted
        };
        self.release(evicted);

        tracing::debug!(
            id = event.id,
            session = %event.session_id,
            kind = %event.event_type,
            url = %event.url,
            filtered = event.is_filtered,
            "Recorded event"
        );

        let callbacks: Vec<EventCallback> = self.callbacks.read().clone();
        for callback in &callbacks {
            callback(&event);
        }
        event
    }

    /// Drop state of sessions whose last stored event was evicted
    fn release(&self, evicted: Vec<String>) {
        for session_id in evicted {
            let removed = self.sessions.remove_if_mut(&session_id, |_, session| {
                session.stored = session.stored.saturating_sub(1);
                session.stored == 0 && !session.open
            });
            if removed.is_some() {
                tracing::trace!(session = %session_id, "Released session state");
            }
        }
    }

    fn frame(&self, connect: &NetworkEvent, message_type: WebSocketMessageType) -> NetworkEvent {
        self.begin_with_url(
            &connect.session_id,
            NetworkEventType::WebSocketMessage,
            connect.url.clone(),
        )
        .with_message_type(message_type)
    }

    fn apply_body_policy(&self, event: &mut NetworkEvent) {
        if !self.capture_bodies {
            event.request_body.clear();
            event.response_body.clear();
            return;
        }
        // Base64 bodies are cut on a whole 4-character group so they still decode
        let max = if event.message_type == Some(WebSocketMessageType::Binary) {
            self.max_body_size - self.max_body_size % 4
        } else {
            self.max_body_size
        };
        let truncated = truncate_body(&mut event.request_body, max)
            | truncate_body(&mut event.response_body, max);
        if truncated {
            tracing::trace!(id = event.id, max, "Body truncated");
        }
    }

    fn filter_events(&self, predicate: impl Fn(&NetworkEvent) -> bool) -> Vec<NetworkEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    /// Store an event (with max limit), returning sessions of evicted events
    fn store_event(&self, event: NetworkEvent) -> Vec<String> {
        let mut events = self.events.write();
        let mut evicted = Vec::new();
        while events.len() >= self.max_events {
            match events.pop_front() {
                Some(dropped) => {
                    tracing::trace!(id = dropped.id, "Dropped oldest event");
                    evicted.push(dropped.session_id);
                }
                None => break,
            }
        }
        events.push_back(event);
        evicted
    }
}

/// Truncate to at most `max` bytes without splitting a character
fn truncate_body(body: &mut String, max: usize) -> bool {
    if body.len() <= max {
        return false;
    }
    let mut cut = max;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    body.truncate(cut);
    true
}
