// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorContext, Result};
use crate::network::{FilterPolicy, FilterRuleConfig, NetworkEventType, WebSocketMessageType};

/// Default number of events kept in memory
pub const DEFAULT_MAX_EVENTS: usize = 10_000;

/// Default body capture limit (1MB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default live subscriber buffer
pub const DEFAULT_BROADCAST_CAPACITY: usize = 1024;

/// Capture configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Maximum events held by a recorder; the oldest are dropped first
    pub max_events: usize,
    /// Keep request/response bodies and frame payloads
    pub capture_bodies: bool,
    /// Bodies longer than this many bytes are truncated
    pub max_body_size: usize,
    /// Buffer size of the live event channel
    pub broadcast_capacity: usize,
    /// Filter rules applied to every recorded event
    pub filters: Vec<FilterRuleConfig>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
            capture_bodies: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
            filters: vec![],
        }
    }
}

impl CaptureConfig {
    /// Create a new capture config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max events
    pub fn max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Set body capture settings
    pub fn capture_bodies(mut self, capture: bool, max_size: usize) -> Self {
        self.capture_bodies = capture;
        self.max_body_size = max_size;
        self
    }

    /// Set live channel capacity
    pub fn broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Add a filter rule
    pub fn filter(mut self, rule: FilterRuleConfig) -> Self {
        self.filters.push(rule);
        self
    }

    /// Keep everything, with a large buffer
    pub fn for_auditing() -> Self {
        Self {
            max_events: 100_000,
            max_body_size: 10 * 1024 * 1024,
            ..Default::default()
        }
    }

    /// Drop bodies and hide keep-alive noise (ping/pong frames)
    pub fn headers_only() -> Self {
        Self {
            capture_bodies: false,
            max_body_size: 0,
            filters: vec![
                FilterRuleConfig::MessageType(WebSocketMessageType::Ping),
                FilterRuleConfig::MessageType(WebSocketMessageType::Pong),
            ],
            ..Default::default()
        }
    }

    /// Hide all WebSocket frames
    pub fn without_websocket_frames(self) -> Self {
        self.filter(FilterRuleConfig::EventType(NetworkEventType::WebSocketMessage))
    }

    /// Check that values are usable
    pub fn validate(&self) -> Result<()> {
        if self.max_events == 0 {
            return Err(Error::config("max_events must be greater than 0"));
        }
        if self.broadcast_capacity == 0 {
            return Err(Error::config("broadcast_capacity must be greater than 0"));
        }
        self.filter_policy().map(|_| ())
    }

    /// Compile the configured filter rules
    pub fn filter_policy(&self) -> Result<FilterPolicy> {
        FilterPolicy::from_config(&self.filters)
    }

    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_path(path)?;
        let config: CaptureConfig = serde_json::from_str(&text).with_path(path)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), filters = config.filters.len(), "Loaded capture config");
        Ok(config)
    }
}
