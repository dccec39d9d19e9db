// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # DataSipper - Network Event Model
//!
//! The capture core of an in-browser traffic inspector. Defines what a
//! captured network event is, keeps the event type taxonomy consistent and
//! provides a stable textual encoding for every event kind, so loggers,
//! filters, UI and serializers agree on meaning without sharing code.
//!
//! ## Features
//!
//! - Typed records for HTTP requests/responses, WebSocket lifecycle and frames
//! - Canonical identifiers (`http_request`, `websocket_message`, ...) with a
//!   lenient and a strict decoder
//! - Reference recorder: atomic ids, per-session ordering, bounded log,
//!   live subscribers
//! - Filtering policy that marks events instead of dropping them
//! - Capture statistics and JSON Lines export
//!
//! ## Example
//!
//! ```rust
//! use datasipper::{EventRecorder, NetworkEventType};
//!
//! let recorder = EventRecorder::new();
//! let request = recorder
//!     .http_request("tab-1", "GET", "https://example.com/", "", "")
//!     .unwrap();
//! recorder.http_response(&request, 200, "content-type: text/html", "<html></html>");
//!
//! assert_eq!(NetworkEventType::HttpResponse.as_str(), "http_response");
//! assert_eq!(NetworkEventType::decode("http_response"), NetworkEventType::HttpResponse);
//! assert_eq!(recorder.stats().count(NetworkEventType::HttpResponse), 1);
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod network;
pub mod time;

// Re-exports for convenience

// Configuration
pub use config::CaptureConfig;

// Errors
pub use error::{Error, ErrorContext, Result};

// Network
pub use network::{NetworkEvent, NetworkEventType, WebSocketMessageType};
pub use network::{EventCallback, EventRecorder};
pub use network::{FilterPolicy, FilterRule, FilterRuleConfig};
pub use network::CaptureStats;

// Time
pub use time::Timestamp;

/// DataSipper version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
