// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network event model
//!
//! Typed records for captured HTTP and WebSocket traffic, the codec for their
//! type identifiers, and a reference recorder that produces them.

mod event;
mod filter;
mod recorder;
mod stats;
mod types;

pub use event::{NetworkEvent, DEFAULT_STATUS_CODE, PLACEHOLDER_URL};
pub use filter::{FilterPolicy, FilterRule, FilterRuleConfig};
pub use recorder::{EventCallback, EventRecorder};
pub use stats::CaptureStats;
pub use types::{NetworkEventType, WebSocketMessageType};
