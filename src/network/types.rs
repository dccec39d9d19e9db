// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Event type taxonomy and its textual codec
//!
//! The canonical identifiers produced by `as_str` are the vocabulary every
//! consumer of the event stream agrees on. Encoding is an exhaustive match so
//! a new variant cannot be added without giving it an identifier.
//!
//! Two decoders exist:
//! - `decode` never fails and maps anything unrecognized to a fixed fallback.
//! - `FromStr` (and serde deserialization) rejects unrecognized input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Phase or kind of a captured network occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NetworkEventType {
    /// Outgoing HTTP request
    #[default]
    HttpRequest,
    /// HTTP response received
    HttpResponse,
    /// WebSocket handshake completed
    WebSocketConnect,
    /// WebSocket frame sent or received
    WebSocketMessage,
    /// WebSocket connection closed
    WebSocketDisconnect,
    /// Network-level failure
    Error,
}

impl NetworkEventType {
    /// Every event type, in declaration order
    pub const ALL: [NetworkEventType; 6] = [
        NetworkEventType::HttpRequest,
        NetworkEventType::HttpResponse,
        NetworkEventType::WebSocketConnect,
        NetworkEventType::WebSocketMessage,
        NetworkEventType::WebSocketDisconnect,
        NetworkEventType::Error,
    ];

    /// Type substituted by `decode` for unrecognized identifiers
    pub const FALLBACK: NetworkEventType = NetworkEventType::HttpRequest;

    /// Canonical identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkEventType::HttpRequest => "http_request",
            NetworkEventType::HttpResponse => "http_response",
            NetworkEventType::WebSocketConnect => "websocket_connect",
            NetworkEventType::WebSocketMessage => "websocket_message",
            NetworkEventType::WebSocketDisconnect => "websocket_disconnect",
            NetworkEventType::Error => "error",
        }
    }

    /// Lenient decode: unrecognized identifiers become `HttpRequest`
    ///
    /// Matching is exact and case-sensitive. Use `str::parse` when an unknown
    /// identifier must be reported instead of aliased.
    pub fn decode(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::debug!(identifier = s, fallback = Self::FALLBACK.as_str(), "Unrecognized event type");
            Self::FALLBACK
        })
    }

    /// HTTP request or response
    pub fn is_http(&self) -> bool {
        matches!(self, NetworkEventType::HttpRequest | NetworkEventType::HttpResponse)
    }

    /// Any WebSocket lifecycle or frame event
    pub fn is_websocket(&self) -> bool {
        matches!(
            self,
            NetworkEventType::WebSocketConnect
                | NetworkEventType::WebSocketMessage
                | NetworkEventType::WebSocketDisconnect
        )
    }
}

impl FromStr for NetworkEventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http_request" => Ok(NetworkEventType::HttpRequest),
            "http_response" => Ok(NetworkEventType::HttpResponse),
            "websocket_connect" => Ok(NetworkEventType::WebSocketConnect),
            "websocket_message" => Ok(NetworkEventType::WebSocketMessage),
            "websocket_disconnect" => Ok(NetworkEventType::WebSocketDisconnect),
            "error" => Ok(NetworkEventType::Error),
            _ => Err(Error::UnknownEventType(s.to_string())),
        }
    }
}

impl fmt::Display for NetworkEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NetworkEventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NetworkEventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Sub-classification of `WebSocketMessage` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WebSocketMessageType {
    #[default]
    Text,
    Binary,
    Ping,
    Pong,
    Close,
}

impl WebSocketMessageType {
    /// Every message type, in declaration order
    pub const ALL: [WebSocketMessageType; 5] = [
        WebSocketMessageType::Text,
        WebSocketMessageType::Binary,
        WebSocketMessageType::Ping,
        WebSocketMessageType::Pong,
        WebSocketMessageType::Close,
    ];

    /// Type substituted by `decode` for unrecognized identifiers
    pub const FALLBACK: WebSocketMessageType = WebSocketMessageType::Text;

    /// Canonical identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            WebSocketMessageType::Text => "text",
            WebSocketMessageType::Binary => "binary",
            WebSocketMessageType::Ping => "ping",
            WebSocketMessageType::Pong => "pong",
            WebSocketMessageType::Close => "close",
        }
    }

    /// Lenient decode: unrecognized identifiers become `Text`
    pub fn decode(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::debug!(identifier = s, fallback = Self::FALLBACK.as_str(), "Unrecognized message type");
            Self::FALLBACK
        })
    }

    /// Map an RFC 6455 frame opcode. Continuation (0x0) and reserved opcodes
    /// have no message type.
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            0x1 => Some(WebSocketMessageType::Text),
            0x2 => Some(WebSocketMessageType::Binary),
            0x8 => Some(WebSocketMessageType::Close),
            0x9 => Some(WebSocketMessageType::Ping),
            0xA => Some(WebSocketMessageType::Pong),
            _ => None,
        }
    }

    /// RFC 6455 frame opcode
    pub fn opcode(&self) -> u8 {
        match self {
            WebSocketMessageType::Text => 0x1,
            WebSocketMessageType::Binary => 0x2,
            WebSocketMessageType::Close => 0x8,
            WebSocketMessageType::Ping => 0x9,
            WebSocketMessageType::Pong => 0xA,
        }
    }

    /// Control frames (close, ping, pong) carry no application data
    pub fn is_control(&self) -> bool {
        self.opcode() & 0x8 != 0
    }
}

impl FromStr for WebSocketMessageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(WebSocketMessageType::Text),
            "binary" => Ok(WebSocketMessageType::Binary),
            "ping" => Ok(WebSocketMessageType::Ping),
            "pong" => Ok(WebSocketMessageType::Pong),
            "close" => Ok(WebSocketMessageType::Close),
            _ => Err(Error::UnknownMessageType(s.to_string())),
        }
    }
}

impl fmt::Display for WebSocketMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WebSocketMessageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WebSocketMessageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: [&str; 6] = [
        "http_request",
        "http_response",
        "websocket_connect",
        "websocket_message",
        "websocket_disconnect",
        "error",
    ];

    #[test]
    fn test_decode_inverts_encode() {
        for t in NetworkEventType::ALL {
            assert_eq!(NetworkEventType::decode(t.as_str()), t);
        }
    }

    #[test]
    fn test_encode_inverts_decode_for_canonical() {
        for s in CANONICAL {
            assert_eq!(NetworkEventType::decode(s).as_str(), s);
        }
    }

    #[test]
    fn test_identifiers_are_distinct() {
        let mut ids: Vec<&str> = NetworkEventType::ALL.iter().map(|t| t.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), NetworkEventType::ALL.len());
    }

    #[test]
    fn test_decode_fallback() {
        for s in ["bogus", "", "HTTP_REQUEST", "Error", " error", "not_a_real_type"] {
            assert_eq!(NetworkEventType::decode(s), NetworkEventType::HttpRequest, "input {:?}", s);
        }
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        let err = "not_a_real_type".parse::<NetworkEventType>().unwrap_err();
        assert!(matches!(err, Error::UnknownEventType(ref s) if s == "not_a_real_type"));

        assert!("".parse::<NetworkEventType>().is_err());
        assert_eq!("error".parse::<NetworkEventType>().unwrap(), NetworkEventType::Error);
    }

    #[test]
    fn test_websocket_disconnect_scenario() {
        assert_eq!(NetworkEventType::WebSocketDisconnect.as_str(), "websocket_disconnect");
        assert_eq!(
            NetworkEventType::decode("websocket_disconnect"),
            NetworkEventType::WebSocketDisconnect
        );
    }

    #[test]
    fn test_decode_scenario() {
        assert_eq!(NetworkEventType::decode("http_response"), NetworkEventType::HttpResponse);
        assert_eq!(NetworkEventType::decode("error"), NetworkEventType::Error);
        assert_eq!(NetworkEventType::decode("not_a_real_type"), NetworkEventType::HttpRequest);
    }

    #[test]
    fn test_categories() {
        assert!(NetworkEventType::HttpResponse.is_http());
        assert!(!NetworkEventType::HttpResponse.is_websocket());
        assert!(NetworkEventType::WebSocketMessage.is_websocket());
        assert!(!NetworkEventType::Error.is_http());
        assert!(!NetworkEventType::Error.is_websocket());
    }

    #[test]
    fn test_serde_uses_canonical_identifiers() {
        let json = serde_json::to_string(&NetworkEventType::WebSocketConnect).unwrap();
        assert_eq!(json, "\"websocket_connect\"");

        let back: NetworkEventType = serde_json::from_str("\"http_response\"").unwrap();
        assert_eq!(back, NetworkEventType::HttpResponse);

        assert!(serde_json::from_str::<NetworkEventType>("\"bogus\"").is_err());
    }

    #[test]
    fn test_message_type_codec() {
        for t in WebSocketMessageType::ALL {
            assert_eq!(WebSocketMessageType::decode(t.as_str()), t);
            assert_eq!(t.to_string().parse::<WebSocketMessageType>().unwrap(), t);
        }
        assert_eq!(WebSocketMessageType::decode("continuation"), WebSocketMessageType::Text);
        assert!("PING".parse::<WebSocketMessageType>().is_err());
    }

    #[test]
    fn test_message_type_opcodes() {
        for t in WebSocketMessageType::ALL {
            assert_eq!(WebSocketMessageType::from_opcode(t.opcode()), Some(t));
        }
        assert_eq!(WebSocketMessageType::from_opcode(0x0), None);
        assert_eq!(WebSocketMessageType::from_opcode(0x3), None);

        assert!(WebSocketMessageType::Ping.is_control());
        assert!(WebSocketMessageType::Close.is_control());
        assert!(!WebSocketMessageType::Binary.is_control());
    }
}
