// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Filtering policy
//!
//! A filter never drops a record. Matching events get `is_filtered` set so
//! downstream consumers can hide them while the capture log keeps them.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::event::NetworkEvent;
use super::types::{NetworkEventType, WebSocketMessageType};
use crate::error::Result;

/// A single compiled filter rule
#[derive(Debug, Clone)]
pub enum FilterRule {
    /// Host equals this domain or is a subdomain of it (case-insensitive)
    Host(String),
    /// Regex matched against the full URL
    UrlPattern(Regex),
    /// Event kind
    EventType(NetworkEventType),
    /// HTTP method (case-insensitive)
    Method(String),
    /// WebSocket frame sub-type
    MessageType(WebSocketMessageType),
}

impl FilterRule {
    /// Check whether the rule matches an event
    pub fn matches(&self, event: &NetworkEvent) -> bool {
        match self {
            FilterRule::Host(domain) => event
                .host()
                .map(|host| host_matches(host, domain))
                .unwrap_or(false),
            FilterRule::UrlPattern(re) => re.is_match(event.url.as_str()),
            FilterRule::EventType(t) => event.event_type == *t,
            FilterRule::Method(method) => {
                !event.method.is_empty() && event.method.eq_ignore_ascii_case(method)
            }
            FilterRule::MessageType(t) => event.message_type == Some(*t),
        }
    }
}

/// Serializable form of a filter rule, as found in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FilterRuleConfig {
    Host(String),
    UrlPattern(String),
    EventType(NetworkEventType),
    Method(String),
    MessageType(WebSocketMessageType),
}

impl FilterRuleConfig {
    /// Compile into a usable rule
    pub fn compile(&self) -> Result<FilterRule> {
        Ok(match self {
            FilterRuleConfig::Host(domain) => {
                FilterRule::Host(domain.trim_start_matches('.').to_ascii_lowercase())
            }
            FilterRuleConfig::UrlPattern(pattern) => FilterRule::UrlPattern(Regex::new(pattern)?),
            FilterRuleConfig::EventType(t) => FilterRule::EventType(*t),
            FilterRuleConfig::Method(method) => FilterRule::Method(method.clone()),
            FilterRuleConfig::MessageType(t) => FilterRule::MessageType(*t),
        })
    }
}

/// Set of rules; an event is filtered when any rule matches
#[derive(Debug, Clone, Default)]
pub struct FilterPolicy {
    rules: Vec<FilterRule>,
}

impl FilterPolicy {
    /// Create an empty policy that filters nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a policy from configuration
    pub fn from_config(rules: &[FilterRuleConfig]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(FilterRuleConfig::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Add a rule
    pub fn rule(mut self, rule: FilterRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Filter a host and its subdomains
    pub fn host(self, domain: impl Into<String>) -> Self {
        let domain = domain.into().trim_start_matches('.').to_ascii_lowercase();
        self.rule(FilterRule::Host(domain))
    }

    /// Filter an event type
    pub fn event_type(self, event_type: NetworkEventType) -> Self {
        self.rule(FilterRule::EventType(event_type))
    }

    /// Filter URLs matching a regex
    pub fn url_pattern(self, pattern: &str) -> Result<Self> {
        Ok(self.rule(FilterRule::UrlPattern(Regex::new(pattern)?)))
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the policy has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check whether any rule matches
    pub fn matches(&self, event: &NetworkEvent) -> bool {
        self.rules.iter().any(|rule| rule.matches(event))
    }

    /// Mark the event filtered if any rule matches
    ///
    /// An event already marked filtered by the producer stays filtered.
    /// Returns the resulting flag.
    pub fn apply(&self, event: &mut NetworkEvent) -> bool {
        if !event.is_filtered && self.matches(event) {
            tracing::trace!(id = event.id, url = %event.url, "Event filtered");
            event.set_filtered(true);
        }
        event.is_filtered
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    if domain.is_empty() {
        return false;
    }
    let host = host.to_ascii_lowercase();
    host == domain
        || host
            .strip_suffix(domain)
            .map(|prefix| prefix.ends_with('.'))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn event(url: &str, event_type: NetworkEventType) -> NetworkEvent {
        NetworkEvent::new(1, "s", event_type, Url::parse(url).unwrap())
    }

    #[test]
    fn test_host_rule() {
        let policy = FilterPolicy::new().host("Tracker.com");

        assert!(policy.matches(&event("https://tracker.com/p", NetworkEventType::HttpRequest)));
        assert!(policy.matches(&event("https://cdn.TRACKER.com/p", NetworkEventType::HttpRequest)));
        assert!(!policy.matches(&event("https://nottracker.com/p", NetworkEventType::HttpRequest)));
        assert!(!policy.matches(&event("https://tracker.com.evil.net/", NetworkEventType::HttpRequest)));
    }

    #[test]
    fn test_apply_keeps_record() {
        let policy = FilterPolicy::new().event_type(NetworkEventType::WebSocketMessage);
        let mut frame = event("wss://a.test/ws", NetworkEventType::WebSocketMessage);
        let mut request = event("https://a.test/", NetworkEventType::HttpRequest);

        assert!(policy.apply(&mut frame));
        assert!(frame.is_filtered);
        assert!(!policy.apply(&mut request));
        assert!(!request.is_filtered);
    }

    #[test]
    fn test_apply_preserves_producer_flag() {
        let policy = FilterPolicy::new();
        let mut pre = event("https://a.test/", NetworkEventType::HttpRequest).filtered();

        assert!(policy.apply(&mut pre));
    }

    #[test]
    fn test_method_and_message_rules() {
        let policy = FilterPolicy::new()
            .rule(FilterRule::Method("options".to_string()))
            .rule(FilterRule::MessageType(WebSocketMessageType::Ping));

        let preflight = event("https://a.test/", NetworkEventType::HttpRequest).with_method("OPTIONS");
        let get = event("https://a.test/", NetworkEventType::HttpRequest).with_method("GET");
        let ping = event("wss://a.test/", NetworkEventType::WebSocketMessage)
            .with_message_type(WebSocketMessageType::Ping);

        assert!(policy.matches(&preflight));
        assert!(!policy.matches(&get));
        assert!(policy.matches(&ping));
    }

    #[test]
    fn test_from_config() {
        let json = r#"[
            {"kind": "host", "value": "ads.example"},
            {"kind": "url_pattern", "value": "\\.png$"},
            {"kind": "event_type", "value": "error"}
        ]"#;
        let rules: Vec<FilterRuleConfig> = serde_json::from_str(json).unwrap();
        let policy = FilterPolicy::from_config(&rules).unwrap();

        assert_eq!(policy.len(), 3);
        assert!(policy.matches(&event("https://x.test/logo.png", NetworkEventType::HttpRequest)));
        assert!(policy.matches(&event("https://x.test/", NetworkEventType::Error)));
        assert!(!policy.matches(&event("https://x.test/index.html", NetworkEventType::HttpRequest)));
    }

    #[test]
    fn test_url_pattern_builder() {
        let policy = FilterPolicy::new().url_pattern(r"/static/.*\.js$").unwrap();

        assert_eq!(policy.len(), 1);
        assert!(policy.matches(&event("https://a.test/static/app.js", NetworkEventType::HttpRequest)));
        assert!(!policy.matches(&event("https://a.test/api/app.json", NetworkEventType::HttpRequest)));
        assert!(FilterPolicy::new().url_pattern("[").is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = FilterRuleConfig::UrlPattern("(".to_string()).compile().unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidPattern(_)));
    }
}
