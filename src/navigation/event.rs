//! # Navigation Events
//!
//! One event per completed navigation attempt, handed to every registered
//! `NavigationObserver` after the stack mutation is applied.

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use super::stack::StackOp;
use crate::routing::DecisionKind;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Info,
    /// The requested route did not exist.
    Error,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NavigationEvent {
    pub timestamp: DateTime<Utc>,
    /// Top route before the operation.
    pub origin_route: String,
    /// Route the caller asked for.
    pub target_route: String,
    /// Top route after the operation (differs from target on redirects).
    pub landed_route: String,
    pub decision: DecisionKind,
    pub requires_auth: bool,
    /// Mutation actually applied, which for redirects is not the one requested.
    pub operation: StackOp,
    pub level: EventLevel,
}

pub trait NavigationObserver: Send + Sync {
    fn on_navigation(&self, event: &NavigationEvent);
}

/// Writes each event to the `log` facade.
pub struct LogObserver;

impl NavigationObserver for LogObserver {
    fn on_navigation(&self, event: &NavigationEvent) {
        match event.level {
            EventLevel::Info => info!(
                "Navigation {:?}: {} -> {} ({:?}, landed on {})",
                event.operation,
                event.origin_route,
                event.target_route,
                event.decision,
                event.landed_route
            ),
            EventLevel::Error => warn!(
                "Navigation to unknown route '{}' from {}",
                event.target_route, event.origin_route
            ),
        }
    }
}

/// Forwards events to a channel, for telemetry collectors running elsewhere.
pub struct ChannelObserver {
    sender: UnboundedSender<NavigationEvent>,
}

impl ChannelObserver {
    pub fn new(sender: UnboundedSender<NavigationEvent>) -> Self {
        Self { sender }
    }
}

impl NavigationObserver for ChannelObserver {
    fn on_navigation(&self, event: &NavigationEvent) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.sender.send(event.clone());
    }
}
