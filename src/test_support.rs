//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

use crate::auth::{AuthStateProbe, ProbeError};
use crate::core::routes::FormEditorParams;
use crate::navigation::{ChannelObserver, NavigationController, NavigationEvent, NavigationObserver};
use crate::routing::{ParamSchema, RouteDefinition, RouteResolver, RouteTable, WellKnownRoutes};
use crate::screen::TextScreens;

/// `{home, login, about, not_found}` public; `{dashboard, settings, form_editor}` guarded.
pub fn scenario_table() -> RouteTable {
    RouteTable::from_definitions([
        RouteDefinition::public("home"),
        RouteDefinition::public("login"),
        RouteDefinition::public("about"),
        RouteDefinition::public("not_found"),
        RouteDefinition::guarded("dashboard"),
        RouteDefinition::guarded("settings"),
        RouteDefinition::guarded("form_editor").with_params(ParamSchema::of::<FormEditorParams>()),
    ])
    .expect("scenario table has unique names")
}

/// A controller over `scenario_table()` with a channel observer attached.
pub async fn scenario_controller(
    probe: Arc<dyn AuthStateProbe>,
) -> (NavigationController, UnboundedReceiver<NavigationEvent>) {
    let resolver = RouteResolver::new(Arc::new(scenario_table()), WellKnownRoutes::default())
        .expect("scenario table has the well-known routes");
    let (tx, rx) = unbounded_channel();
    let controller = NavigationController::start(
        resolver,
        probe,
        Arc::new(TextScreens::new("not_found")),
        vec![Arc::new(ChannelObserver::new(tx)) as Arc<dyn NavigationObserver>],
    )
    .await
    .expect("controller starts");
    (controller, rx)
}

/// Everything currently buffered on the event channel.
pub fn drain(events: &mut UnboundedReceiver<NavigationEvent>) -> Vec<NavigationEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

/// A probe whose storage is always broken.
pub struct FailingProbe;

#[async_trait]
impl AuthStateProbe for FailingProbe {
    fn name(&self) -> &str {
        "failing"
    }

    async fn is_authenticated(&self) -> Result<bool, ProbeError> {
        Err(ProbeError::Unavailable("disk on fire".into()))
    }
}

/// Fixed answer, counting how often it was asked.
pub struct CountingProbe {
    authenticated: bool,
    calls: AtomicUsize,
}

impl CountingProbe {
    pub fn new(authenticated: bool) -> Self {
        Self {
            authenticated,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthStateProbe for CountingProbe {
    fn name(&self) -> &str {
        "counting"
    }

    async fn is_authenticated(&self) -> Result<bool, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.authenticated)
    }
}

/// Fixed answer after a delay, for exercising suspension mid-resolution.
pub struct DelayedProbe {
    authenticated: bool,
    delay: Duration,
}

impl DelayedProbe {
    pub fn new(authenticated: bool, delay: Duration) -> Self {
        Self {
            authenticated,
            delay,
        }
    }
}

#[async_trait]
impl AuthStateProbe for DelayedProbe {
    fn name(&self) -> &str {
        "delayed"
    }

    async fn is_authenticated(&self) -> Result<bool, ProbeError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.authenticated)
    }
}
