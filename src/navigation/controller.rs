//! # Navigation Controller
//!
//! Owns the navigation stack and is the only thing allowed to mutate it.
//! Every operation goes through the same three phases:
//!
//! ```text
//!   Idle ──call──▶ Resolving ──decision──▶ Transitioning ──applied──▶ Idle
//!                  (may await the probe)   (stack mutation + event)
//! ```
//!
//! Operations are serialized by an async mutex around the stack. Tokio's
//! mutex is FIFO, so operations apply in the order they were issued even
//! when an earlier one is stuck waiting on a slow auth probe.
//!
//! Nothing is committed until resolution finishes. If the controller is shut
//! down (or the operation future is dropped) mid-resolution, the stack is
//! left exactly as it was.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::Mutex;

use super::event::{EventLevel, NavigationEvent, NavigationObserver};
use super::stack::{Frame, NavigationStack, StackOp, Transition};
use crate::auth::AuthStateProbe;
use crate::routing::{
    AuthSnapshot, DecisionKind, NavigationRequest, Origin, Params, ResolutionDecision,
    RouteResolver, RouteTableError, WellKnownRoutes, params,
};
use crate::screen::ScreenFactory;

pub use crate::screen::{RETURN_TO_PARAM, ROUTE_PARAM};

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// The controller was shut down; nothing was applied.
    Closed,
    /// A decision named a route the table cannot materialize.
    Route(RouteTableError),
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::Closed => write!(f, "navigation controller is shut down"),
            NavigationError::Route(e) => write!(f, "navigation failed: {e}"),
        }
    }
}

impl std::error::Error for NavigationError {}

impl From<RouteTableError> for NavigationError {
    fn from(e: RouteTableError) -> Self {
        NavigationError::Route(e)
    }
}

// ============================================================================
// Phase
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resolving,
    Transitioning,
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Phase::Resolving,
            2 => Phase::Transitioning,
            _ => Phase::Idle,
        }
    }
}

/// Sets the phase for the duration of one operation; back to Idle on drop,
/// including when the operation future is cancelled.
struct PhaseGuard<'a> {
    phase: &'a AtomicU8,
}

impl<'a> PhaseGuard<'a> {
    fn enter(phase: &'a AtomicU8) -> Self {
        phase.store(Phase::Resolving as u8, Ordering::SeqCst);
        Self { phase }
    }

    fn transitioning(&self) {
        self.phase.store(Phase::Transitioning as u8, Ordering::SeqCst);
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.phase.store(Phase::Idle as u8, Ordering::SeqCst);
    }
}

// ============================================================================
// Controller
// ============================================================================

pub struct NavigationController {
    resolver: RouteResolver,
    probe: Arc<dyn AuthStateProbe>,
    factory: Arc<dyn ScreenFactory>,
    observers: Vec<Arc<dyn NavigationObserver>>,
    stack: Mutex<NavigationStack>,
    phase: AtomicU8,
    closed: AtomicBool,
}

impl NavigationController {
    /// Builds the controller with the home route as root frame.
    ///
    /// Home goes through the resolver like any other request, so a guarded
    /// home with no session starts on the login screen instead.
    pub async fn start(
        resolver: RouteResolver,
        probe: Arc<dyn AuthStateProbe>,
        factory: Arc<dyn ScreenFactory>,
        observers: Vec<Arc<dyn NavigationObserver>>,
    ) -> Result<Self, NavigationError> {
        let home = resolver.well_known().home.clone();
        let request = NavigationRequest::new(&home, Params::new(), Origin::Programmatic);
        let auth = snapshot(&resolver, probe.as_ref(), &request.target).await;
        let decision = resolver.resolve(&request, auth);

        let root = match plan(&resolver, factory.as_ref(), StackOp::ResetTo, &decision)? {
            Transition::Push(frame) | Transition::ReplaceTop(frame) | Transition::ResetTo(frame) => {
                frame
            }
            Transition::Pop => return Err(RouteTableError::RouteNotFound(home).into()),
        };
        info!(
            "Navigation started at {} (probe: {})",
            root.route,
            probe.name()
        );

        Ok(Self {
            resolver,
            probe,
            factory,
            observers,
            stack: Mutex::new(NavigationStack::new(root)),
            phase: AtomicU8::new(Phase::Idle as u8),
            closed: AtomicBool::new(false),
        })
    }

    // ── Primitives ──────────────────────────────────────────────────────────

    /// Resolves `name` and appends a frame for it.
    pub async fn push(&self, name: &str, params: Params) -> Result<ResolutionDecision, NavigationError> {
        let request = NavigationRequest::new(name, params, Origin::Programmatic);
        self.navigate(StackOp::Push, request).await
    }

    /// Resolves `name` and substitutes it for the top frame.
    pub async fn replace_top(&self, name: &str, params: Params) -> Result<ResolutionDecision, NavigationError> {
        let request = NavigationRequest::new(name, params, Origin::Programmatic);
        self.navigate(StackOp::ReplaceTop, request).await
    }

    /// Resolves `name` and clears the stack down to a single frame for it.
    pub async fn reset_to(&self, name: &str, params: Params) -> Result<ResolutionDecision, NavigationError> {
        let request = NavigationRequest::new(name, params, Origin::Programmatic);
        self.navigate(StackOp::ResetTo, request).await
    }

    /// Pops the top frame, re-checking the revealed frame against the current
    /// session first. Returns `Ok(None)` when only the root is left.
    pub async fn back(&self) -> Result<Option<ResolutionDecision>, NavigationError> {
        self.ensure_open()?;
        let mut stack = self.stack.lock().await;
        self.ensure_open()?;

        let Some(revealed) = stack.below_top() else {
            debug!("Back ignored at root {}", stack.top().route);
            return Ok(None);
        };
        let request = NavigationRequest::new(
            &revealed.route,
            revealed.params.clone(),
            Origin::UserAction,
        );
        self.run(&mut stack, StackOp::Pop, request).await.map(Some)
    }

    /// Resets to whatever `next` derives from the current top frame. The top
    /// is read under the same lock the reset runs under, so an operation
    /// issued later cannot land in between.
    pub(crate) async fn reset_from_top<F>(&self, next: F) -> Result<ResolutionDecision, NavigationError>
    where
        F: FnOnce(&Frame) -> NavigationRequest,
    {
        self.ensure_open()?;
        let mut stack = self.stack.lock().await;
        self.ensure_open()?;
        let request = next(stack.top());
        self.run(&mut stack, StackOp::ResetTo, request).await
    }

    pub(crate) async fn navigate(
        &self,
        op: StackOp,
        request: NavigationRequest,
    ) -> Result<ResolutionDecision, NavigationError> {
        debug_assert!(op != StackOp::Pop, "pop goes through back()");
        self.ensure_open()?;
        let mut stack = self.stack.lock().await;
        self.ensure_open()?;
        self.run(&mut stack, op, request).await
    }

    /// Resolve, then apply. Caller holds the stack lock for the whole call.
    async fn run(
        &self,
        stack: &mut NavigationStack,
        op: StackOp,
        request: NavigationRequest,
    ) -> Result<ResolutionDecision, NavigationError> {
        let phase = PhaseGuard::enter(&self.phase);
        debug!("Resolving {:?} {} ({:?})", op, request.target, request.origin);

        let auth = snapshot(&self.resolver, self.probe.as_ref(), &request.target).await;
        let decision = self.resolver.resolve(&request, auth);

        if self.is_closed() {
            debug!("Discarding {} after shutdown", request.target);
            return Err(NavigationError::Closed);
        }

        phase.transitioning();
        let transition = plan(&self.resolver, self.factory.as_ref(), op, &decision)?;
        let origin_route = stack.top().route.clone();
        let operation = transition.op();
        stack.apply(transition);

        let kind = decision.kind();
        self.emit(NavigationEvent {
            timestamp: Utc::now(),
            origin_route,
            target_route: request.target.clone(),
            landed_route: stack.top().route.clone(),
            decision: kind,
            requires_auth: self
                .resolver
                .table()
                .lookup(&request.target)
                .is_ok_and(|def| def.requires_auth),
            operation,
            level: if kind == DecisionKind::NotFound {
                EventLevel::Error
            } else {
                EventLevel::Info
            },
        });

        Ok(decision)
    }

    fn emit(&self, event: NavigationEvent) {
        for observer in &self.observers {
            observer.on_navigation(&event);
        }
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    /// Current top frame. Waits for any in-flight operation to finish.
    pub async fn top(&self) -> Frame {
        self.stack.lock().await.top().clone()
    }

    /// Route names from root to top.
    pub async fn routes(&self) -> Vec<String> {
        self.stack.lock().await.routes()
    }

    pub async fn depth(&self) -> usize {
        self.stack.lock().await.len()
    }

    /// Phase of the operation currently holding the stack. Operations still
    /// queued behind it are not counted: the controller reads `Idle` only
    /// between operations, not once the queue is empty.
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    pub fn well_known(&self) -> &WellKnownRoutes {
        self.resolver.well_known()
    }

    pub fn resolver(&self) -> &RouteResolver {
        &self.resolver
    }

    // ── Teardown ────────────────────────────────────────────────────────────

    /// Stops the controller. An operation still resolving is discarded
    /// without touching the stack, and later calls return `Closed`.
    pub fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!("Navigation controller shut down");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), NavigationError> {
        if self.is_closed() {
            Err(NavigationError::Closed)
        } else {
            Ok(())
        }
    }
}

/// Takes a fresh auth snapshot, but only when the decision depends on it.
/// A failing probe counts as signed out.
async fn snapshot(
    resolver: &RouteResolver,
    probe: &dyn AuthStateProbe,
    target: &str,
) -> AuthSnapshot {
    if !resolver.consults_auth(target) {
        return AuthSnapshot::Anonymous;
    }
    match probe.is_authenticated().await {
        Ok(authenticated) => authenticated.into(),
        Err(e) => {
            warn!("{e}; treating session as signed out");
            AuthSnapshot::Anonymous
        }
    }
}

/// Turns a decision into the concrete stack mutation.
///
/// Redirects and not-found override the requested operation: login and home
/// reset the stack, the not-found screen is always pushed so back still works.
fn plan(
    resolver: &RouteResolver,
    factory: &dyn ScreenFactory,
    op: StackOp,
    decision: &ResolutionDecision,
) -> Result<Transition, RouteTableError> {
    let well_known = resolver.well_known();
    let frame = |route: &str, params: Params| materialize(resolver, factory, route, params);

    let transition = match decision {
        ResolutionDecision::Allow { route, params } => match op {
            StackOp::Pop => Transition::Pop,
            StackOp::Push => Transition::Push(frame(route.as_str(), params.clone())?),
            StackOp::ReplaceTop => Transition::ReplaceTop(frame(route.as_str(), params.clone())?),
            StackOp::ResetTo => Transition::ResetTo(frame(route.as_str(), params.clone())?),
        },
        ResolutionDecision::RedirectToLogin(original) => Transition::ResetTo(frame(
            well_known.login.as_str(),
            params([(RETURN_TO_PARAM, original.to_value())]),
        )?),
        ResolutionDecision::RedirectToHome => {
            Transition::ResetTo(frame(well_known.home.as_str(), Params::new())?)
        }
        ResolutionDecision::NotFound(name) => Transition::Push(frame(
            well_known.not_found.as_str(),
            params([(ROUTE_PARAM, name.as_str())]),
        )?),
    };
    Ok(transition)
}

fn materialize(
    resolver: &RouteResolver,
    factory: &dyn ScreenFactory,
    route: &str,
    params: Params,
) -> Result<Frame, RouteTableError> {
    let definition = resolver.table().lookup(route)?;
    let missing = definition.params.missing(&params);
    if !missing.is_empty() {
        warn!(
            "Route {} opened without required params: {}",
            route,
            missing.join(", ")
        );
    }
    let screen = factory.render(&definition.screen, &params);
    Ok(Frame {
        route: definition.name.clone(),
        params,
        screen,
    })
}
