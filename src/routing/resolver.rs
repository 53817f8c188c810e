//! # Route Resolver
//!
//! Pure decision logic: request + route table + auth snapshot → decision.
//!
//! ```text
//!   lookup(target) ── missing ──────────────────────────▶ NotFound(name)
//!        │
//!        ├── target == login && Authenticated ──────────▶ RedirectToHome
//!        ├── public ────────────────────────────────────▶ Allow
//!        └── guarded ── Authenticated ──────────────────▶ Allow
//!                   └── Anonymous ──────────────────────▶ RedirectToLogin(request)
//! ```
//!
//! No I/O and no logging here. Effects belong to the controller.

use std::sync::Arc;

use serde::Serialize;

use super::request::{NavigationRequest, Params};
use super::table::{RouteTable, RouteTableError};

/// Point-in-time authentication state, taken fresh for every resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSnapshot {
    Authenticated,
    Anonymous,
}

impl From<bool> for AuthSnapshot {
    fn from(authenticated: bool) -> Self {
        if authenticated {
            AuthSnapshot::Authenticated
        } else {
            AuthSnapshot::Anonymous
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionDecision {
    Allow { route: String, params: Params },
    /// Carries the original request so the login flow can resume it.
    RedirectToLogin(NavigationRequest),
    RedirectToHome,
    NotFound(String),
}

impl ResolutionDecision {
    pub fn kind(&self) -> DecisionKind {
        match self {
            ResolutionDecision::Allow { .. } => DecisionKind::Allow,
            ResolutionDecision::RedirectToLogin(_) => DecisionKind::RedirectToLogin,
            ResolutionDecision::RedirectToHome => DecisionKind::RedirectToHome,
            ResolutionDecision::NotFound(_) => DecisionKind::NotFound,
        }
    }
}

/// Payload-free tag of a decision, used in navigation events.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Allow,
    RedirectToLogin,
    RedirectToHome,
    NotFound,
}

/// Names of the routes the router itself navigates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellKnownRoutes {
    pub home: String,
    pub login: String,
    pub not_found: String,
}

pub struct RouteResolver {
    table: Arc<RouteTable>,
    well_known: WellKnownRoutes,
}

impl RouteResolver {
    /// Checks that every well-known route is registered, and that login and
    /// not-found are public (otherwise redirects would loop).
    pub fn new(
        table: Arc<RouteTable>,
        well_known: WellKnownRoutes,
    ) -> Result<Self, RouteTableError> {
        table.lookup(&well_known.home)?;
        for entry in [&well_known.login, &well_known.not_found] {
            if table.lookup(entry)?.requires_auth {
                return Err(RouteTableError::GuardedEntryPoint(entry.clone()));
            }
        }
        Ok(Self { table, well_known })
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn well_known(&self) -> &WellKnownRoutes {
        &self.well_known
    }

    /// Whether resolving `target` depends on the auth snapshot.
    /// The probe only needs to be queried when this is true.
    pub fn consults_auth(&self, target: &str) -> bool {
        target == self.well_known.login
            || self
                .table
                .lookup(target)
                .is_ok_and(|def| def.requires_auth)
    }

    pub fn resolve(&self, request: &NavigationRequest, auth: AuthSnapshot) -> ResolutionDecision {
        let Ok(definition) = self.table.lookup(&request.target) else {
            return ResolutionDecision::NotFound(request.target.clone());
        };

        if definition.name == self.well_known.login && auth == AuthSnapshot::Authenticated {
            return ResolutionDecision::RedirectToHome;
        }

        if !definition.requires_auth || auth == AuthSnapshot::Authenticated {
            return ResolutionDecision::Allow {
                route: definition.name.clone(),
                params: request.params.clone(),
            };
        }

        ResolutionDecision::RedirectToLogin(request.clone())
    }
}
