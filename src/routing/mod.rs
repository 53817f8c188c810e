//! # Routing
//!
//! The decision half of the router: what routes exist and whether a given
//! request may reach one. Nothing in here touches the navigation stack.
//!
//! - [`table`]: `RouteTable` and `RouteDefinition`, the static registry
//! - [`request`]: `NavigationRequest` and its untyped `Params`
//! - [`resolver`]: `RouteResolver`, the pure auth-guard decision function

pub mod request;
pub mod resolver;
pub mod table;

pub use request::{NavigationRequest, Origin, Params, params};
pub use resolver::{AuthSnapshot, DecisionKind, ResolutionDecision, RouteResolver, WellKnownRoutes};
pub use table::{ParamSchema, RouteDefinition, RouteTable, RouteTableError};
