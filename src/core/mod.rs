//! # Application Wiring
//!
//! The form builder's side of the router: which routes exist and how the
//! router is configured. Routing and navigation logic live in their own
//! modules and know nothing about this particular application.
//!
//! ```text
//!     config.toml + env + CLI            routes.rs catalog
//!               │                               │
//!               ▼                               ▼
//!        ResolvedConfig ──extra routes──▶  RouteTable
//!               │                               │
//!               └────── WellKnownRoutes ────────┴──▶ RouteResolver
//! ```
//!
//! ## Modules
//!
//! - [`config`]: `~/.formgate/config.toml`, env vars and their resolution
//! - [`routes`]: route name constants and the built-in route table

pub mod config;
pub mod routes;
