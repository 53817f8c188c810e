//! # Navigation
//!
//! The effect half of the router. `NavigationController` asks the resolver
//! for a decision and then applies it to the stack it owns.
//!
//! ```text
//!   navigate_to / push / replace_top / reset_to / back
//!                  │
//!                  ▼
//!      ┌──────────────────────┐  resolve()  ┌───────────────┐
//!      │ NavigationController │ ──────────▶ │ RouteResolver │
//!      └───────────┬──────────┘             └───────────────┘
//!                  │ Transition
//!                  ▼
//!      NavigationStack ──▶ NavigationEvent ──▶ observers
//! ```

pub mod controller;
pub mod event;
mod helpers;
pub mod stack;

pub use controller::{
    NavigationController, NavigationError, Phase, RETURN_TO_PARAM, ROUTE_PARAM,
};
pub use event::{ChannelObserver, EventLevel, LogObserver, NavigationEvent, NavigationObserver};
pub use stack::{Frame, NavigationStack, StackOp};
