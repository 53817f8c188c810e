//! # Route Table
//!
//! Static registry of every addressable screen. Built once at startup,
//! then shared read-only behind an `Arc`.
//!
//! Each route is a `RouteDefinition`: a unique name, whether it sits behind
//! the auth guard, the parameter keys it expects, and the factory key the
//! screen factory uses to materialize it.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use schemars::JsonSchema;
use serde::Serialize;

use super::request::Params;

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTableError {
    /// Two definitions share a name. Fatal to startup.
    DuplicateRoute(String),
    /// Lookup of a name that was never registered.
    RouteNotFound(String),
    /// Login and not-found screens must be reachable without a session.
    GuardedEntryPoint(String),
}

impl fmt::Display for RouteTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteTableError::DuplicateRoute(name) => write!(f, "duplicate route: {name}"),
            RouteTableError::RouteNotFound(name) => write!(f, "route not found: {name}"),
            RouteTableError::GuardedEntryPoint(name) => {
                write!(f, "route {name} must be public")
            }
        }
    }
}

impl std::error::Error for RouteTableError {}

// ============================================================================
// Parameter Schema
// ============================================================================

/// Parameter keys a route expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParamSchema {
    pub required: BTreeSet<String>,
    pub optional: BTreeSet<String>,
}

impl ParamSchema {
    /// Derives the schema from a typed parameter struct.
    ///
    /// Fields without a default (non-`Option`) are required, the rest optional.
    pub fn of<T: JsonSchema>() -> Self {
        let root = schemars::schema_for!(T);
        let Some(object) = root.schema.object else {
            return Self::default();
        };
        let required: BTreeSet<String> = object.required.iter().cloned().collect();
        let optional = object
            .properties
            .keys()
            .filter(|key| !required.contains(*key))
            .cloned()
            .collect();
        Self { required, optional }
    }

    /// Builds a schema from plain key lists (used for config-declared routes).
    pub fn from_keys<R, O>(required: R, optional: O) -> Self
    where
        R: IntoIterator<Item = String>,
        O: IntoIterator<Item = String>,
    {
        Self {
            required: required.into_iter().collect(),
            optional: optional.into_iter().collect(),
        }
    }

    /// Required keys absent from `params`, in sorted order.
    pub fn missing(&self, params: &Params) -> Vec<&str> {
        self.required
            .iter()
            .filter(|key| !params.contains_key(key.as_str()))
            .map(String::as_str)
            .collect()
    }
}

// ============================================================================
// Route Definition
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDefinition {
    pub name: String,
    pub requires_auth: bool,
    pub params: ParamSchema,
    /// Key handed to the screen factory. Defaults to the route name.
    pub screen: String,
}

impl RouteDefinition {
    /// A route reachable without a session.
    pub fn public(name: &str) -> Self {
        Self {
            name: name.to_string(),
            requires_auth: false,
            params: ParamSchema::default(),
            screen: name.to_string(),
        }
    }

    /// A route behind the auth guard.
    pub fn guarded(name: &str) -> Self {
        Self {
            requires_auth: true,
            ..Self::public(name)
        }
    }

    pub fn with_params(mut self, params: ParamSchema) -> Self {
        self.params = params;
        self
    }

    pub fn with_screen(mut self, screen: &str) -> Self {
        self.screen = screen.to_string();
        self
    }
}

// ============================================================================
// Table
// ============================================================================

#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteDefinition>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from a fixed list, aborting on the first duplicate name.
    pub fn from_definitions<I>(definitions: I) -> Result<Self, RouteTableError>
    where
        I: IntoIterator<Item = RouteDefinition>,
    {
        let mut table = Self::new();
        for definition in definitions {
            table.register(definition)?;
        }
        Ok(table)
    }

    pub fn register(&mut self, definition: RouteDefinition) -> Result<(), RouteTableError> {
        if self.routes.contains_key(&definition.name) {
            return Err(RouteTableError::DuplicateRoute(definition.name));
        }
        self.routes.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&RouteDefinition, RouteTableError> {
        self.routes
            .get(name)
            .ok_or_else(|| RouteTableError::RouteNotFound(name.to_string()))
    }

    /// True when the route exists and needs no session.
    pub fn is_public(&self, name: &str) -> bool {
        self.routes.get(name).is_some_and(|def| !def.requires_auth)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
