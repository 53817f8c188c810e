//! # Screen Factory
//!
//! The UI boundary. The router never renders anything itself; it asks a
//! `ScreenFactory` for a handle keyed by the route's screen key and keeps
//! that handle in the navigation frame.

use std::fmt;

use serde::Serialize;

use crate::routing::{NavigationRequest, Params};

/// Login-screen parameter holding the serialized request to resume.
pub const RETURN_TO_PARAM: &str = "returnTo";
/// Not-found-screen parameter holding the unresolved route name.
pub const ROUTE_PARAM: &str = "route";

/// A materialized screen, as handed back by the factory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screen {
    /// Unique per materialization; two pushes of the same route differ.
    pub id: String,
    pub key: String,
    pub title: String,
    pub detail: Option<String>,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({})", self.title, detail),
            None => write!(f, "{}", self.title),
        }
    }
}

pub trait ScreenFactory: Send + Sync {
    fn render(&self, key: &str, params: &Params) -> Screen;
}

/// Plain-text screens for the shell front end.
///
/// Titles come from the key ("form_editor" → "Form Editor"). Two parameters
/// get a detail line: [`RETURN_TO_PARAM`] on any screen, and [`ROUTE_PARAM`]
/// on the not-found screen.
pub struct TextScreens {
    not_found_key: String,
}

impl TextScreens {
    pub fn new(not_found_key: &str) -> Self {
        Self {
            not_found_key: not_found_key.to_string(),
        }
    }
}

impl ScreenFactory for TextScreens {
    fn render(&self, key: &str, params: &Params) -> Screen {
        let detail = if key == self.not_found_key {
            let route = params.get(ROUTE_PARAM).and_then(|v| v.as_str()).unwrap_or("");
            Some(format!("no route named '{route}'"))
        } else {
            params
                .get(RETURN_TO_PARAM)
                .and_then(NavigationRequest::from_value)
                .map(|request| format!("sign in to continue to {}", request.target))
        };

        Screen {
            id: uuid::Uuid::new_v4().to_string(),
            key: key.to_string(),
            title: title_case(key),
            detail,
        }
    }
}

fn title_case(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
