//! # Route Catalog
//!
//! Every screen of the form builder, by name. Call sites use these constants
//! rather than string literals, so a typo is a compile error instead of a
//! not-found screen.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::routing::{ParamSchema, RouteDefinition, RouteTable, RouteTableError, WellKnownRoutes};

pub const HOME: &str = "home";
pub const LOGIN: &str = "login";
pub const REGISTER: &str = "register";
pub const FORGOT_PASSWORD: &str = "forgot_password";
pub const NOT_FOUND: &str = "not_found";

pub const DASHBOARD: &str = "dashboard";
pub const FORM_BUILDER: &str = "form_builder";
pub const FORM_EDITOR: &str = "form_editor";
pub const FORM_PREVIEW: &str = "form_preview";
pub const FORM_RESPONSES: &str = "form_responses";
pub const SETTINGS: &str = "settings";
pub const PROFILE: &str = "profile";

/// The form builder's home, login and not-found screens.
impl Default for WellKnownRoutes {
    fn default() -> Self {
        Self {
            home: HOME.to_string(),
            login: LOGIN.to_string(),
            not_found: NOT_FOUND.to_string(),
        }
    }
}

// ── Typed parameters ────────────────────────────────────────────────────────

#[derive(Deserialize, JsonSchema)]
pub struct FormParams {
    /// Identifier of the form being shown
    pub form_id: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct FormEditorParams {
    /// Identifier of the form being edited
    pub form_id: String,
    /// Section to scroll to on open
    pub section: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct ResponsesParams {
    /// Identifier of the form whose responses are listed
    pub form_id: String,
    /// 1-based results page
    pub page: Option<u32>,
}

/// The built-in route list, in registration order.
pub fn default_routes() -> Vec<RouteDefinition> {
    vec![
        RouteDefinition::public(HOME),
        RouteDefinition::public(LOGIN),
        RouteDefinition::public(REGISTER),
        RouteDefinition::public(FORGOT_PASSWORD),
        RouteDefinition::public(NOT_FOUND),
        RouteDefinition::guarded(DASHBOARD),
        RouteDefinition::guarded(FORM_BUILDER),
        RouteDefinition::guarded(FORM_EDITOR).with_params(ParamSchema::of::<FormEditorParams>()),
        // Preview reuses the editor's renderer in read-only mode
        RouteDefinition::guarded(FORM_PREVIEW)
            .with_params(ParamSchema::of::<FormParams>())
            .with_screen(FORM_EDITOR),
        RouteDefinition::guarded(FORM_RESPONSES).with_params(ParamSchema::of::<ResponsesParams>()),
        RouteDefinition::guarded(SETTINGS),
        RouteDefinition::guarded(PROFILE),
    ]
}

/// The built-in routes followed by `extra`. Any repeated name aborts.
pub fn build_table<I>(extra: I) -> Result<RouteTable, RouteTableError>
where
    I: IntoIterator<Item = RouteDefinition>,
{
    RouteTable::from_definitions(default_routes().into_iter().chain(extra))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::routing::RouteResolver;

    #[test]
    fn test_default_table_builds() {
        let table = build_table(Vec::new()).unwrap();
        assert_eq!(table.len(), default_routes().len());
        assert!(table.is_public(HOME));
        assert!(table.is_public(LOGIN));
        assert!(table.is_public(NOT_FOUND));
        assert!(!table.is_public(DASHBOARD));
    }

    #[test]
    fn test_default_well_known_routes_are_in_the_catalog() {
        let well_known = WellKnownRoutes::default();
        assert_eq!(well_known.home, HOME);
        assert_eq!(well_known.login, LOGIN);
        assert_eq!(well_known.not_found, NOT_FOUND);

        let table = Arc::new(build_table(Vec::new()).unwrap());
        assert!(RouteResolver::new(table, well_known).is_ok());
    }

    #[test]
    fn test_editor_schema() {
        let table = build_table(Vec::new()).unwrap();
        let editor = table.lookup(FORM_EDITOR).unwrap();
        assert!(editor.params.required.contains("form_id"));
        assert!(editor.params.optional.contains("section"));
    }

    #[test]
    fn test_preview_uses_editor_screen() {
        let table = build_table(Vec::new()).unwrap();
        assert_eq!(table.lookup(FORM_PREVIEW).unwrap().screen, FORM_EDITOR);
    }

    #[test]
    fn test_extra_route_colliding_with_builtin_aborts() {
        let result = build_table([RouteDefinition::public(HOME)]);
        assert_eq!(
            result.unwrap_err(),
            RouteTableError::DuplicateRoute(HOME.to_string())
        );
    }

    #[test]
    fn test_extra_routes_registered() {
        let table = build_table([RouteDefinition::guarded("billing")]).unwrap();
        assert!(table.contains("billing"));
        assert!(!table.is_public("billing"));
    }
}
