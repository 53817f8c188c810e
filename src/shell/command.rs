use std::fmt;

use crate::routing::Params;

/// One line of shell input, parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Navigation (passed to the controller)
    Go(String, Params),
    Push(String, Params),
    Replace(String, Params),
    Reset(String, Params),
    Back,
    Home,
    Login,
    ResetHome,
    ResetLogin,
    Resume,

    // Session (passed to the session handle)
    SignIn(Option<String>),
    SignOut,

    // Shell-local
    Stack,
    Routes,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (try 'help')", self.0)
    }
}

impl std::error::Error for ParseError {}

pub const HELP: &str = "\
go <route> [key=value ...]       navigate as the user (push)
push|replace|reset <route> [..]  raw stack operations
back                             pop, re-checking the revealed screen
home | login                     push home / login
reset-home | reset-login         reset the stack to home / login
resume                           continue the request that led to login
sign-in [token] | sign-out       change the session
stack | routes | help | quit";

impl Command {
    /// Parses a line. Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default();
        let rest: Vec<&str> = words.collect();

        let command = match verb {
            "go" => {
                let (route, params) = route_and_params(verb, &rest)?;
                Command::Go(route, params)
            }
            "push" => {
                let (route, params) = route_and_params(verb, &rest)?;
                Command::Push(route, params)
            }
            "replace" => {
                let (route, params) = route_and_params(verb, &rest)?;
                Command::Replace(route, params)
            }
            "reset" => {
                let (route, params) = route_and_params(verb, &rest)?;
                Command::Reset(route, params)
            }
            "sign-in" => Command::SignIn(rest.first().map(|t| t.to_string())),
            other => {
                if !rest.is_empty() {
                    return Err(ParseError(format!("'{other}' takes no arguments")));
                }
                match other {
                    "back" => Command::Back,
                    "home" => Command::Home,
                    "login" => Command::Login,
                    "reset-home" => Command::ResetHome,
                    "reset-login" => Command::ResetLogin,
                    "resume" => Command::Resume,
                    "sign-out" => Command::SignOut,
                    "stack" => Command::Stack,
                    "routes" => Command::Routes,
                    "help" | "?" => Command::Help,
                    "quit" | "exit" => Command::Quit,
                    _ => return Err(ParseError(format!("unknown command '{other}'"))),
                }
            }
        };
        Ok(Some(command))
    }
}

fn route_and_params(verb: &str, args: &[&str]) -> Result<(String, Params), ParseError> {
    let Some((route, pairs)) = args.split_first() else {
        return Err(ParseError(format!("'{verb}' needs a route name")));
    };
    let mut params = Params::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(ParseError(format!("expected key=value, got '{pair}'")));
        };
        params.insert(key.to_string(), parse_value(value));
    }
    Ok((route.to_string(), params))
}

/// JSON literals (numbers, booleans, quoted strings) keep their type;
/// anything else is a plain string.
fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::params;

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(Command::parse("   "), Ok(None));
        assert_eq!(Command::parse("# setup"), Ok(None));
    }

    #[test]
    fn test_go_with_params() {
        let parsed = Command::parse("go form_responses form_id=f-1 page=2").unwrap();
        let mut expected = params([("form_id", "f-1")]);
        expected.insert("page".into(), serde_json::json!(2));
        assert_eq!(parsed, Some(Command::Go("form_responses".into(), expected)));
    }

    #[test]
    fn test_raw_operations() {
        assert_eq!(
            Command::parse("replace settings").unwrap(),
            Some(Command::Replace("settings".into(), Params::new()))
        );
        assert_eq!(
            Command::parse("reset home").unwrap(),
            Some(Command::Reset("home".into(), Params::new()))
        );
    }

    #[test]
    fn test_route_required() {
        assert_eq!(
            Command::parse("push"),
            Err(ParseError("'push' needs a route name".into()))
        );
    }

    #[test]
    fn test_malformed_param() {
        assert!(Command::parse("go form_editor form_id").is_err());
    }

    #[test]
    fn test_sign_in_token_optional() {
        assert_eq!(Command::parse("sign-in").unwrap(), Some(Command::SignIn(None)));
        assert_eq!(
            Command::parse("sign-in abc").unwrap(),
            Some(Command::SignIn(Some("abc".into())))
        );
    }

    #[test]
    fn test_bare_commands() {
        assert_eq!(Command::parse("back").unwrap(), Some(Command::Back));
        assert_eq!(Command::parse("reset-login").unwrap(), Some(Command::ResetLogin));
        assert_eq!(Command::parse("exit").unwrap(), Some(Command::Quit));
        assert!(Command::parse("back now").is_err());
        assert!(Command::parse("teleport").is_err());
    }

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value("true"), serde_json::json!(true));
        assert_eq!(parse_value("\"7\""), serde_json::json!("7"));
        assert_eq!(parse_value("drafts"), serde_json::json!("drafts"));
    }
}
