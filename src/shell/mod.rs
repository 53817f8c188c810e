//! # Shell Adapter
//!
//! Line-oriented front end standing in for the UI layer. Reads commands from
//! stdin, drives the `NavigationController`, and prints the resulting stack.
//!
//! This is the only module that does terminal I/O. Screens of a real front
//! end would call the same helper methods.

pub mod command;

use std::io;
use std::sync::Arc;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::auth::{AuthStateProbe, EnvTokenProbe, SessionFileProbe, SessionFlag};
use crate::core::config::ResolvedConfig;
use crate::navigation::NavigationController;
use crate::routing::ResolutionDecision;
use crate::SessionSource;

pub use command::{Command, HELP, ParseError};

/// The session behind the probe, for the `sign-in`/`sign-out` commands.
pub enum SessionHandle {
    Memory(SessionFlag),
    File(Arc<SessionFileProbe>),
    Env(Arc<EnvTokenProbe>),
}

impl SessionHandle {
    /// Picks the session backend for `source`. A file session with no usable
    /// path (no home directory) falls back to memory.
    pub fn from_config(source: &SessionSource, config: &ResolvedConfig) -> Self {
        match source {
            SessionSource::Memory => SessionHandle::Memory(SessionFlag::new(false)),
            SessionSource::Env => {
                SessionHandle::Env(Arc::new(EnvTokenProbe::new(config.session_token.clone())))
            }
            SessionSource::File => match &config.session_file {
                Some(path) => SessionHandle::File(Arc::new(SessionFileProbe::new(path.clone()))),
                None => {
                    warn!("No session file path available, using in-memory session");
                    SessionHandle::Memory(SessionFlag::new(false))
                }
            },
        }
    }

    pub fn probe(&self) -> Arc<dyn AuthStateProbe> {
        match self {
            SessionHandle::Memory(flag) => Arc::new(flag.clone()),
            SessionHandle::File(probe) => probe.clone(),
            SessionHandle::Env(probe) => probe.clone(),
        }
    }

    async fn sign_in(&self, token: Option<String>) -> io::Result<String> {
        match self {
            SessionHandle::Memory(flag) => {
                flag.sign_in();
                Ok("signed in".to_string())
            }
            SessionHandle::File(probe) => {
                let token = token.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                probe.sign_in(&token).await?;
                Ok(format!("signed in (token in {})", probe.path().display()))
            }
            SessionHandle::Env(_) => Ok("session comes from FORMGATE_SESSION_TOKEN".to_string()),
        }
    }

    async fn sign_out(&self) -> io::Result<String> {
        match self {
            SessionHandle::Memory(flag) => {
                flag.sign_out();
                Ok("signed out".to_string())
            }
            SessionHandle::File(probe) => {
                probe.sign_out().await?;
                Ok("signed out".to_string())
            }
            SessionHandle::Env(_) => Ok("session comes from FORMGATE_SESSION_TOKEN".to_string()),
        }
    }
}

/// Runs the read-eval-print loop until `quit`, end of input, or Ctrl+C.
/// The controller is shut down on the way out.
pub async fn run(controller: NavigationController, session: SessionHandle) -> io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", render_stack(&controller).await);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                None
            }
        };
        let Some(line) = line else { break };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        match execute(&controller, &session, command).await {
            Ok(Some(message)) => println!("{message}"),
            Ok(None) => {}
            Err(e) => println!("error: {e}"),
        }
    }

    controller.shutdown();
    Ok(())
}

/// Executes one command, returning the text to show.
pub async fn execute(
    controller: &NavigationController,
    session: &SessionHandle,
    command: Command,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let decision = match command {
        Command::Go(route, params) => controller.navigate_to(&route, params).await?,
        Command::Push(route, params) => controller.push(&route, params).await?,
        Command::Replace(route, params) => controller.replace_top(&route, params).await?,
        Command::Reset(route, params) => controller.reset_to(&route, params).await?,
        Command::Home => controller.navigate_to_home().await?,
        Command::Login => controller.navigate_to_login().await?,
        Command::ResetHome => controller.reset_to_home().await?,
        Command::ResetLogin => controller.reset_to_login().await?,
        Command::Resume => controller.resume_after_login().await?,
        Command::Back => match controller.back().await? {
            Some(decision) => decision,
            None => return Ok(Some("already at the root screen".to_string())),
        },
        Command::SignIn(token) => return Ok(Some(session.sign_in(token).await?)),
        Command::SignOut => return Ok(Some(session.sign_out().await?)),
        Command::Stack => return Ok(Some(render_stack(controller).await)),
        Command::Routes => {
            let table = controller.resolver().table();
            let listing = table
                .names()
                .into_iter()
                .map(|name| {
                    let lock = if table.is_public(name) { " " } else { "*" };
                    format!("{lock} {name}")
                })
                .collect::<Vec<String>>()
                .join("\n");
            return Ok(Some(format!("{listing}\n(* requires sign-in)")));
        }
        Command::Help => return Ok(Some(HELP.to_string())),
        // Handled by the loop in `run`
        Command::Quit => return Ok(None),
    };

    Ok(Some(format!(
        "{}\n{}",
        describe(&decision),
        render_stack(controller).await
    )))
}

fn describe(decision: &ResolutionDecision) -> String {
    match decision {
        ResolutionDecision::Allow { route, .. } => format!("→ {route}"),
        ResolutionDecision::RedirectToLogin(request) => {
            format!("→ login ({} requires sign-in)", request.target)
        }
        ResolutionDecision::RedirectToHome => "→ home (already signed in)".to_string(),
        ResolutionDecision::NotFound(name) => format!("→ not found: '{name}'"),
    }
}

async fn render_stack(controller: &NavigationController) -> String {
    let top = controller.top().await;
    format!("[{}] {}", controller.routes().await.join(" > "), top.screen)
}
