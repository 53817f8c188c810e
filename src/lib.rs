//! Formgate library exports: the form builder's authenticated router.

use clap::ValueEnum;

pub mod auth;
pub mod core;
pub mod navigation;
pub mod routing;
pub mod screen;
pub mod shell;

#[cfg(test)]
pub mod test_support;

/// Where the router learns whether a user is signed in.
#[derive(Clone, Debug, Default, ValueEnum)]
pub enum SessionSource {
    /// Token file under `~/.formgate/`
    #[default]
    File,
    /// `FORMGATE_SESSION_TOKEN` (or `[session] token`)
    Env,
    /// In-memory flag, starts signed out
    Memory,
}
