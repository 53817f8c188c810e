//! # Auth State Probe
//!
//! The router's only view of the session subsystem: "is someone signed in
//! right now?" Asked once per resolution that needs it, never cached.
//!
//! Absence of a session is `Ok(false)`, not an error. An `Err` means the
//! probe could not tell, and the controller treats that as signed out.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use log::debug;

#[derive(Debug)]
pub enum ProbeError {
    /// Session storage could not be read (permissions, I/O failure).
    Unavailable(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Unavailable(msg) => write!(f, "auth probe unavailable: {msg}"),
        }
    }
}

impl std::error::Error for ProbeError {}

#[async_trait]
pub trait AuthStateProbe: Send + Sync {
    /// Returns the name of the probe (for logs).
    fn name(&self) -> &str;

    async fn is_authenticated(&self) -> Result<bool, ProbeError>;
}

// ── In-memory flag ──────────────────────────────────────────────────────────

/// Session state held in memory. Clones share the same flag.
#[derive(Clone, Default)]
pub struct SessionFlag {
    signed_in: Arc<AtomicBool>,
}

impl SessionFlag {
    pub fn new(signed_in: bool) -> Self {
        Self {
            signed_in: Arc::new(AtomicBool::new(signed_in)),
        }
    }

    pub fn sign_in(&self) {
        self.signed_in.store(true, Ordering::SeqCst);
    }

    pub fn sign_out(&self) {
        self.signed_in.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthStateProbe for SessionFlag {
    fn name(&self) -> &str {
        "flag"
    }

    async fn is_authenticated(&self) -> Result<bool, ProbeError> {
        Ok(self.signed_in.load(Ordering::SeqCst))
    }
}

// ── Token from environment ──────────────────────────────────────────────────

/// Signed in when a session token was supplied up front
/// (`FORMGATE_SESSION_TOKEN` or the `[session]` config table).
pub struct EnvTokenProbe {
    token: Option<String>,
}

impl EnvTokenProbe {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }
}

#[async_trait]
impl AuthStateProbe for EnvTokenProbe {
    fn name(&self) -> &str {
        "env-token"
    }

    async fn is_authenticated(&self) -> Result<bool, ProbeError> {
        Ok(self.token.is_some())
    }
}

// ── Token file ──────────────────────────────────────────────────────────────

/// Session token persisted on disk, by default at `~/.formgate/session`.
///
/// A missing or blank file means signed out. Any other read failure
/// surfaces as `ProbeError::Unavailable`.
pub struct SessionFileProbe {
    path: PathBuf,
}

impl SessionFileProbe {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the token atomically (`.tmp` + rename).
    pub async fn sign_in(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, token).await?;
        tokio::fs::rename(&tmp_path, &self.path).await
    }

    pub async fn sign_out(&self) -> io::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Returns `~/.formgate/session`.
pub fn default_session_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".formgate").join("session"))
}

#[async_trait]
impl AuthStateProbe for SessionFileProbe {
    fn name(&self) -> &str {
        "session-file"
    }

    async fn is_authenticated(&self) -> Result<bool, ProbeError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(token) => Ok(!token.trim().is_empty()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No session file at {}", self.path.display());
                Ok(false)
            }
            Err(e) => Err(ProbeError::Unavailable(format!(
                "{}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_session_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("formgate-test-{}", uuid::Uuid::new_v4()))
            .join("session")
    }

    #[tokio::test]
    async fn test_flag_toggles() {
        let flag = SessionFlag::new(false);
        let shared = flag.clone();
        assert!(!flag.is_authenticated().await.unwrap());
        shared.sign_in();
        assert!(flag.is_authenticated().await.unwrap());
        shared.sign_out();
        assert!(!flag.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_env_token_blank_is_signed_out() {
        assert!(!EnvTokenProbe::new(Some("  ".into())).is_authenticated().await.unwrap());
        assert!(!EnvTokenProbe::new(None).is_authenticated().await.unwrap());
        assert!(EnvTokenProbe::new(Some("tok".into())).is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_session_file_is_signed_out() {
        let probe = SessionFileProbe::new(temp_session_path());
        assert!(!probe.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_session_file_sign_in_and_out() {
        let probe = SessionFileProbe::new(temp_session_path());
        probe.sign_in("token-123").await.unwrap();
        assert!(probe.is_authenticated().await.unwrap());
        probe.sign_out().await.unwrap();
        assert!(!probe.is_authenticated().await.unwrap());
        // Signing out twice is fine
        probe.sign_out().await.unwrap();
        let _ = std::fs::remove_dir_all(probe.path().parent().unwrap());
    }

    #[tokio::test]
    async fn test_unreadable_session_file_is_unavailable() {
        // A directory where the token file should be cannot be read as a string
        let path = temp_session_path();
        std::fs::create_dir_all(&path).unwrap();
        let probe = SessionFileProbe::new(path.clone());
        let result = probe.is_authenticated().await;
        assert!(matches!(result, Err(ProbeError::Unavailable(_))));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
