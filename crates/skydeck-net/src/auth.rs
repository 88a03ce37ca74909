//! Bearer token storage.
//!
//! The console keeps exactly one piece of persisted local state: the bearer
//! token sent with every backend request. [`TokenStore`] abstracts where it
//! lives. [`FileTokenStore`] keeps it in a small JSON file under the user's
//! data directory; [`MemoryTokenStore`] keeps it for the process lifetime.
//!
//! The REST client reads the store on every request, so a token stored after
//! login is picked up without rebuilding the client. There is no refresh
//! protocol.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use skydeck_core::logging::targets;

use crate::error::{NetworkError, Result};

/// File name of the persisted token inside the data directory.
pub const TOKEN_FILE_NAME: &str = "token.json";

/// Storage for the bearer token.
pub trait TokenStore: Send + Sync {
    /// Current token, if one is stored.
    fn token(&self) -> Option<String>;

    /// Replace the stored token.
    fn set_token(&self, token: &str) -> Result<()>;

    /// Remove the stored token (logout).
    fn clear(&self) -> Result<()>;
}

/// In-memory token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.write() = None;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct TokenFile {
    token: String,
}

/// Token storage backed by a JSON file.
///
/// The file is read on every call so a token written by another process
/// (e.g. a login command) is visible immediately.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the token in the platform data directory for Skydeck.
    ///
    /// Returns `None` when no home directory can be determined.
    pub fn in_data_dir() -> Option<Self> {
        default_token_path().map(Self::new)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, contents: &[u8]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        // Uniquely named sibling of the token file.
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(target: targets::AUTH, path = %self.path.display(), "failed to read token file: {e}");
                return None;
            }
        };
        match serde_json::from_str::<TokenFile>(&contents) {
            Ok(file) if !file.token.is_empty() => Some(file.token),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(target: targets::AUTH, path = %self.path.display(), "ignoring malformed token file: {e}");
                None
            }
        }
    }

    fn set_token(&self, token: &str) -> Result<()> {
        let json = serde_json::to_vec(&TokenFile {
            token: token.to_string(),
        })?;
        self.write_atomic(&json)?;
        tracing::debug!(target: targets::AUTH, path = %self.path.display(), "stored bearer token");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NetworkError::from(e)),
        }
    }
}

/// Default location of the token file.
pub fn default_token_path() -> Option<PathBuf> {
    ProjectDirs::from("io", "skydeck", "skydeck").map(|dirs| dirs.data_dir().join(TOKEN_FILE_NAME))
}
