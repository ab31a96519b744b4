//! Stored bearer credentials.
//!
//! The real sign-in flow (OAuth consent, token refresh) lives outside this
//! program; `frontdesk signin` stores whatever token that flow produced, and
//! the presence of a non-empty token is the session signal the gate watches.

use crate::error::{FrontdeskError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const TOKEN_FILENAME: &str = "token.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
}

pub fn token_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TOKEN_FILENAME)
}

/// Load stored credentials; a missing file is "signed out", not an error.
pub fn load(path: &Path) -> Result<Option<Credentials>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(FrontdeskError::Io)?;
    let creds: Credentials = serde_json::from_str(&content)?;
    Ok(Some(creds))
}

pub fn save(path: &Path, creds: &Credentials) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(FrontdeskError::Io)?;
        }
    }
    let content = serde_json::to_string_pretty(creds)?;
    fs::write(path, content).map_err(FrontdeskError::Io)?;
    Ok(())
}

pub fn clear(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).map_err(FrontdeskError::Io)?;
    }
    Ok(())
}
