use std::path::{Path, PathBuf};

use crate::errors::Error;

use super::Session;

/// Durable home for the session between process runs.
pub trait SessionPersistence: Send + Sync {
    fn load(&self) -> Result<Option<Session>, Error>;
    fn save(&self, session: &Session) -> Result<(), Error>;
    fn clear(&self) -> Result<(), Error>;
}

/// Stores the session as a pretty-printed JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileSessionPersistence {
    path: PathBuf,
}

impl JsonFileSessionPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionPersistence for JsonFileSessionPersistence {
    fn load(&self) -> Result<Option<Session>, Error> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, session: &Session) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
