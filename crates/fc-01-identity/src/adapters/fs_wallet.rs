//! Directory-backed wallet: one `<label>.id` JSON file per identity.

use crate::domain::errors::WalletError;
use crate::domain::wallet::WalletIdentity;
use crate::ports::outbound::Wallet;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const EXTENSION: &str = "id";

pub struct FileSystemWallet {
    dir: PathBuf,
}

impl FileSystemWallet {
    /// Open a wallet directory. The directory need not exist until written.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, label: &str) -> Result<PathBuf, WalletError> {
        let valid = !label.is_empty()
            && !label.contains(['/', '\\'])
            && label != "."
            && label != "..";
        if !valid {
            return Err(WalletError::InvalidLabel(label.to_string()));
        }
        Ok(self.dir.join(format!("{label}.{EXTENSION}")))
    }

    /// Write an identity file, replacing any existing one with the same label.
    pub async fn import(&self, identity: &WalletIdentity) -> Result<PathBuf, WalletError> {
        let path = self.path_for(&identity.label)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let json = serde_json::to_vec_pretty(identity).map_err(|e| WalletError::Malformed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| io_error(&path, e))?;

        info!(label = %identity.label, path = %path.display(), "Identity imported");
        Ok(path)
    }
}

fn io_error(path: &Path, e: std::io::Error) -> WalletError {
    WalletError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl Wallet for FileSystemWallet {
    async fn get(&self, label: &str) -> Result<Option<WalletIdentity>, WalletError> {
        let path = self.path_for(label)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(label, path = %path.display(), "Identity file not found");
                return Ok(None);
            }
            Err(e) => return Err(io_error(&path, e)),
        };

        let identity: WalletIdentity =
            serde_json::from_slice(&bytes).map_err(|e| WalletError::Malformed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Some(identity))
    }

    async fn list(&self) -> Result<Vec<String>, WalletError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.dir, e)),
        };

        let mut labels = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                labels.push(stem.to_string());
            }
        }
        labels.sort();
        Ok(labels)
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}
