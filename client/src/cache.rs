//! Local snapshot cache: the last successfully fetched transaction
//! list, persisted per ledger source so the dashboard can paint
//! immediately on startup while a fresh fetch runs in the background.
//!
//! One JSON file per key under the platform data directory. A missing
//! or unreadable file is a cache miss, never an error — corruption
//! just falls through to the network.

use std::io;
use std::path::PathBuf;

use shared::Transaction;
use tracing::{debug, warn};

/// Key namespace; the source id is appended for non-default ledgers.
const CACHE_NAMESPACE: &str = "kakeibo_expenses_cache";

#[derive(Debug, Clone)]
pub struct SnapshotCache {
    dir: PathBuf,
}

impl SnapshotCache {
    /// Cache rooted at the platform data directory. `None` only on
    /// platforms without one, in which case the app simply runs
    /// cache-less.
    pub fn open_default() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::at_dir(dir.join("kakeibo")))
    }

    /// Cache rooted at an explicit directory (tests use a tempdir).
    pub fn at_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Keys embed the source id so independent ledgers sharing one
    /// device can never collide.
    fn key(source: Option<&str>) -> String {
        match source {
            Some(source) => format!("{}_{}", CACHE_NAMESPACE, source),
            None => CACHE_NAMESPACE.to_string(),
        }
    }

    fn path_for(&self, source: Option<&str>) -> PathBuf {
        self.dir.join(format!("{}.json", Self::key(source)))
    }

    /// Last known snapshot for this source, or `None` on miss or
    /// corruption.
    pub fn get(&self, source: Option<&str>) -> Option<Vec<Transaction>> {
        let path = self.path_for(source);
        let contents = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(transactions) => {
                debug!(path = %path.display(), "loaded cached snapshot");
                Some(transactions)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cached snapshot unparseable; treating as miss");
                None
            }
        }
    }

    /// Write-through after every successful fetch.
    pub fn set(&self, source: Option<&str>, transactions: &[Transaction]) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_string(transactions)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(self.path_for(source), contents)
    }
}
