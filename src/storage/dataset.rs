use crate::storage::table::{Result, TableSource, TransactionTable};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Owned handle to the transaction table.
///
/// The table is loaded on first use and then shared read-only; `reload`
/// is the only way to replace it. A failed load leaves the handle as it was.
pub struct DatasetHandle {
    source: TableSource,
    table: RwLock<Option<Arc<TransactionTable>>>,
}

impl DatasetHandle {
    pub fn new(source: TableSource) -> Self {
        Self {
            source,
            table: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.source.path
    }

    pub async fn is_loaded(&self) -> bool {
        self.table.read().await.is_some()
    }

    /// Current table, loading it if this is the first access
    pub async fn get(&self) -> Result<Arc<TransactionTable>> {
        if let Some(table) = self.table.read().await.as_ref() {
            return Ok(table.clone());
        }

        let mut slot = self.table.write().await;
        if let Some(table) = slot.as_ref() {
            return Ok(table.clone());
        }

        let table = Arc::new(self.load_blocking().await?);
        *slot = Some(table.clone());
        Ok(table)
    }

    /// Re-read the source and swap it in. Returns the new row count.
    pub async fn reload(&self) -> Result<usize> {
        let table = match self.load_blocking().await {
            Ok(table) => Arc::new(table),
            Err(e) => {
                warn!(path = %self.source.path.display(), error = %e, "Reload failed, keeping current table");
                return Err(e);
            }
        };

        let rows = table.len();
        *self.table.write().await = Some(table);
        info!(path = %self.source.path.display(), rows, "Dataset reloaded");
        Ok(rows)
    }

    /// File I/O and parsing run on the blocking pool
    async fn load_blocking(&self) -> Result<TransactionTable> {
        let source = self.source.clone();
        tokio::task::spawn_blocking(move || source.load()).await?
    }
}
