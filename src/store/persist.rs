//! Record file persistence - whole-collection JSON read/write / 记录文件持久化
//!
//! The entire collection lives in one JSON array file. A missing file
//! is a normal first-run state and loads as an empty collection; a file
//! that exists but does not parse is surfaced as a corrupt-store error
//! so a later save cannot overwrite recoverable data with an empty base.

use std::path::{Path, PathBuf};

use crate::models::Record;

use super::StoreError;

/// Persistence adapter for the record collection / 记录集合的持久化适配器
#[derive(Debug, Clone)]
pub struct RecordFile {
    path: PathBuf,
}

impl RecordFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection from disk / 从磁盘加载完整集合
    ///
    /// Missing file => empty collection. Unparseable file => `Corrupt`.
    pub async fn load(&self) -> Result<Vec<Record>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Record file {:?} not found, starting empty", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrite the file with the full collection / 将完整集合写回文件
    ///
    /// Pretty-printed so the file stays hand-inspectable / 美化输出便于人工查看
    pub async fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::Io(e.into()))?;

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}
