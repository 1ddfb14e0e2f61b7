//! Document store - owns the canonical in-memory record collection / 文档存储模块
//!
//! Architecture principles / 架构原则：
//! - The store only exposes primitive operations: search, append
//! - Search reads the in-memory snapshot, never the disk
//! - Append reloads from disk before mutating, then writes the whole
//!   collection back ("reload-then-append-then-save")
//!
//! Concurrency / 并发：
//! - Appends within one process serialize on the collection write lock
//! - Appends from other processes writing the same file are only
//!   mitigated by the pre-mutation reload; two processes racing between
//!   reload and save can still lose the first writer's entry. Known
//!   limitation, callers must not assume cross-process atomicity.

pub mod persist;

pub use persist::RecordFile;

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::Record;

/// Store error taxonomy / 存储错误分类
#[derive(Debug, Error)]
pub enum StoreError {
    /// Candidate record fails required-field constraints; nothing was mutated
    #[error("invalid record: {0}")]
    Validation(String),
    /// Record file exists but cannot be parsed as a record array
    #[error("record file {path:?} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Underlying read/write failure, passed through unchanged
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Document store / 文档存储
///
/// Owns the authoritative in-memory collection, backed by a single
/// JSON record file. Construct one per record file; tests pass a
/// temporary path.
#[derive(Debug)]
pub struct DocumentStore {
    file: RecordFile,
    records: RwLock<Vec<Record>>,
}

impl DocumentStore {
    /// Open a store, loading the collection from disk / 打开存储并从磁盘加载集合
    ///
    /// A missing file yields an empty collection; a corrupt file is an
    /// error and left untouched for the operator to inspect.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let file = RecordFile::new(path);
        let records = file.load().await?;
        tracing::info!("Loaded {} record(s) from {:?}", records.len(), file.path());

        Ok(Self {
            file,
            records: RwLock::new(records),
        })
    }

    /// Number of records currently in memory / 当前内存中的记录数
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Case-insensitive substring search over name, code and tags / 大小写不敏感的子串搜索
    ///
    /// Matches are unanchored substring containment, returned in
    /// insertion order with no ranking. An empty query returns no
    /// results rather than the whole collection. Operates on the
    /// in-memory snapshot only; writes by other processes are not
    /// visible until the next append reloads the file.
    pub async fn search(&self, query: &str) -> Vec<Record> {
        if query.is_empty() {
            return Vec::new();
        }
        let query = query.to_lowercase();

        let records = self.records.read().await;
        records
            .iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&query)
                    || r.code
                        .as_deref()
                        .is_some_and(|code| code.to_lowercase().contains(&query))
                    || r.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
            })
            .cloned()
            .collect()
    }

    /// Validate and persist a new record / 校验并持久化一条新记录
    ///
    /// Reloads the collection from disk before appending so that a
    /// write from another instance since our last load is not clobbered
    /// (best effort, see module docs). The in-memory collection is only
    /// swapped after the save succeeds; on save failure memory keeps its
    /// previous snapshot and the error propagates unchanged.
    pub async fn append(&self, candidate: Record) -> Result<Record, StoreError> {
        validate(&candidate)?;

        let mut records = self.records.write().await;

        // Re-read the file so concurrent instances' entries survive / 重新读取文件防止覆盖并发写入
        let mut reloaded = self.file.load().await?;
        reloaded.push(candidate.clone());

        self.file.save(&reloaded).await?;
        tracing::info!("Record saved, total entries: {}", reloaded.len());

        *records = reloaded;
        Ok(candidate)
    }
}

/// Required-field checks, before any state is touched / 必填字段校验
fn validate(candidate: &Record) -> Result<(), StoreError> {
    let mut problems = Vec::new();

    if candidate.name.trim().is_empty() {
        problems.push("name must not be empty");
    }
    if candidate.tags.is_empty() {
        problems.push("at least one tag is required");
    } else if candidate.tags.iter().any(|tag| tag.trim().is_empty()) {
        problems.push("tags must not be empty");
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(problems.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, tags: &[&str]) -> Record {
        Record {
            name: name.to_string(),
            url: None,
            code: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn record_with_code(name: &str, code: &str, tags: &[&str]) -> Record {
        Record {
            code: Some(code.to_string()),
            ..record(name, tags)
        }
    }

    async fn store_in(dir: &tempfile::TempDir) -> DocumentStore {
        DocumentStore::open(dir.path().join("records.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_without_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        tokio::fs::write(&path, "[{\"name\":").await.unwrap();

        let err = DocumentStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        // the broken file must survive for inspection / 损坏文件保留以便排查
        assert_eq!(
            tokio::fs::read_to_string(&path).await.unwrap(),
            "[{\"name\":"
        );
    }

    #[tokio::test]
    async fn test_append_then_search_by_each_field() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let entry = Record {
            name: "Ripgrep Notes".to_string(),
            url: Some("https://example.com/rg".to_string()),
            code: Some("rg --Files-With-Matches pattern".to_string()),
            tags: vec!["Search".to_string(), "cli".to_string()],
        };
        store.append(entry.clone()).await.unwrap();

        // name, code and tag matches, all case-insensitive / 名称、代码、标签均可匹配
        assert_eq!(store.search("ripgrep").await, vec![entry.clone()]);
        assert_eq!(store.search("files-with").await, vec![entry.clone()]);
        assert_eq!(store.search("SEARCH").await, vec![entry.clone()]);
        // url is not a searched field / url 不参与搜索
        assert!(store.search("example.com").await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_returns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;
        store.append(record("Alpha", &["cli"])).await.unwrap();

        assert!(store.search("").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_preserves_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        store.append(record("Alpha Tool", &["cli", "go"])).await.unwrap();
        store.append(record("Beta", &["search", "cli"])).await.unwrap();

        let both = store.search("cli").await;
        assert_eq!(both.len(), 2);
        assert_eq!(both[0].name, "Alpha Tool");
        assert_eq!(both[1].name, "Beta");

        let second_only = store.search("beta").await;
        assert_eq!(second_only.len(), 1);
        assert_eq!(second_only[0].name, "Beta");
    }

    #[tokio::test]
    async fn test_invalid_append_mutates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let store = DocumentStore::open(&path).await.unwrap();

        store.append(record("Alpha Tool", &["cli", "go"])).await.unwrap();
        store.append(record("Beta", &["search", "cli"])).await.unwrap();
        let on_disk = tokio::fs::read_to_string(&path).await.unwrap();

        for bad in [
            record("", &["x"]),
            record("   ", &["x"]),
            record("no tags", &[]),
            record("blank tag", &["ok", " "]),
        ] {
            let err = store.append(bad).await.unwrap_err();
            assert!(matches!(err, StoreError::Validation(_)));
        }

        assert_eq!(store.len().await, 2);
        // file is byte-for-byte untouched / 文件内容逐字节不变
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), on_disk);
    }

    #[tokio::test]
    async fn test_validation_error_names_the_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let err = store.append(record("", &[])).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("name"));
        assert!(message.contains("tag"));
    }

    #[tokio::test]
    async fn test_append_reloads_external_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let store = DocumentStore::open(&path).await.unwrap();
        store.append(record("Mine", &["a"])).await.unwrap();

        // another instance appends to the same file / 另一实例写入同一文件
        let other = DocumentStore::open(&path).await.unwrap();
        other.append(record("Theirs", &["b"])).await.unwrap();

        // the stale store does not see it yet... / 旧快照暂时看不到
        assert!(store.search("theirs").await.is_empty());

        // ...but its next append picks it up instead of clobbering it
        store.append(record("Mine Again", &["c"])).await.unwrap();
        let names: Vec<String> = RecordFile::new(&path)
            .load()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Mine", "Theirs", "Mine Again"]);
        assert_eq!(store.search("theirs").await.len(), 1);
    }

    #[tokio::test]
    async fn test_append_propagates_reload_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let store = DocumentStore::open(&path).await.unwrap();
        store.append(record("Alpha", &["cli"])).await.unwrap();

        // someone hand-edits the file into garbage / 文件被手工改坏
        tokio::fs::write(&path, "[oops").await.unwrap();

        let err = store.append(record("Beta", &["cli"])).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        // must not have overwritten the broken file / 不得覆盖损坏文件
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "[oops");
    }

    #[tokio::test]
    async fn test_failed_save_errors_and_keeps_memory_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        tokio::fs::create_dir(&data_dir).await.unwrap();

        let store = DocumentStore::open(data_dir.join("records.json"))
            .await
            .unwrap();
        store.append(record("Alpha", &["cli"])).await.unwrap();

        // make the write-back fail / 使写回失败
        tokio::fs::remove_dir_all(&data_dir).await.unwrap();

        let err = store.append(record("Beta", &["cli"])).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        // memory still serves the pre-failure snapshot / 内存仍为失败前快照
        assert_eq!(store.len().await, 1);
        assert_eq!(store.search("alpha").await.len(), 1);
        assert!(store.search("beta").await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let entry = record_with_code("Dup", "let x = 1;", &["twice"]);
        store.append(entry.clone()).await.unwrap();
        store.append(entry.clone()).await.unwrap();

        assert_eq!(store.search("twice").await, vec![entry.clone(), entry]);
    }

    #[tokio::test]
    async fn test_multiline_code_matches() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let entry = record_with_code(
            "Escaping",
            "<script>\n  alert(\"1 < 2 && 3 > 2\");\n</script>",
            &["html"],
        );
        store.append(entry.clone()).await.unwrap();

        assert_eq!(store.search("alert").await, vec![entry.clone()]);
        assert_eq!(store.search("&& 3 >").await, vec![entry]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_all_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let store = std::sync::Arc::new(DocumentStore::open(&path).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append(record(&format!("entry-{}", i), &["race"])).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.len().await, 8);
        assert_eq!(RecordFile::new(&path).load().await.unwrap().len(), 8);
    }
}
