// ==========================================
// 订单对账系统 - JSON 文件存储
// ==========================================
// 布局: 一个目录，每个集合一个 JSON 文件
//       revisions.json 记录各集合 revision
//       报表备份: report-data.backup.<timestamp>.json
// 写入: 临时文件 + rename（原子替换）
// 并发: 进程内由互斥锁串行化；跨进程不保证
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::report_store::{Collection, DocumentStore, StoredDocument};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

const REVISIONS_FILE: &str = "revisions.json";

pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// 打开（必要时创建）数据目录
    pub fn new(dir: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, collection: Collection) -> PathBuf {
        self.dir.join(collection.file_name())
    }

    fn read_revisions(&self) -> RepositoryResult<HashMap<String, i64>> {
        let path = self.dir.join(REVISIONS_FILE);
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let body = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&body)?)
    }

    fn revision_of(&self, collection: Collection) -> RepositoryResult<i64> {
        Ok(self
            .read_revisions()?
            .get(collection.as_str())
            .copied()
            .unwrap_or(0))
    }
}

/// 临时文件 + rename
fn write_atomically(path: &Path, body: &str) -> RepositoryResult<()> {
    let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4().simple()));
    fs::write(&tmp, body)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn read_document(&self, collection: Collection) -> RepositoryResult<Option<StoredDocument>> {
        let path = self.path_of(collection);
        if !path.exists() {
            return Ok(None);
        }
        let body_json = fs::read_to_string(&path)?;
        Ok(Some(StoredDocument {
            body_json,
            revision: self.revision_of(collection)?,
        }))
    }

    async fn write_document(
        &self,
        collection: Collection,
        body_json: &str,
        expected_revision: Option<i64>,
    ) -> RepositoryResult<i64> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut revisions = self.read_revisions()?;
        let current = revisions.get(collection.as_str()).copied().unwrap_or(0);

        if let Some(expected) = expected_revision {
            if expected != current {
                warn!(
                    collection = collection.as_str(),
                    expected,
                    actual = current,
                    "文档版本冲突，拒绝写入"
                );
                return Err(RepositoryError::OptimisticLockFailure {
                    collection: collection.as_str().to_string(),
                    expected,
                    actual: current,
                });
            }
        }

        let next = current + 1;
        write_atomically(&self.path_of(collection), body_json)?;
        revisions.insert(collection.as_str().to_string(), next);
        write_atomically(
            &self.dir.join(REVISIONS_FILE),
            &serde_json::to_string_pretty(&revisions)?,
        )?;

        debug!(collection = collection.as_str(), revision = next, "文档已写入");
        Ok(next)
    }

    async fn write_backup(&self, body_json: &str) -> RepositoryResult<String> {
        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string();
        let mut name = format!("report-data.backup.{}.json", stamp);
        if self.dir.join(&name).exists() {
            name = format!("report-data.backup.{}-{}.json", stamp, Uuid::new_v4().simple());
        }
        write_atomically(&self.dir.join(&name), body_json)?;
        Ok(name)
    }

    async fn ping(&self) -> RepositoryResult<()> {
        if self.dir.is_dir() {
            Ok(())
        } else {
            Err(RepositoryError::FileIoError(format!(
                "数据目录不存在: {}",
                self.dir.display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read_with_revision() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        assert!(store.read_document(Collection::Orders).await.unwrap().is_none());
        store.write_document(Collection::Orders, "[]", None).await.unwrap();
        let rev = store.write_document(Collection::Orders, "[1]", None).await.unwrap();
        assert_eq!(rev, 2);

        let doc = store.read_document(Collection::Orders).await.unwrap().unwrap();
        assert_eq!(doc.body_json, "[1]");
        assert_eq!(doc.revision, 2);
        assert!(dir.path().join("orderData.json").exists());
    }

    #[tokio::test]
    async fn test_stale_revision_rejected() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        store.write_document(Collection::DeletedOrders, "[]", Some(0)).await.unwrap();
        let err = store
            .write_document(Collection::DeletedOrders, "[\"A\"]", Some(0))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::OptimisticLockFailure { actual: 1, .. }));
    }

    #[tokio::test]
    async fn test_backup_file_written() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        let name = store.write_backup("{\"orders\":[]}").await.unwrap();
        assert!(name.starts_with("report-data.backup."));
        assert!(dir.path().join(&name).exists());
    }
}
