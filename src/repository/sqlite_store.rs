// ==========================================
// 订单对账系统 - SQLite 文档存储
// ==========================================
// 表: document_store（每个集合一行: JSON 文档 + revision）
//     report_backup（报表备份）
// CAS: 在 IMMEDIATE 事务内比较 revision 后写入
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection, read_schema_version};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::report_store::{Collection, DocumentStore, StoredDocument};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

// ==========================================
// SqliteReportStore
// ==========================================
pub struct SqliteReportStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteReportStore {
    /// 打开数据库文件并确保表结构
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 共享连接（供 ConfigManager 复用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for SqliteReportStore {
    async fn read_document(&self, collection: Collection) -> RepositoryResult<Option<StoredDocument>> {
        let conn = self.get_conn()?;
        let doc = conn
            .query_row(
                "SELECT body_json, revision FROM document_store WHERE collection = ?1",
                params![collection.as_str()],
                |row| {
                    Ok(StoredDocument {
                        body_json: row.get(0)?,
                        revision: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(doc)
    }

    async fn write_document(
        &self,
        collection: Collection,
        body_json: &str,
        expected_revision: Option<i64>,
    ) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let current: i64 = tx
            .query_row(
                "SELECT revision FROM document_store WHERE collection = ?1",
                params![collection.as_str()],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(0);

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
        tx.execute(
            r#"
            INSERT INTO document_store (collection, body_json, revision, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(collection) DO UPDATE SET
                body_json = excluded.body_json,
                revision = excluded.revision,
                updated_at = excluded.updated_at
            "#,
            params![collection.as_str(), body_json, next, Utc::now().to_rfc3339()],
        )?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(collection = collection.as_str(), revision = next, "文档已写入");
        Ok(next)
    }

    async fn write_backup(&self, body_json: &str) -> RepositoryResult<String> {
        let backup_id = Uuid::new_v4().to_string();
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO report_backup (backup_id, body_json, created_at) VALUES (?1, ?2, ?3)",
            params![backup_id, body_json, Utc::now().to_rfc3339()],
        )?;
        Ok(backup_id)
    }

    async fn ping(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        match read_schema_version(&conn)? {
            Some(_) => Ok(()),
            None => Err(RepositoryError::DatabaseConnectionError(
                "schema_version 表不存在，数据库未初始化".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteReportStore {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        SqliteReportStore::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_missing_document_is_none() {
        let store = store();
        assert!(store.read_document(Collection::ReportData).await.unwrap().is_none());
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_revision_increments_and_cas_rejects_stale() {
        let store = store();
        let rev = store
            .write_document(Collection::ReportData, "{\"orders\":[]}", Some(0))
            .await
            .unwrap();
        assert_eq!(rev, 1);

        let err = store
            .write_document(Collection::ReportData, "{\"orders\":[]}", Some(0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::OptimisticLockFailure { expected: 0, actual: 1, .. }
        ));

        let rev = store
            .write_document(Collection::ReportData, "{\"orders\":[]}", Some(1))
            .await
            .unwrap();
        assert_eq!(rev, 2);
    }

    #[tokio::test]
    async fn test_backup_rows_are_distinct() {
        let store = store();
        let a = store.write_backup("{}").await.unwrap();
        let b = store.write_backup("{}").await.unwrap();
        assert_ne!(a, b);
    }
}
