// ==========================================
// 存储层集成测试
// ==========================================
// 测试目标: SQLite 与 JSON 文件两种后端行为一致
// 覆盖: 文档读写、revision CAS、删除集、备份
// ==========================================


use mp_order_report::domain::{DeletedOrderSet, Report};
use mp_order_report::engine::ReportMerger;
use mp_order_report::repository::{
    Collection, JsonFileStore, ReportStore, RepositoryError, SqliteReportStore,
};
use tempfile::TempDir;
use test_helpers::{raw_order, sample_catalog, sample_fee_rules};

fn sqlite_store(dir: &TempDir) -> SqliteReportStore {
    let db_path = dir.path().join("repo.db");
    SqliteReportStore::new(db_path.to_str().unwrap()).expect("Failed to open sqlite store")
}

fn json_store(dir: &TempDir) -> JsonFileStore {
    JsonFileStore::new(dir.path().join("data")).expect("Failed to open json store")
}

async fn assert_roundtrip(store: &dyn ReportStore) {
    assert!(store.load_orders().await.unwrap().is_empty());
    assert!(store.load_catalog().await.unwrap().is_none());
    assert!(store.load_fee_rules().await.unwrap().is_none());

    let orders = vec![raw_order("X1", "Widget", "Red", 2.0, "50.000")];
    store.save_orders(&orders).await.unwrap();
    store.save_catalog(&sample_catalog()).await.unwrap();
    store.save_fee_rules(&sample_fee_rules()).await.unwrap();

    assert_eq!(store.load_orders().await.unwrap(), orders);
    assert_eq!(store.load_catalog().await.unwrap(), Some(sample_catalog()));
    assert_eq!(store.load_fee_rules().await.unwrap(), Some(sample_fee_rules()));
}

async fn assert_deleted_cas(store: &dyn ReportStore) {
    let initial = store.load_deleted_orders().await.unwrap();
    assert_eq!(initial.revision, 0);
    assert!(initial.value.is_empty());

    let rev = store
        .save_deleted_orders(&DeletedOrderSet::from_list(["A"]), initial.revision)
        .await
        .unwrap();
    assert_eq!(rev, 1);

    // 过期 revision 写入被拒绝
    let err = store
        .save_deleted_orders(&DeletedOrderSet::from_list(["B"]), initial.revision)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::OptimisticLockFailure { expected: 0, actual: 1, .. }
    ));

    let current = store.load_deleted_orders().await.unwrap();
    assert_eq!(current.revision, 1);
    assert!(current.value.contains("A"));
    assert!(!current.value.contains("B"));
}

async fn assert_report_cas_and_backup(store: &dyn ReportStore) {
    let prior = store.load_prior_report().await.unwrap();
    assert!(prior.value.is_none());
    assert_eq!(prior.revision, 0);

    let report: Report = ReportMerger::merge(None, Vec::new()).report;
    let rev = store.save_report(&report, 0).await.unwrap();

    let err = store.save_report(&report, 0).await.unwrap_err();
    assert!(matches!(err, RepositoryError::OptimisticLockFailure { .. }));

    let loaded = store.load_prior_report().await.unwrap();
    assert_eq!(loaded.revision, rev);
    assert!(loaded.value.is_some());

    let first = store.backup_report(&report).await.unwrap();
    let second = store.backup_report(&report).await.unwrap();
    assert!(!first.is_empty());
    assert_ne!(first, second);

    store.health_check().await.unwrap();
}

#[tokio::test]
async fn test_sqlite_store_roundtrip() {
    let dir = TempDir::new().unwrap();
    let store = sqlite_store(&dir);
    assert_roundtrip(&store).await;
}

#[tokio::test]
async fn test_json_store_roundtrip() {
    let dir = TempDir::new().unwrap();
    let store = json_store(&dir);
    assert_roundtrip(&store).await;

    // 文件名与既有数据目录兼容
    assert!(store.dir().join(Collection::Orders.file_name()).exists());
    assert!(store.dir().join("products-catalog.json").exists());
}

#[tokio::test]
async fn test_sqlite_deleted_orders_cas() {
    let dir = TempDir::new().unwrap();
    assert_deleted_cas(&sqlite_store(&dir)).await;
}

#[tokio::test]
async fn test_json_deleted_orders_cas() {
    let dir = TempDir::new().unwrap();
    assert_deleted_cas(&json_store(&dir)).await;
}

#[tokio::test]
async fn test_sqlite_report_cas_and_backup() {
    let dir = TempDir::new().unwrap();
    assert_report_cas_and_backup(&sqlite_store(&dir)).await;
}

#[tokio::test]
async fn test_json_report_cas_and_backup() {
    let dir = TempDir::new().unwrap();
    assert_report_cas_and_backup(&json_store(&dir)).await;
}

#[tokio::test]
async fn test_sqlite_revision_shared_between_handles() {
    let dir = TempDir::new().unwrap();
    let writer = sqlite_store(&dir);
    let other = sqlite_store(&dir);

    let seen = other.load_deleted_orders().await.unwrap();
    writer
        .save_deleted_orders(&DeletedOrderSet::from_list(["A"]), 0)
        .await
        .unwrap();

    // 另一连接持有过期 revision
    let err = other
        .save_deleted_orders(&DeletedOrderSet::from_list(["B"]), seen.revision)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::OptimisticLockFailure { .. }));
}

#[tokio::test]
async fn test_corrupt_document_reports_collection() {
    let dir = TempDir::new().unwrap();
    let store = json_store(&dir);
    std::fs::write(store.dir().join("deleted-orders.json"), "{not json").unwrap();

    let err = store.load_deleted_orders().await.unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::SerializationError { ref collection, .. } if collection == "deletedOrders"
    ));
}
