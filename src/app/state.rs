// ==========================================
// 订单对账系统 - 应用状态
// ==========================================
// 职责: 管理存储资源与 API 实例的生命周期
// 生命周期: open（获取存储 + 建表 + 健康检查）→ 使用 → shutdown（释放）
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{CatalogApi, ImportApi, ReportApi};
use crate::config::{ConfigManager, DefaultConfig, ReportConfigReader};
use crate::engine::ReportOrchestrator;
use crate::importer::OrderImporter;
use crate::repository::{JsonFileStore, ReportStore, SqliteReportStore};

/// 存储后端
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    /// SQLite 数据库文件
    Sqlite(String),
    /// JSON 文件目录
    JsonDir(PathBuf),
}

impl StoreBackend {
    pub fn describe(&self) -> String {
        match self {
            StoreBackend::Sqlite(path) => format!("sqlite:{}", path),
            StoreBackend::JsonDir(dir) => format!("json:{}", dir.display()),
        }
    }
}

/// 应用状态
pub struct AppState {
    pub backend: StoreBackend,
    pub store: Arc<dyn ReportStore>,
    /// 仅 SQLite 后端可写配置
    pub config_manager: Option<Arc<ConfigManager>>,
    pub orchestrator: Arc<ReportOrchestrator>,
    pub report_api: Arc<ReportApi>,
    pub import_api: Arc<ImportApi>,
    pub catalog_api: Arc<CatalogApi>,
}

impl AppState {
    /// 打开存储并构建 API
    pub async fn open(backend: StoreBackend) -> Result<Self, String> {
        tracing::info!("初始化AppState，存储: {}", backend.describe());

        let (store, config_manager): (Arc<dyn ReportStore>, Option<Arc<ConfigManager>>) =
            match &backend {
                StoreBackend::Sqlite(db_path) => {
                    let sqlite = SqliteReportStore::new(db_path)
                        .map_err(|e| format!("无法打开数据库: {}", e))?;
                    let config = ConfigManager::from_connection(sqlite.connection())
                        .map_err(|e| format!("无法创建ConfigManager: {}", e))?;
                    (Arc::new(sqlite) as Arc<dyn ReportStore>, Some(Arc::new(config)))
                }
                StoreBackend::JsonDir(dir) => {
                    let json = JsonFileStore::new(dir.clone())
                        .map_err(|e| format!("无法打开数据目录: {}", e))?;
                    (Arc::new(json) as Arc<dyn ReportStore>, None)
                }
            };

        store
            .health_check()
            .await
            .map_err(|e| format!("存储健康检查失败: {}", e))?;

        let config: Arc<dyn ReportConfigReader> = match &config_manager {
            Some(manager) => manager.clone() as Arc<dyn ReportConfigReader>,
            None => Arc::new(DefaultConfig),
        };

        let orchestrator = Arc::new(ReportOrchestrator::new(store.clone(), config));
        let importer = Arc::new(OrderImporter::new(orchestrator.clone()));

        let state = Self {
            backend,
            report_api: Arc::new(ReportApi::new(orchestrator.clone())),
            import_api: Arc::new(ImportApi::new(importer)),
            catalog_api: Arc::new(CatalogApi::new(store.clone())),
            orchestrator,
            config_manager,
            store,
        };

        tracing::info!("AppState初始化成功");
        Ok(state)
    }

    /// 释放存储资源
    pub fn shutdown(self) {
        tracing::info!("释放存储资源: {}", self.backend.describe());
        drop(self);
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 MP_ORDER_REPORT_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("MP_ORDER_REPORT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./mp_order_report.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("mp-order-report");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("mp_order_report.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
    }

    #[tokio::test]
    async fn test_open_json_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = AppState::open(StoreBackend::JsonDir(dir.path().to_path_buf()))
            .await
            .unwrap();
        assert!(state.config_manager.is_none());
        state.shutdown();
    }
}
