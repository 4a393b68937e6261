// ==========================================
// 订单对账系统 - 核心库
// ==========================================
// 职责: 平台订单导入、去重、费用与利润计算、报表合并
// 技术栈: Rust + SQLite / JSON 文件
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 文档存储
pub mod repository;

// 引擎层 - 对账计算
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组合根
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    Catalog, CellValue, DeletedOrderSet, FeeRule, FeeRuleGroup, FeeRuleSet, ProcessedOrder,
    Product, RawOrder, Report, ReportSummary, Variation,
};

pub use engine::{
    compute_summary, normalize_money_value, DeletionTracker, GenerationOutcome, OrderProcessor,
    ReconSettings, ReportError, ReportMerger, ReportOrchestrator,
};

pub use api::{ApiError, ApiResult, CatalogApi, ImportApi, ReportApi};

pub use app::{AppState, StoreBackend};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "电商平台订单对账系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
