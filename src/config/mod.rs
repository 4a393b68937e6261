// ==========================================
// 订单对账系统 - 配置层
// ==========================================
// 职责: 对账参数读取（默认类目、取消状态、删除前备份）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod report_config_trait;

pub use config_manager::{config_keys, ConfigManager};
pub use report_config_trait::{ConfigError, DefaultConfig, ReportConfigReader};
