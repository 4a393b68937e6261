// ==========================================
// 订单对账系统 - 对账配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

pub type ConfigError = Box<dyn Error + Send + Sync>;

// ==========================================
// ReportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（config_kv 表）、DefaultConfig（内置默认值）
#[async_trait]
pub trait ReportConfigReader: Send + Sync {
    /// 商品未命中目录时的默认类目
    ///
    /// # 默认值
    /// - "A"
    async fn get_default_category(&self) -> Result<String, ConfigError>;

    /// 导入时视为取消的订单状态（大小写不敏感）
    ///
    /// # 默认值
    /// - "batal"
    async fn get_canceled_status(&self) -> Result<String, ConfigError>;

    /// 显式删除前是否备份报表
    ///
    /// # 默认值
    /// - true
    async fn get_backup_before_delete(&self) -> Result<bool, ConfigError>;
}

// ==========================================
// DefaultConfig - 内置默认值
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConfig;

#[async_trait]
impl ReportConfigReader for DefaultConfig {
    async fn get_default_category(&self) -> Result<String, ConfigError> {
        Ok(crate::engine::settings::DEFAULT_CATEGORY.to_string())
    }

    async fn get_canceled_status(&self) -> Result<String, ConfigError> {
        Ok(crate::engine::settings::DEFAULT_CANCELED_STATUS.to_string())
    }

    async fn get_backup_before_delete(&self) -> Result<bool, ConfigError> {
        Ok(true)
    }
}
