// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use mp_order_report::config::{ConfigError, ReportConfigReader};

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub default_category: String,
    pub canceled_status: String,
    pub backup_before_delete: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            default_category: "A".to_string(),
            canceled_status: "batal".to_string(),
            backup_before_delete: true,
        }
    }
}

impl MockConfig {
    pub fn without_backup() -> Self {
        Self {
            backup_before_delete: false,
            ..Self::default()
        }
    }

    pub fn with_default_category(category: &str) -> Self {
        Self {
            default_category: category.to_string(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ReportConfigReader for MockConfig {
    async fn get_default_category(&self) -> Result<String, ConfigError> {
        Ok(self.default_category.clone())
    }

    async fn get_canceled_status(&self) -> Result<String, ConfigError> {
        Ok(self.canceled_status.clone())
    }

    async fn get_backup_before_delete(&self) -> Result<bool, ConfigError> {
        Ok(self.backup_before_delete)
    }
}
