// ==========================================
// 订单对账系统 - 主数据 API
// ==========================================
// 职责: 商品目录与费率规则的查询和整体替换
// ==========================================

use std::sync::Arc;

use chrono::Utc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::MasterDataValidator;
use crate::domain::catalog::Catalog;
use crate::domain::fee_rule::FeeRuleSet;
use crate::repository::ReportStore;
use tracing::info;

pub struct CatalogApi {
    store: Arc<dyn ReportStore>,
    validator: MasterDataValidator,
}

impl CatalogApi {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self {
            store,
            validator: MasterDataValidator,
        }
    }

    // ===== 商品目录 =====

    pub async fn get_catalog(&self) -> ApiResult<Catalog> {
        self.store
            .load_catalog()
            .await?
            .ok_or_else(|| ApiError::NotFound("商品目录".to_string()))
    }

    /// 校验后整体替换商品目录（写入 last_updated）
    pub async fn save_catalog(&self, mut catalog: Catalog) -> ApiResult<Catalog> {
        self.validator
            .ensure_valid("商品目录", self.validator.check_catalog(&catalog))?;
        catalog.last_updated = Some(Utc::now());
        self.store.save_catalog(&catalog).await?;
        info!(products = catalog.products.len(), "商品目录已保存");
        Ok(catalog)
    }

    pub async fn save_catalog_json(&self, json: &str) -> ApiResult<Catalog> {
        let catalog: Catalog = serde_json::from_str(json)
            .map_err(|e| ApiError::InvalidInput(format!("商品目录 JSON 格式错误: {}", e)))?;
        self.save_catalog(catalog).await
    }

    // ===== 费率规则 =====

    pub async fn get_fee_rules(&self) -> ApiResult<FeeRuleSet> {
        self.store
            .load_fee_rules()
            .await?
            .ok_or_else(|| ApiError::NotFound("费率规则".to_string()))
    }

    /// 校验后整体替换费率规则
    pub async fn save_fee_rules(&self, rules: FeeRuleSet) -> ApiResult<FeeRuleSet> {
        self.validator
            .ensure_valid("费率规则", self.validator.check_fee_rules(&rules))?;
        self.store.save_fee_rules(&rules).await?;
        info!(groups = rules.rules.len(), "费率规则已保存");
        Ok(rules)
    }

    pub async fn save_fee_rules_json(&self, json: &str) -> ApiResult<FeeRuleSet> {
        let rules: FeeRuleSet = serde_json::from_str(json)
            .map_err(|e| ApiError::InvalidInput(format!("费率规则 JSON 格式错误: {}", e)))?;
        self.save_fee_rules(rules).await
    }
}
