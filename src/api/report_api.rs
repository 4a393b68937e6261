// ==========================================
// 订单对账系统 - 报表 API
// ==========================================
// 职责: 报表生成 / 试算 / 查询 / 删除 / 人工录入 / 备份恢复
// 输入校验在此完成，业务流程委托给 ReportOrchestrator
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::order::RawOrder;
use crate::domain::report::Report;
use crate::engine::orchestrator::{
    DeleteOutcome, GenerationOutcome, ManualEntryOutcome, PreviewOutcome, ReportOrchestrator,
    RestoreOutcome,
};
use tracing::info;

pub struct ReportApi {
    orchestrator: Arc<ReportOrchestrator>,
}

impl ReportApi {
    pub fn new(orchestrator: Arc<ReportOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// 按当前原始订单生成（合并）报表
    pub async fn generate_report(&self) -> ApiResult<GenerationOutcome> {
        Ok(self.orchestrator.generate().await?)
    }

    /// 试算报表（不落库）
    pub async fn preview_report(&self) -> ApiResult<PreviewOutcome> {
        Ok(self.orchestrator.preview().await?)
    }

    /// 查询当前报表
    pub async fn get_report(&self) -> ApiResult<Report> {
        Ok(self.orchestrator.current_report().await?)
    }

    /// 删除订单
    ///
    /// # 参数
    /// - order_numbers: 订单号列表（不能为空）
    pub async fn delete_orders(&self, order_numbers: &[String]) -> ApiResult<DeleteOutcome> {
        if order_numbers.iter().all(|n| n.trim().is_empty()) {
            return Err(ApiError::InvalidInput("订单号列表不能为空".to_string()));
        }
        Ok(self.orchestrator.delete_orders(order_numbers).await?)
    }

    /// 人工录入订单
    pub async fn add_manual_entries(
        &self,
        entries: &[RawOrder],
        append: bool,
    ) -> ApiResult<ManualEntryOutcome> {
        if entries.is_empty() {
            return Err(ApiError::InvalidInput("录入数据不能为空".to_string()));
        }
        Ok(self.orchestrator.add_manual_entries(entries, append).await?)
    }

    /// 人工录入（JSON 数组形式）
    pub async fn add_manual_entries_json(&self, json: &str, append: bool) -> ApiResult<ManualEntryOutcome> {
        let entries: Vec<RawOrder> = serde_json::from_str(json)
            .map_err(|e| ApiError::InvalidInput(format!("录入数据格式错误: {}", e)))?;
        self.add_manual_entries(&entries, append).await
    }

    /// 备份当前报表，返回备份标识
    pub async fn backup_report(&self) -> ApiResult<String> {
        Ok(self.orchestrator.backup_report().await?)
    }

    /// 用上传的报表文档替换当前报表
    ///
    /// # 参数
    /// - json: 报表 JSON，必须包含 orders 数组
    pub async fn restore_report(&self, json: &str) -> ApiResult<RestoreOutcome> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ApiError::InvalidInput(format!("报表 JSON 解析失败: {}", e)))?;
        if !value.get("orders").map(|o| o.is_array()).unwrap_or(false) {
            return Err(ApiError::ValidationError("报表缺少 orders 数组".to_string()));
        }
        let report: Report = serde_json::from_value(value)
            .map_err(|e| ApiError::ValidationError(format!("报表订单格式错误: {}", e)))?;

        let outcome = self.orchestrator.restore_report(report).await?;
        info!(rows = outcome.restored_rows, "报表已恢复");
        Ok(outcome)
    }
}
