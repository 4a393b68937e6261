// ==========================================
// 订单对账系统 - 订单导入 API
// ==========================================
// 职责: 封装订单文件导入（导入后自动生成报表）
// ==========================================

use std::path::Path;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::importer::{ImportSummary, OrderImporter};

pub struct ImportApi {
    importer: Arc<OrderImporter>,
}

impl ImportApi {
    pub fn new(importer: Arc<OrderImporter>) -> Self {
        Self { importer }
    }

    /// 导入订单文件
    ///
    /// # 参数
    /// - file_path: 文件路径（.xlsx/.xls/.csv）
    /// - append: 是否追加到已存原始订单
    ///
    /// # 返回
    /// - Ok(ImportSummary): 导入结果（含报表生成统计）
    /// - Err(ApiError): 错误信息
    pub async fn import_orders(&self, file_path: &str, append: bool) -> ApiResult<ImportSummary> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }
        Ok(self.importer.import_file(Path::new(file_path), append).await?)
    }
}
