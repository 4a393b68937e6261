// ==========================================
// 订单对账系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 单条订单派生失败（只丢弃该条，不中断批次）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderProcessError {
    #[error("必填字段缺失: {field}")]
    MissingField { field: String },

    #[error("数值无法解析 (字段 {field}): {value}")]
    InvalidNumber { field: String, value: String },

    #[error("日期格式错误: {value}")]
    InvalidDate { value: String },
}

/// 报表操作级错误（整个操作失败，不产生部分报表）
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("上游数据集缺失: {0}")]
    MissingDataset(String),

    #[error("全部 {count} 条订单处理失败，未生成报表")]
    AllOrdersFailed { count: usize },

    #[error("报表不存在")]
    ReportNotFound,

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type ReportResult<T> = Result<T, ReportError>;
