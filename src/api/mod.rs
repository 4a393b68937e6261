// ==========================================
// 订单对账系统 - API 层
// ==========================================
// 职责: 输入校验 + 错误转换，供命令行调用
// ==========================================

pub mod catalog_api;
pub mod error;
pub mod import_api;
pub mod report_api;
pub mod validator;

// 重导出核心类型
pub use catalog_api::CatalogApi;
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use import_api::ImportApi;
pub use report_api::ReportApi;
pub use validator::MasterDataValidator;
