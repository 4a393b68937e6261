// ==========================================
// 订单对账系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与值类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod catalog;
pub mod fee_rule;
pub mod order;
pub mod report;
pub mod types;

// 重导出核心类型
pub use catalog::{Catalog, Product, Variation};
pub use fee_rule::{FeeRule, FeeRuleGroup, FeeRuleSet};
pub use order::{ProcessedOrder, RawOrder};
pub use report::{DeletedOrderSet, Report, ReportSummary};
pub use types::{composite_key, CellValue};
