// ==========================================
// 订单对账系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 整文档读写 + revision 并发控制，屏蔽后端差异
// ==========================================

pub mod error;
pub mod json_file_store;
pub mod report_store;
pub mod sqlite_store;

pub use error::{RepositoryError, RepositoryResult};
pub use json_file_store::JsonFileStore;
pub use report_store::{Collection, DocumentStore, ReportStore, StoredDocument, Versioned};
pub use sqlite_store::SqliteReportStore;
