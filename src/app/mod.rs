// ==========================================
// 订单对账系统 - 应用层
// ==========================================
// 职责: 组合根，按存储后端装配引擎与 API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, StoreBackend};
