// ==========================================
// 订单对账系统 - 引擎运行参数快照
// ==========================================
// 每次操作开始时从配置层读取一次，之后只读
// ==========================================

pub const DEFAULT_CATEGORY: &str = "A";
pub const DEFAULT_CANCELED_STATUS: &str = "batal";

#[derive(Debug, Clone, PartialEq)]
pub struct ReconSettings {
    /// 商品未命中目录时使用的类目
    pub default_category: String,
    /// 取消状态值（大小写不敏感）
    pub canceled_status: String,
    /// 显式删除前是否先备份报表
    pub backup_before_delete: bool,
}

impl Default for ReconSettings {
    fn default() -> Self {
        Self {
            default_category: DEFAULT_CATEGORY.to_string(),
            canceled_status: DEFAULT_CANCELED_STATUS.to_string(),
            backup_before_delete: true,
        }
    }
}
