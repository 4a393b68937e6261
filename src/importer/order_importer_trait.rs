// ==========================================
// 订单对账系统 - 订单导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 解析 → 取消状态过滤 → 字段映射 → 批次合并 → 落库 → 生成报表
// ==========================================

use crate::domain::order::RawOrder;
use crate::domain::types::CellValue;
use crate::importer::error::ImportResult;
use std::collections::HashMap;
use std::path::Path;

/// 解析后的表格行（列名 → 单元格）
pub type RawRow = HashMap<String, CellValue>;

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为行记录（首行为表头，完全空白的行跳过）
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// RowFilter Trait
// ==========================================
// 实现者: StatusFilter
pub trait RowFilter: Send + Sync {
    /// 该行是否应被剔除
    fn should_drop(&self, row: &RawRow) -> bool;

    /// 过滤整批，返回 (保留行, 剔除行数)
    fn filter(&self, rows: Vec<RawRow>) -> (Vec<RawRow>, usize) {
        let total = rows.len();
        let kept: Vec<RawRow> = rows.into_iter().filter(|r| !self.should_drop(r)).collect();
        let dropped = total - kept.len();
        (kept, dropped)
    }
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 实现者: FieldMapper
pub trait RowMapper: Send + Sync {
    /// 行 → RawOrder（列名大小写不敏感）
    fn map_to_raw_order(&self, row: &RawRow) -> RawOrder;
}
