// ==========================================
// 订单对账系统 - 字段映射器实现
// ==========================================
// 职责: 表格行 → RawOrder（平台导出列名，大小写不敏感）
// 缺省: Nama Variasi / 优惠券缺失 → ""；其他文本缺失 → "N/A"
// ==========================================

use crate::domain::order::{
    RawOrder, COL_MANUAL_FEE, COL_ORDER_NUMBER, COL_ORDER_STATUS, COL_PAID_AT, COL_PRODUCT_NAME,
    COL_QUANTITY, COL_SELLER_VOUCHER, COL_SELLING_PRICE, COL_VARIATION_NAME,
};
use crate::domain::types::CellValue;
use crate::importer::order_importer_trait::{RawRow, RowMapper};
use std::collections::HashMap;

const MISSING: &str = "N/A";

pub struct FieldMapper;

// 列名小写索引
struct RowIndex<'a> {
    cells: HashMap<String, &'a CellValue>,
}

impl<'a> RowIndex<'a> {
    fn new(row: &'a RawRow) -> Self {
        let mut cells = HashMap::with_capacity(row.len());
        for (column, value) in row {
            cells.entry(column.trim().to_lowercase()).or_insert(value);
        }
        Self { cells }
    }

    fn cell(&self, column: &str) -> Option<&'a CellValue> {
        self.cells.get(&column.to_lowercase()).copied()
    }

    fn text_or(&self, column: &str, default: &str) -> String {
        self.cell(column)
            .map(|v| v.to_text().trim().to_string())
            .unwrap_or_else(|| default.to_string())
    }

    fn value_or(&self, column: &str, default: &str) -> CellValue {
        self.cell(column)
            .cloned()
            .unwrap_or_else(|| CellValue::from(default))
    }
}

impl RowMapper for FieldMapper {
    fn map_to_raw_order(&self, row: &RawRow) -> RawOrder {
        let index = RowIndex::new(row);
        RawOrder {
            order_number: index.text_or(COL_ORDER_NUMBER, MISSING),
            order_status: index.text_or(COL_ORDER_STATUS, MISSING),
            paid_at: index.text_or(COL_PAID_AT, MISSING),
            product_name: index.text_or(COL_PRODUCT_NAME, MISSING),
            variation_name: Some(index.text_or(COL_VARIATION_NAME, "")),
            quantity: index.value_or(COL_QUANTITY, MISSING),
            selling_price: index.value_or(COL_SELLING_PRICE, MISSING),
            seller_voucher: index.value_or(COL_SELLER_VOUCHER, ""),
            manual_fee: index.cell(COL_MANUAL_FEE).filter(|v| !v.is_blank()).cloned(),
        }
    }
}

impl FieldMapper {
    /// 批量映射
    pub fn map_rows(&self, rows: &[RawRow]) -> Vec<RawOrder> {
        rows.iter().map(|row| self.map_to_raw_order(row)).collect()
    }
}
