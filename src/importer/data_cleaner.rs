// ==========================================
// 订单对账系统 - 取消状态过滤
// ==========================================
// 规则: 列名（小写）包含 "status" 或 "pesanan" 的任一列，
//       其文本值等于取消状态（大小写不敏感）→ 整行剔除
// ==========================================

use crate::domain::types::CellValue;
use crate::importer::order_importer_trait::{RawRow, RowFilter};

pub struct StatusFilter {
    canceled_status: String,
}

impl StatusFilter {
    pub fn new(canceled_status: impl AsRef<str>) -> Self {
        Self {
            canceled_status: canceled_status.as_ref().trim().to_lowercase(),
        }
    }

    fn is_status_column(column: &str) -> bool {
        let lower = column.to_lowercase();
        lower.contains("status") || lower.contains("pesanan")
    }
}

impl RowFilter for StatusFilter {
    fn should_drop(&self, row: &RawRow) -> bool {
        row.iter().any(|(column, value)| {
            Self::is_status_column(column)
                && matches!(value, CellValue::Text(s) if s.trim().to_lowercase() == self.canceled_status)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), CellValue::from(*v)))
            .collect::<HashMap<_, _>>()
    }

    #[test]
    fn test_drops_canceled_rows_case_insensitive() {
        let filter = StatusFilter::new("batal");
        assert!(filter.should_drop(&row(&[("Status Pesanan", "Batal")])));
        assert!(filter.should_drop(&row(&[("order status", "BATAL")])));
        assert!(!filter.should_drop(&row(&[("Status Pesanan", "Selesai")])));
        // 非状态列中出现 batal 不影响
        assert!(!filter.should_drop(&row(&[("Catatan", "batal")])));
    }

    #[test]
    fn test_filter_counts_dropped() {
        let filter = StatusFilter::new("Batal");
        let rows = vec![
            row(&[("Status Pesanan", "Selesai")]),
            row(&[("Status Pesanan", "Batal")]),
            row(&[("Status Pesanan", "Dikirim")]),
        ];
        let (kept, dropped) = filter.filter(rows);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 1);
    }
}
