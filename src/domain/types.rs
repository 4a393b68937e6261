// ==========================================
// 订单对账系统 - 领域类型定义
// ==========================================
// 职责: 跨实体共享的值类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 单元格值 (Cell Value)
// ==========================================
// 表格导出的数值列可能是数字，也可能是本地化字符串（如 "1.234.567"）
// 序列化格式: 原样（数字 → JSON number，文本 → JSON string）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

// 2^63，i64 可精确表示的整数上界
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

impl CellValue {
    /// 是否为空白（空字符串或仅空白字符）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Number(_) => false,
            CellValue::Text(s) => s.trim().is_empty(),
        }
    }

    /// 转为文本（数字按最短表示输出，整数不带小数点）
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            // 超出 i64 范围的整数不做截断转换
            CellValue::Number(n) if n.fract() == 0.0 && n.is_finite() && n.abs() < I64_LIMIT => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// 订单号比较键（去首尾空白）
///
/// 删除集、删除推断、显式删除、报表去重统一使用该键
pub fn order_key(order_number: &str) -> &str {
    order_number.trim()
}

/// 组合去重键: `订单号-商品名`
pub fn composite_key(order_number: &str, product_name: &str) -> String {
    format!("{}-{}", order_key(order_number), product_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_untagged_serde() {
        let n: CellValue = serde_json::from_str("2").unwrap();
        assert_eq!(n, CellValue::Number(2.0));

        let t: CellValue = serde_json::from_str("\"50.000\"").unwrap();
        assert_eq!(t, CellValue::Text("50.000".to_string()));
    }

    #[test]
    fn test_cell_value_to_text() {
        assert_eq!(CellValue::Number(45000.0).to_text(), "45000");
        assert_eq!(CellValue::Number(1.5).to_text(), "1.5");
        assert!(CellValue::Text("  ".to_string()).is_blank());
    }

    #[test]
    fn test_cell_value_to_text_large_numbers() {
        assert_eq!(CellValue::Number(1e20).to_text(), 1e20_f64.to_string());
        assert_ne!(CellValue::Number(1e20).to_text(), i64::MAX.to_string());
        assert_eq!(CellValue::Number(-1e19).to_text(), (-1e19_f64).to_string());
        assert_eq!(CellValue::Number(9_007_199_254_740_993.0).to_text(), "9007199254740992");
    }

    #[test]
    fn test_order_key_trims() {
        assert_eq!(order_key("  X1 "), "X1");
        assert_eq!(composite_key(" X1", "Widget"), composite_key("X1", "Widget"));
    }
}
