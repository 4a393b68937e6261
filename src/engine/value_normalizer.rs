// ==========================================
// 订单对账系统 - 数值标准化
// ==========================================
// 规则: 本地化金额字符串中的 '.' 是千分位，不是小数点
//   "1.234.567" → 1234567
// 非字符串数值原样通过；无法解析 → NaN（调用方必须防御）
// ==========================================

use crate::domain::types::CellValue;

/// 标准化金额/数量
pub fn normalize_money_value(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => normalize_money_str(s),
    }
}

/// 标准化金额字符串
pub fn normalize_money_str(raw: &str) -> f64 {
    // 1) 只保留数字和 '.'  2) 去掉所有 '.'
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let digits: String = kept.chars().filter(|c| *c != '.').collect();

    if digits.is_empty() {
        return f64::NAN;
    }
    digits.parse::<f64>().unwrap_or(f64::NAN)
}

/// 标准化后仅保留有限数值
pub fn normalize_finite(value: &CellValue) -> Option<f64> {
    let n = normalize_money_value(value);
    n.is_finite().then_some(n)
}

// ==========================================
// 宽松前缀解析（人工录入表单使用）
// ==========================================

/// 解析字符串开头的浮点数（"12.5kg" → 12.5，"abc" → None）
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }

    if mantissa_digits == 0 {
        return None;
    }

    // 指数部分只有在后面跟着数字时才生效
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// 解析字符串开头的整数（"3 pcs" → 3）
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse::<i64>().ok()
}

/// 单元格宽松浮点解析
pub fn lenient_float(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Number(_) => None,
        CellValue::Text(s) => parse_float_prefix(s),
    }
}

/// 单元格宽松整数解析（数字截断小数部分）
pub fn lenient_int(value: &CellValue) -> Option<i64> {
    match value {
        CellValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
        CellValue::Number(_) => None,
        CellValue::Text(s) => parse_int_prefix(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separator_removed() {
        assert_eq!(normalize_money_str("1.234.567"), 1234567.0);
        assert_eq!(normalize_money_str("50.000"), 50000.0);
    }

    #[test]
    fn test_currency_prefix_stripped() {
        assert_eq!(normalize_money_str("Rp 12.500"), 12500.0);
        assert_eq!(normalize_money_str(" 2 "), 2.0);
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(normalize_money_value(&CellValue::Number(49999.5)), 49999.5);
        assert_eq!(normalize_money_value(&CellValue::Number(-10.0)), -10.0);
    }

    #[test]
    fn test_unparseable_is_nan() {
        assert!(normalize_money_str("").is_nan());
        assert!(normalize_money_str("N/A").is_nan());
        assert_eq!(normalize_finite(&CellValue::Text("abc".to_string())), None);
    }

    #[test]
    fn test_float_prefix() {
        assert_eq!(parse_float_prefix("12.5kg"), Some(12.5));
        assert_eq!(parse_float_prefix("  -3"), Some(-3.0));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("1e3x"), Some(1000.0));
        assert_eq!(parse_float_prefix("2e"), Some(2.0));
        assert_eq!(parse_float_prefix("50.000"), Some(50.0));
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix("-"), None);
    }

    #[test]
    fn test_int_prefix() {
        assert_eq!(parse_int_prefix("3 pcs"), Some(3));
        assert_eq!(parse_int_prefix("2.9"), Some(2));
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(lenient_int(&CellValue::Number(2.7)), Some(2));
    }
}
