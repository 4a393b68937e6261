// ==========================================
// 订单对账系统 - 报表合并
// ==========================================
// 合并策略: 以组合键（订单号-商品名）去重，已有订单优先（只插入，不覆盖）
// 顺序: 已有订单在前，新订单按源顺序追加
// 汇总: 每次都对完整订单列表全量重算
// ==========================================

use crate::domain::order::ProcessedOrder;
use crate::domain::report::{Report, ReportSummary};
use crate::domain::types::order_key;
use chrono::Utc;
use std::collections::HashSet;
use tracing::debug;

/// 合并结果
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub report: Report,
    pub added: usize,
    pub duplicates: usize,
}

pub struct ReportMerger;

impl ReportMerger {
    /// 合并新订单到已有报表
    ///
    /// # 参数
    /// - existing: 已持久化报表；None 时新订单原样成为报表
    /// - new_orders: 新派生订单
    pub fn merge(existing: Option<&Report>, new_orders: Vec<ProcessedOrder>) -> MergeOutcome {
        let Some(existing) = existing else {
            let added = new_orders.len();
            return MergeOutcome {
                report: build_report(new_orders),
                added,
                duplicates: 0,
            };
        };

        let seen = existing.composite_keys();
        let incoming = new_orders.len();
        let fresh: Vec<ProcessedOrder> = new_orders
            .into_iter()
            .filter(|o| !seen.contains(&o.composite_key()))
            .collect();
        let added = fresh.len();

        let mut orders = Vec::with_capacity(existing.orders.len() + added);
        orders.extend(existing.orders.iter().cloned());
        orders.extend(fresh);

        debug!(
            existing = existing.orders.len(),
            added,
            duplicates = incoming - added,
            "报表合并完成"
        );

        MergeOutcome {
            report: build_report(orders),
            added,
            duplicates: incoming - added,
        }
    }

    /// 从报表中移除指定订单号的全部订单行
    ///
    /// # 返回
    /// (新报表, 移除行数)；汇总总是重算
    pub fn remove_orders(report: &Report, order_numbers: &HashSet<String>) -> (Report, usize) {
        let kept: Vec<ProcessedOrder> = report
            .orders
            .iter()
            .filter(|o| !order_numbers.contains(order_key(&o.order_number)))
            .cloned()
            .collect();
        let removed = report.orders.len() - kept.len();
        (build_report(kept), removed)
    }
}

/// 以当前时间生成报表
pub fn build_report(orders: Vec<ProcessedOrder>) -> Report {
    Report {
        generated_at: Utc::now(),
        summary: compute_summary(&orders),
        orders,
    }
}

/// 汇总统计（averageMargin 分母为 earnings，零值/非有限值保护）
pub fn compute_summary(orders: &[ProcessedOrder]) -> ReportSummary {
    let total_earnings: f64 = orders.iter().map(|o| o.earnings).sum();
    let total_margin: f64 = orders.iter().map(|o| o.margin).sum();

    let average_margin = if total_earnings != 0.0 && total_earnings.is_finite() {
        let avg = total_margin / total_earnings * 100.0;
        if avg.is_finite() {
            avg
        } else {
            0.0
        }
    } else {
        0.0
    };

    ReportSummary {
        total_orders: orders.len(),
        total_earnings: if total_earnings.is_finite() { total_earnings } else { 0.0 },
        average_margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(number: &str, product: &str, earnings: f64, margin: f64) -> ProcessedOrder {
        ProcessedOrder {
            order_date: Utc::now(),
            order_number: number.to_string(),
            product_name: product.to_string(),
            variation_name: product.to_string(),
            quantity: 1.0,
            base_price: 0.0,
            total_base_price: earnings - margin,
            selling_price: earnings,
            subtotal: earnings,
            mp_fee: 0.0,
            voucher: 0.0,
            earnings,
            margin,
        }
    }

    #[test]
    fn test_merge_without_existing() {
        let outcome = ReportMerger::merge(None, vec![order("A", "P", 100.0, 40.0)]);
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.report.summary.total_orders, 1);
        assert_eq!(outcome.report.summary.average_margin, 40.0);
    }

    #[test]
    fn test_existing_wins_and_order_preserved() {
        let existing = ReportMerger::merge(None, vec![order("A", "P", 100.0, 40.0)]).report;
        let outcome = ReportMerger::merge(
            Some(&existing),
            vec![order("B", "P", 200.0, 50.0), order("A", "P", 999.0, 1.0)],
        );
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.duplicates, 1);
        let numbers: Vec<&str> = outcome.report.orders.iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(numbers, vec!["A", "B"]);
        assert_eq!(outcome.report.orders[0].earnings, 100.0);
        assert_eq!(outcome.report.summary.total_earnings, 300.0);
        assert_eq!(outcome.report.summary.average_margin, 30.0);
    }

    #[test]
    fn test_same_order_number_different_product_is_distinct() {
        let existing = ReportMerger::merge(None, vec![order("A", "P", 100.0, 40.0)]).report;
        let outcome = ReportMerger::merge(Some(&existing), vec![order("A", "Q", 50.0, 10.0)]);
        assert_eq!(outcome.added, 1);
    }

    #[test]
    fn test_merge_into_itself_is_idempotent() {
        let report = ReportMerger::merge(
            None,
            vec![order("A", "P", 100.0, 40.0), order("B", "P", 300.0, 20.0)],
        )
        .report;
        let again = ReportMerger::merge(Some(&report), report.orders.clone()).report;
        assert_eq!(again.orders.len(), report.orders.len());
        assert_eq!(again.summary, report.summary);
    }

    #[test]
    fn test_empty_summary_zero_guard() {
        let summary = compute_summary(&[]);
        assert_eq!(summary.total_orders, 0);
        assert_eq!(summary.average_margin, 0.0);
        assert!(!summary.average_margin.is_nan());
    }

    #[test]
    fn test_zero_earnings_guard() {
        let summary = compute_summary(&[order("A", "P", 100.0, 10.0), order("B", "P", -100.0, 5.0)]);
        assert_eq!(summary.total_earnings, 0.0);
        assert_eq!(summary.average_margin, 0.0);
    }

    #[test]
    fn test_remove_orders_recomputes_summary() {
        let report = ReportMerger::merge(
            None,
            vec![order("A", "P", 100.0, 40.0), order("A", "Q", 100.0, 40.0), order("B", "P", 100.0, 10.0)],
        )
        .report;
        let numbers: HashSet<String> = ["A".to_string()].into_iter().collect();
        let (after, removed) = ReportMerger::remove_orders(&report, &numbers);
        assert_eq!(removed, 2);
        assert_eq!(after.summary.total_orders, 1);
        assert_eq!(after.summary.average_margin, 10.0);
    }

    #[test]
    fn test_remove_orders_matches_padded_rows() {
        let report = ReportMerger::merge(
            None,
            vec![order(" X1", "P", 100.0, 40.0), order("X2", "P", 100.0, 10.0)],
        )
        .report;
        let numbers: HashSet<String> = ["X1".to_string()].into_iter().collect();
        let (after, removed) = ReportMerger::remove_orders(&report, &numbers);
        assert_eq!(removed, 1);
        assert_eq!(after.orders[0].order_number, "X2");
    }

    #[test]
    fn test_padded_existing_row_deduplicates() {
        let existing = ReportMerger::merge(None, vec![order(" A", "P", 100.0, 40.0)]).report;
        let outcome = ReportMerger::merge(Some(&existing), vec![order("A", "P", 100.0, 40.0)]);
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.duplicates, 1);
    }
}
