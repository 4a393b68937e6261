// ==========================================
// 订单对账系统 - 批次合并（冲突处理）
// ==========================================
// 追加模式: 新批次并入已存原始订单，组合键（订单号-商品名）已存在的行跳过，已有行优先
// 替换模式: 新批次原样保存
// ==========================================

use crate::domain::order::RawOrder;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMergeStats {
    pub existing_rows: usize,
    pub added_rows: usize,
    pub duplicates_skipped: usize,
}

pub struct ConflictHandler;

impl ConflictHandler {
    /// 合并批次
    ///
    /// # 返回
    /// (待保存的完整原始订单, 统计)
    pub fn merge_batches(
        &self,
        existing: &[RawOrder],
        batch: Vec<RawOrder>,
        append: bool,
    ) -> (Vec<RawOrder>, BatchMergeStats) {
        if !append {
            let added_rows = batch.len();
            return (
                batch,
                BatchMergeStats {
                    existing_rows: 0,
                    added_rows,
                    duplicates_skipped: 0,
                },
            );
        }

        let existing_keys: HashSet<String> = existing.iter().map(RawOrder::composite_key).collect();
        let incoming = batch.len();
        let fresh: Vec<RawOrder> = batch
            .into_iter()
            .filter(|o| !existing_keys.contains(&o.composite_key()))
            .collect();

        let stats = BatchMergeStats {
            existing_rows: existing.len(),
            added_rows: fresh.len(),
            duplicates_skipped: incoming - fresh.len(),
        };

        let mut merged = Vec::with_capacity(existing.len() + fresh.len());
        merged.extend(existing.iter().cloned());
        merged.extend(fresh);
        (merged, stats)
    }

    /// 检测同批次内重复组合键
    ///
    /// # 返回
    /// - Vec<(行号, 组合键)>: 重复记录（不包括第一次出现），行号从 1 开始
    pub fn detect_duplicates(&self, batch: &[RawOrder]) -> Vec<(usize, String)> {
        let mut first_occurrence: HashMap<String, usize> = HashMap::new();
        let mut duplicates = Vec::new();

        for (idx, order) in batch.iter().enumerate() {
            let key = order.composite_key();
            if first_occurrence.contains_key(&key) {
                duplicates.push((idx + 1, key));
            } else {
                first_occurrence.insert(key, idx + 1);
            }
        }

        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(number: &str, product: &str) -> RawOrder {
        RawOrder {
            order_number: number.to_string(),
            product_name: product.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_append_skips_existing_keys() {
        let existing = vec![order("A", "P"), order("B", "P")];
        let batch = vec![order("A", "P"), order("A", "Q"), order("C", "P")];

        let (merged, stats) = ConflictHandler.merge_batches(&existing, batch, true);
        assert_eq!(merged.len(), 4);
        assert_eq!(stats.existing_rows, 2);
        assert_eq!(stats.added_rows, 2);
        assert_eq!(stats.duplicates_skipped, 1);
        assert_eq!(merged[2].composite_key(), "A-Q");
    }

    #[test]
    fn test_replace_keeps_batch_only() {
        let existing = vec![order("A", "P")];
        let (merged, stats) = ConflictHandler.merge_batches(&existing, vec![order("Z", "P")], false);
        assert_eq!(merged, vec![order("Z", "P")]);
        assert_eq!(stats.existing_rows, 0);
    }

    #[test]
    fn test_detect_in_batch_duplicates() {
        let batch = vec![order("A", "P"), order("B", "P"), order("A", "P")];
        assert_eq!(
            ConflictHandler.detect_duplicates(&batch),
            vec![(3, "A-P".to_string())]
        );
    }
}
