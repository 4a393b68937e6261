// ==========================================
// 订单对账系统 - 平台费计算
// ==========================================
// 公式: fee(rule) = subtotal × value / 100，有封顶时取 min
//       总费用 = 类目下各规则费用之和
// 类目无规则组 → 0
// ==========================================

use crate::domain::fee_rule::{FeeRule, FeeRuleGroup, FeeRuleSet};
use std::collections::HashMap;
use tracing::warn;

pub struct FeeCalculator<'a> {
    groups: HashMap<&'a str, &'a FeeRuleGroup>,
}

impl<'a> FeeCalculator<'a> {
    pub fn new(rule_set: &'a FeeRuleSet) -> Self {
        let mut groups = HashMap::with_capacity(rule_set.rules.len());
        for group in &rule_set.rules {
            groups.entry(group.category.as_str()).or_insert(group);
        }
        Self { groups }
    }

    /// 计算订单行平台费
    ///
    /// # 参数
    /// - subtotal: 售价 × 数量
    /// - category: 商品类目（精确匹配）
    pub fn compute_fee(&self, subtotal: f64, category: &str) -> f64 {
        match self.groups.get(category) {
            Some(group) => group
                .fee_rules
                .iter()
                .map(|rule| rule_fee(rule, subtotal))
                .sum(),
            None => {
                warn!(category = %category, "类目无费率规则，平台费按 0 计");
                0.0
            }
        }
    }
}

/// 单条规则费用（max_fee 缺失或为 0 时不封顶）
pub fn rule_fee(rule: &FeeRule, subtotal: f64) -> f64 {
    let fee = subtotal * rule.value / 100.0;
    match rule.max_fee {
        Some(cap) if cap > 0.0 => fee.min(cap),
        _ => fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_set() -> FeeRuleSet {
        FeeRuleSet {
            rules: vec![
                FeeRuleGroup {
                    category: "A".to_string(),
                    fee_rules: vec![FeeRule::capped(5.0, 10000.0), FeeRule::percent(2.0)],
                },
                FeeRuleGroup {
                    category: "B".to_string(),
                    fee_rules: vec![FeeRule::percent(5.0)],
                },
                FeeRuleGroup {
                    category: "Z".to_string(),
                    fee_rules: vec![FeeRule::capped(4.0, 0.0)],
                },
            ],
        }
    }

    #[test]
    fn test_rules_capped_then_summed() {
        let rules = rule_set();
        let calc = FeeCalculator::new(&rules);
        // 5% of 1,000,000 = 50,000 → 封顶 10,000；2% = 20,000
        assert_eq!(calc.compute_fee(1_000_000.0, "A"), 30000.0);
    }

    #[test]
    fn test_under_cap() {
        let rules = rule_set();
        let calc = FeeCalculator::new(&rules);
        assert_eq!(calc.compute_fee(100_000.0, "A"), 7000.0);
        assert_eq!(calc.compute_fee(100_000.0, "B"), 5000.0);
    }

    #[test]
    fn test_zero_cap_means_uncapped() {
        let rules = rule_set();
        let calc = FeeCalculator::new(&rules);
        assert_eq!(calc.compute_fee(1_000_000.0, "Z"), 40000.0);
    }

    #[test]
    fn test_unknown_category_is_free() {
        let rules = rule_set();
        let calc = FeeCalculator::new(&rules);
        assert_eq!(calc.compute_fee(100_000.0, "Q"), 0.0);
        assert_eq!(calc.compute_fee(100_000.0, "b"), 0.0);
    }
}
