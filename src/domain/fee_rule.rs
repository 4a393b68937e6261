// ==========================================
// 订单对账系统 - 平台费率规则模型
// ==========================================
// 约束: 每个类目至多一个规则组；组内各规则独立封顶后求和
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeeRuleSet {
    #[serde(default)]
    pub rules: Vec<FeeRuleGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRuleGroup {
    pub category: String,
    #[serde(default)]
    pub fee_rules: Vec<FeeRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// 百分比（2 表示 2%）
    pub value: f64,

    /// 单条规则封顶金额（缺失或 0 表示不封顶）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee: Option<f64>,
}

impl FeeRule {
    pub fn percent(value: f64) -> Self {
        Self {
            name: None,
            value,
            max_fee: None,
        }
    }

    pub fn capped(value: f64, max_fee: f64) -> Self {
        Self {
            name: None,
            value,
            max_fee: Some(max_fee),
        }
    }
}
