// ==========================================
// 订单对账系统 - 报表领域模型
// ==========================================
// 红线: summary 永远由 orders 全量重算，不得单独增量修补
// 持久化形状: { generatedAt, summary: { totalOrders, totalEarnings, averageMargin }, orders }
// ==========================================

use crate::domain::order::ProcessedOrder;
use crate::domain::types::order_key;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// ReportSummary - 报表汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_orders: usize,
    pub total_earnings: f64,
    pub average_margin: f64, // 百分比: total_margin / total_earnings × 100
}

// ==========================================
// Report - 订单利润报表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    // 旧版报表文件无该字段，读取时以当前时间补齐
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,

    #[serde(default)]
    pub summary: ReportSummary,

    pub orders: Vec<ProcessedOrder>,
}

impl Report {
    /// 报表中出现过的订单号集合
    pub fn order_numbers(&self) -> HashSet<&str> {
        self.orders.iter().map(|o| order_key(&o.order_number)).collect()
    }

    /// 组合键集合（订单号-商品名）
    pub fn composite_keys(&self) -> HashSet<String> {
        self.orders.iter().map(|o| o.composite_key()).collect()
    }
}

// ==========================================
// DeletedOrderSet - 永久删除订单号集合
// ==========================================
// 只增不减；保留插入顺序以便原样持久化
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeletedOrderSet {
    order_numbers: Vec<String>,
    index: HashSet<String>,
}

impl DeletedOrderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从持久化列表构建（重复项忽略）
    pub fn from_list<I, S>(list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for n in list {
            set.insert(n);
        }
        set
    }

    /// 加入订单号（按 order_key 归一），返回是否为新增；空白订单号忽略
    pub fn insert<S: Into<String>>(&mut self, order_number: S) -> bool {
        let order_number = order_number.into();
        let order_number = order_key(&order_number).to_string();
        if order_number.is_empty() || self.index.contains(&order_number) {
            return false;
        }
        self.index.insert(order_number.clone());
        self.order_numbers.push(order_number);
        true
    }

    pub fn contains(&self, order_number: &str) -> bool {
        self.index.contains(order_key(order_number))
    }

    pub fn len(&self) -> usize {
        self.order_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order_numbers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order_numbers.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order_numbers
    }
}
