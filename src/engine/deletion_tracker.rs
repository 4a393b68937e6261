// ==========================================
// 订单对账系统 - 删除跟踪
// ==========================================
// 两条入口:
//   1. 显式删除: 请求中的订单号并入删除集（幂等）
//   2. 隐式推断: 源数据中存在、上一份报表中缺失的订单号视为被人工移除
// 键: 仅订单号（不含商品名）
// ==========================================

use crate::domain::order::RawOrder;
use crate::domain::report::{DeletedOrderSet, Report};
use crate::domain::types::order_key;
use tracing::{debug, info, instrument};

#[derive(Debug, Default, Clone, Copy)]
pub struct DeletionTracker;

impl DeletionTracker {
    pub fn new() -> Self {
        Self
    }

    /// 显式删除
    ///
    /// # 返回
    /// 本次新加入删除集的订单号（已存在的忽略）
    pub fn record_explicit(&self, set: &mut DeletedOrderSet, order_numbers: &[String]) -> Vec<String> {
        let mut added = Vec::new();
        for number in order_numbers {
            let number = order_key(number);
            if number.is_empty() {
                continue;
            }
            if set.insert(number) {
                added.push(number.to_string());
            }
        }
        if !added.is_empty() {
            info!(added = added.len(), total = set.len(), "显式删除已记录");
        }
        added
    }

    /// 隐式删除推断
    ///
    /// # 参数
    /// - source: 推断用源订单（上一份报表应已见过的订单）
    /// - prior: 上一份持久化报表；None 时不推断
    /// - set: 删除集（就地扩充）
    ///
    /// # 返回
    /// 新推断出的订单号（按源数据顺序，去重）
    #[instrument(skip_all, fields(source = source.len()))]
    pub fn infer_silent_deletions(
        &self,
        source: &[RawOrder],
        prior: Option<&Report>,
        set: &mut DeletedOrderSet,
    ) -> Vec<String> {
        let Some(report) = prior else {
            return Vec::new();
        };
        let in_report = report.order_numbers();

        let mut inferred = Vec::new();
        for raw in source {
            let number = order_key(&raw.order_number);
            if number.is_empty() || in_report.contains(number) || set.contains(number) {
                continue;
            }
            // insert 返回 false 说明本批已推断过
            if set.insert(number) {
                debug!(order_number = %number, "推断为人工删除");
                inferred.push(number.to_string());
            }
        }

        if !inferred.is_empty() {
            info!(inferred = inferred.len(), total = set.len(), "隐式删除推断完成");
        }
        inferred
    }
}
