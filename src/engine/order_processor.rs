// ==========================================
// 订单对账系统 - 订单处理器
// ==========================================
// 职责: RawOrder + 目录 + 费率 → ProcessedOrder
// 红线: 已删除订单号在此处被拦截，永不进入报表
// 失败策略: 单条失败只丢弃该条，批次继续
// ==========================================

use crate::domain::catalog::Catalog;
use crate::domain::fee_rule::FeeRuleSet;
use crate::domain::order::{
    ProcessedOrder, RawOrder, COL_ORDER_NUMBER, COL_PRODUCT_NAME, COL_QUANTITY,
    COL_SELLING_PRICE,
};
use crate::domain::report::DeletedOrderSet;
use crate::domain::types::{order_key, CellValue};
use crate::engine::catalog_resolver::CatalogResolver;
use crate::engine::error::OrderProcessError;
use crate::engine::fee_calculator::FeeCalculator;
use crate::engine::settings::ReconSettings;
use crate::engine::value_normalizer::{normalize_finite, normalize_money_value};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

// ==========================================
// 处理结果
// ==========================================

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    Processed(ProcessedOrder),
    SkippedDeleted,
}

/// 单条失败记录（行号从 1 开始）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFailure {
    pub row_number: usize,
    pub order_number: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub orders: Vec<ProcessedOrder>,
    pub skipped_deleted: usize,
    pub failures: Vec<OrderFailure>,
}

impl BatchResult {
    /// 除已删除跳过的记录外，其余每一条都失败（至少一条失败）
    ///
    /// 此时结果中没有任何派生订单，不能作为成功返回
    pub fn all_failed(&self, input_len: usize) -> bool {
        !self.failures.is_empty()
            && self.orders.is_empty()
            && self.failures.len() + self.skipped_deleted == input_len
    }

    pub(crate) fn record(&mut self, index: usize, order_number: &str, outcome: Result<ProcessOutcome, OrderProcessError>) {
        match outcome {
            Ok(ProcessOutcome::Processed(order)) => self.orders.push(order),
            Ok(ProcessOutcome::SkippedDeleted) => self.skipped_deleted += 1,
            Err(e) => {
                warn!(row = index + 1, order_number = %order_number, error = %e, "订单处理失败，已跳过");
                self.failures.push(OrderFailure {
                    row_number: index + 1,
                    order_number: order_number.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

// ==========================================
// OrderProcessor
// ==========================================

pub struct OrderProcessor<'a> {
    catalog: CatalogResolver<'a>,
    fees: FeeCalculator<'a>,
    deleted: &'a DeletedOrderSet,
}

impl<'a> OrderProcessor<'a> {
    pub fn new(
        catalog: &'a Catalog,
        fee_rules: &'a FeeRuleSet,
        deleted: &'a DeletedOrderSet,
        settings: &ReconSettings,
    ) -> Self {
        Self {
            catalog: CatalogResolver::new(catalog, settings.default_category.clone()),
            fees: FeeCalculator::new(fee_rules),
            deleted,
        }
    }

    /// 派生单条订单
    ///
    /// # 返回
    /// - Ok(Processed): 派生成功
    /// - Ok(SkippedDeleted): 订单号已在删除集中
    /// - Err: 数量/售价/日期无法解析
    pub fn process_order(&self, raw: &RawOrder) -> Result<ProcessOutcome, OrderProcessError> {
        let order_number = order_key(&raw.order_number);
        if self.deleted.contains(order_number) {
            debug!(order_number = %order_number, "订单已删除，跳过");
            return Ok(ProcessOutcome::SkippedDeleted);
        }

        require_text(COL_ORDER_NUMBER, order_number)?;
        require_text(COL_PRODUCT_NAME, &raw.product_name)?;

        let quantity = require_number(COL_QUANTITY, &raw.quantity)?;
        let selling_price = require_number(COL_SELLING_PRICE, &raw.selling_price)?;
        // 空白优惠券按 0 计
        let voucher = normalize_finite(&raw.seller_voucher).unwrap_or(0.0);

        let variation_name = raw.effective_variation().to_string();
        let category = self.catalog.resolve_category(&raw.product_name);
        let base_price = self
            .catalog
            .resolve_base_price(&raw.product_name, &variation_name);

        let total_base_price = base_price * quantity;
        let subtotal = selling_price * quantity;

        let mp_fee = match resolve_manual_fee(raw.manual_fee.as_ref()) {
            Some(fee) => fee,
            None => self.fees.compute_fee(subtotal, category),
        };

        let earnings = subtotal - mp_fee - voucher;
        let margin = earnings - total_base_price;
        let order_date = parse_order_date(&raw.paid_at)?;

        Ok(ProcessOutcome::Processed(ProcessedOrder {
            order_date,
            order_number: order_number.to_string(),
            product_name: raw.product_name.clone(),
            variation_name,
            quantity,
            base_price,
            total_base_price,
            selling_price,
            subtotal,
            mp_fee,
            voucher,
            earnings,
            margin,
        }))
    }

    /// 批量派生（逐条隔离失败）
    #[instrument(skip(self, raws), fields(count = raws.len()))]
    pub fn process_batch(&self, raws: &[RawOrder]) -> BatchResult {
        let mut result = BatchResult::default();
        for (index, raw) in raws.iter().enumerate() {
            result.record(index, &raw.order_number, self.process_order(raw));
        }
        debug!(
            processed = result.orders.len(),
            skipped_deleted = result.skipped_deleted,
            failed = result.failures.len(),
            "批量派生完成"
        );
        result
    }
}

// ==========================================
// 字段辅助
// ==========================================

/// 人工平台费：存在且可解析为有限数值时生效（含 0 与负数）
pub fn resolve_manual_fee(manual_fee: Option<&CellValue>) -> Option<f64> {
    let cell = manual_fee?;
    if cell.is_blank() {
        return None;
    }
    let fee = normalize_finite(cell);
    if fee.is_none() {
        warn!(value = %cell, "人工平台费无法解析，改用规则计算");
    }
    fee
}

fn require_text(field: &str, value: &str) -> Result<(), OrderProcessError> {
    if value.trim().is_empty() {
        return Err(OrderProcessError::MissingField {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn require_number(field: &str, value: &CellValue) -> Result<f64, OrderProcessError> {
    let n = normalize_money_value(value);
    if n.is_finite() {
        Ok(n)
    } else {
        Err(OrderProcessError::InvalidNumber {
            field: field.to_string(),
            value: value.to_text(),
        })
    }
}

// ==========================================
// 日期解析
// ==========================================

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// 解析支付时间（无时区的时间按 UTC 处理）
pub fn parse_order_date(raw: &str) -> Result<DateTime<Utc>, OrderProcessError> {
    let s = raw.trim();
    let invalid = || OrderProcessError::InvalidDate {
        value: raw.to_string(),
    };
    if s.is_empty() {
        return Err(invalid());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(Utc.from_utc_datetime(&naive));
            }
        }
    }
    if let Ok(serial) = s.parse::<f64>() {
        return excel_serial_to_datetime(serial).ok_or_else(invalid);
    }
    Err(invalid())
}

/// Excel 序列日期（1900 日期系统，纪元 1899-12-30）
fn excel_serial_to_datetime(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() || serial <= 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let naive = epoch.checked_add_signed(Duration::milliseconds(millis))?;
    Some(Utc.from_utc_datetime(&naive))
}
