// ==========================================
// 订单对账系统 - 人工录入订单
// ==========================================
// 与导入路径的差异:
//   - 数值宽松前缀解析（数量默认 1，金额默认 0）
//   - 规格未命中时退回商品第一条规格的成本价
//   - 平台费总是人工值，不做规则计算
// 删除集照常拦截
// ==========================================

use crate::domain::catalog::Catalog;
use crate::domain::order::{ProcessedOrder, RawOrder, COL_ORDER_NUMBER, COL_PRODUCT_NAME};
use crate::domain::report::DeletedOrderSet;
use crate::domain::types::order_key;
use crate::engine::catalog_resolver::CatalogResolver;
use crate::engine::error::OrderProcessError;
use crate::engine::order_processor::{parse_order_date, BatchResult, ProcessOutcome};
use crate::engine::settings::ReconSettings;
use crate::engine::value_normalizer::{lenient_float, lenient_int};
use tracing::instrument;

pub struct ManualEntryProcessor<'a> {
    catalog: CatalogResolver<'a>,
    deleted: &'a DeletedOrderSet,
}

impl<'a> ManualEntryProcessor<'a> {
    pub fn new(catalog: &'a Catalog, deleted: &'a DeletedOrderSet, settings: &ReconSettings) -> Self {
        Self {
            catalog: CatalogResolver::new(catalog, settings.default_category.clone()),
            deleted,
        }
    }

    pub fn process_entry(&self, entry: &RawOrder) -> Result<ProcessOutcome, OrderProcessError> {
        let order_number = order_key(&entry.order_number);
        if self.deleted.contains(order_number) {
            return Ok(ProcessOutcome::SkippedDeleted);
        }
        for (field, value) in [
            (COL_ORDER_NUMBER, order_number),
            (COL_PRODUCT_NAME, entry.product_name.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(OrderProcessError::MissingField {
                    field: field.to_string(),
                });
            }
        }

        let quantity = match lenient_int(&entry.quantity) {
            Some(q) if q != 0 => q as f64,
            _ => 1.0,
        };
        let selling_price = lenient_float(&entry.selling_price).unwrap_or(0.0);
        let mp_fee = entry
            .manual_fee
            .as_ref()
            .and_then(lenient_float)
            .unwrap_or(0.0);
        let voucher = lenient_float(&entry.seller_voucher).unwrap_or(0.0);
        let variation_name = entry.variation_name.clone().unwrap_or_default();

        let base_price = self
            .catalog
            .resolve_base_price_or_first(&entry.product_name, &variation_name);
        let total_base_price = base_price * quantity;
        let subtotal = selling_price * quantity;
        let earnings = subtotal - mp_fee - voucher;
        let margin = earnings - total_base_price;
        let order_date = parse_order_date(&entry.paid_at)?;

        Ok(ProcessOutcome::Processed(ProcessedOrder {
            order_date,
            order_number: order_number.to_string(),
            product_name: entry.product_name.trim().to_string(),
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

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub fn process_batch(&self, entries: &[RawOrder]) -> BatchResult {
        let mut result = BatchResult::default();
        for (index, entry) in entries.iter().enumerate() {
            result.record(index, &entry.order_number, self.process_entry(entry));
        }
        result
    }
}
