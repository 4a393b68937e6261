// ==========================================
// 订单对账系统 - 订单领域模型
// ==========================================
// RawOrder: 导入层写入（表格行投影后的原始订单）
// ProcessedOrder: 引擎层派生，只随 Report 持久化
// ==========================================

use crate::domain::types::{composite_key, CellValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ===== 源表格列名（平台导出格式）=====
pub const COL_ORDER_NUMBER: &str = "No. Pesanan";
pub const COL_ORDER_STATUS: &str = "Status Pesanan";
pub const COL_PAID_AT: &str = "Waktu Pembayaran Dilakukan";
pub const COL_PRODUCT_NAME: &str = "Nama Produk";
pub const COL_VARIATION_NAME: &str = "Nama Variasi";
pub const COL_SELLING_PRICE: &str = "Harga Setelah Diskon";
pub const COL_QUANTITY: &str = "Jumlah";
pub const COL_SELLER_VOUCHER: &str = "Voucher Ditanggung Penjual";
pub const COL_MANUAL_FEE: &str = "MP Fee Manual";

/// 导入时保留的列（顺序即投影顺序）
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_ORDER_NUMBER,
    COL_ORDER_STATUS,
    COL_PAID_AT,
    COL_PRODUCT_NAME,
    COL_VARIATION_NAME,
    COL_SELLING_PRICE,
    COL_QUANTITY,
    COL_SELLER_VOUCHER,
];

// ==========================================
// RawOrder - 原始订单行
// ==========================================
// 序列化键沿用平台导出列名，与已存储的 orders 集合兼容
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawOrder {
    #[serde(rename = "No. Pesanan")]
    pub order_number: String,

    #[serde(rename = "Status Pesanan", default)]
    pub order_status: String,

    #[serde(rename = "Waktu Pembayaran Dilakukan", default)]
    pub paid_at: String,

    #[serde(rename = "Nama Produk")]
    pub product_name: String,

    #[serde(rename = "Nama Variasi", default, skip_serializing_if = "Option::is_none")]
    pub variation_name: Option<String>,

    #[serde(rename = "Jumlah", default)]
    pub quantity: CellValue,

    #[serde(rename = "Harga Setelah Diskon", default)]
    pub selling_price: CellValue,

    #[serde(rename = "Voucher Ditanggung Penjual", default)]
    pub seller_voucher: CellValue,

    #[serde(rename = "MP Fee Manual", default, skip_serializing_if = "Option::is_none")]
    pub manual_fee: Option<CellValue>,
}

impl RawOrder {
    /// 生效的规格名：缺失或空白时取商品名
    pub fn effective_variation(&self) -> &str {
        match self.variation_name.as_deref() {
            Some(v) if !v.trim().is_empty() => v,
            _ => &self.product_name,
        }
    }

    pub fn composite_key(&self) -> String {
        composite_key(&self.order_number, &self.product_name)
    }
}

// ==========================================
// ProcessedOrder - 派生后的订单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedOrder {
    pub order_date: DateTime<Utc>,
    pub order_number: String,
    pub product_name: String,
    pub variation_name: String,
    pub quantity: f64,
    pub base_price: f64,
    pub total_base_price: f64, // base_price × quantity
    pub selling_price: f64,    // 单价（折后）
    pub subtotal: f64,         // selling_price × quantity
    pub mp_fee: f64,           // 平台费（人工覆写优先）
    pub voucher: f64,          // 卖家承担的优惠券
    pub earnings: f64,         // subtotal − mp_fee − voucher
    pub margin: f64,           // earnings − total_base_price
}

impl ProcessedOrder {
    pub fn composite_key(&self) -> String {
        composite_key(&self.order_number, &self.product_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_order_deserialize_export_keys() {
        let json = r#"{
            "No. Pesanan": "X1",
            "Status Pesanan": "Selesai",
            "Waktu Pembayaran Dilakukan": "2025-04-18 10:23",
            "Nama Produk": "Widget",
            "Nama Variasi": "",
            "Harga Setelah Diskon": "50.000",
            "Jumlah": 2,
            "Voucher Ditanggung Penjual": "0",
            "MP Fee Manual": null
        }"#;
        let order: RawOrder = serde_json::from_str(json).unwrap();

        assert_eq!(order.order_number, "X1");
        assert_eq!(order.quantity, CellValue::Number(2.0));
        assert_eq!(order.manual_fee, None);
        assert_eq!(order.effective_variation(), "Widget");
        assert_eq!(order.composite_key(), "X1-Widget");
    }

    #[test]
    fn test_processed_order_camel_case() {
        let order = ProcessedOrder {
            order_date: "2025-04-18T10:23:00Z".parse().unwrap(),
            order_number: "X1".to_string(),
            product_name: "Widget".to_string(),
            variation_name: "Red".to_string(),
            quantity: 2.0,
            base_price: 20000.0,
            total_base_price: 40000.0,
            selling_price: 50000.0,
            subtotal: 100000.0,
            mp_fee: 5000.0,
            voucher: 0.0,
            earnings: 95000.0,
            margin: 55000.0,
        };
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(value["orderNumber"], "X1");
        assert_eq!(value["mpFee"], 5000.0);
        assert_eq!(value["totalBasePrice"], 40000.0);
        assert!(value["orderDate"].as_str().unwrap().starts_with("2025-04-18T10:23:00"));
    }
}
