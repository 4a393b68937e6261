// ==========================================
// 订单对账系统 - 商品目录解析
// ==========================================
// 职责: 按商品名/规格名（大小写不敏感）查询类目与成本价
// 约束: 目录中出现重复商品名时，第一条生效
// ==========================================

use crate::domain::catalog::{Catalog, Product};
use std::collections::HashMap;
use tracing::warn;

/// 目录查询索引（一次构建，批内复用）
pub struct CatalogResolver<'a> {
    products: HashMap<String, &'a Product>,
    default_category: String,
}

impl<'a> CatalogResolver<'a> {
    /// 构建索引
    ///
    /// # 参数
    /// - catalog: 商品目录
    /// - default_category: 未命中时使用的类目
    pub fn new(catalog: &'a Catalog, default_category: impl Into<String>) -> Self {
        let mut products = HashMap::with_capacity(catalog.products.len());
        for product in &catalog.products {
            products
                .entry(product.product_name.to_lowercase())
                .or_insert(product);
        }
        Self {
            products,
            default_category: default_category.into(),
        }
    }

    pub fn find_product(&self, product_name: &str) -> Option<&'a Product> {
        self.products.get(&product_name.to_lowercase()).copied()
    }

    /// 类目查询（未命中 → 默认类目）
    pub fn resolve_category(&self, product_name: &str) -> &str {
        match self.find_product(product_name) {
            Some(product) => product.category.as_str(),
            None => {
                warn!(
                    product_name = %product_name,
                    default_category = %self.default_category,
                    "商品未在目录中找到，使用默认类目"
                );
                self.default_category.as_str()
            }
        }
    }

    /// 成本价查询（商品或规格未命中 → 0）
    pub fn resolve_base_price(&self, product_name: &str, variation_name: &str) -> f64 {
        let Some(product) = self.find_product(product_name) else {
            warn!(product_name = %product_name, "商品未在目录中找到，成本价按 0 计");
            return 0.0;
        };
        match find_variation_price(product, variation_name) {
            Some(price) => price,
            None => {
                warn!(
                    product_name = %product_name,
                    variation_name = %variation_name,
                    "规格未在目录中找到，成本价按 0 计"
                );
                0.0
            }
        }
    }

    /// 成本价查询（人工录入路径：规格未命中时退回第一条规格）
    pub fn resolve_base_price_or_first(&self, product_name: &str, variation_name: &str) -> f64 {
        let Some(product) = self.find_product(product_name) else {
            warn!(product_name = %product_name, "商品未在目录中找到，成本价按 0 计");
            return 0.0;
        };
        find_variation_price(product, variation_name)
            .or_else(|| {
                warn!(
                    product_name = %product_name,
                    variation_name = %variation_name,
                    "规格未找到，退回第一条规格"
                );
                product.variations.first().map(|v| v.base_price)
            })
            .unwrap_or(0.0)
    }
}

fn find_variation_price(product: &Product, variation_name: &str) -> Option<f64> {
    let needle = variation_name.to_lowercase();
    product
        .variations
        .iter()
        .find(|v| v.name.to_lowercase() == needle)
        .map(|v| v.base_price)
}
