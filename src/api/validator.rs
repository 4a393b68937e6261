// ==========================================
// 订单对账系统 - 主数据校验器
// ==========================================
// 职责: 商品目录 / 费率规则写入前校验
// 规则:
//   - 商品名、规格名、类目非空
//   - 商品名大小写不敏感唯一；规格名在商品内大小写不敏感唯一
//   - 成本价为非负有限数
//   - 每个类目至多一个规则组；百分比有限；封顶非负
// ==========================================

use std::collections::HashSet;

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::domain::catalog::Catalog;
use crate::domain::fee_rule::FeeRuleSet;

pub struct MasterDataValidator;

fn violation(kind: &str, location: String, reason: impl Into<String>) -> ValidationViolation {
    ValidationViolation {
        violation_type: kind.to_string(),
        location,
        reason: reason.into(),
    }
}

impl MasterDataValidator {
    /// 校验商品目录，返回全部违规项
    pub fn check_catalog(&self, catalog: &Catalog) -> Vec<ValidationViolation> {
        let mut violations = Vec::new();
        let mut product_names = HashSet::new();

        for (pi, product) in catalog.products.iter().enumerate() {
            let loc = format!("products[{}]", pi);
            let name = product.product_name.trim();
            if name.is_empty() {
                violations.push(violation("EMPTY_NAME", loc.clone(), "商品名为空"));
            } else if !product_names.insert(name.to_lowercase()) {
                violations.push(violation("DUPLICATE_NAME", loc.clone(), format!("商品名重复: {}", name)));
            }
            if product.category.trim().is_empty() {
                violations.push(violation("EMPTY_CATEGORY", loc.clone(), "类目为空"));
            }

            let mut variation_names = HashSet::new();
            for (vi, variation) in product.variations.iter().enumerate() {
                let vloc = format!("{}.variations[{}]", loc, vi);
                let vname = variation.name.trim();
                if vname.is_empty() {
                    violations.push(violation("EMPTY_NAME", vloc.clone(), "规格名为空"));
                } else if !variation_names.insert(vname.to_lowercase()) {
                    violations.push(violation("DUPLICATE_NAME", vloc.clone(), format!("规格名重复: {}", vname)));
                }
                if !variation.base_price.is_finite() || variation.base_price < 0.0 {
                    violations.push(violation(
                        "INVALID_PRICE",
                        vloc,
                        format!("成本价必须为非负数: {}", variation.base_price),
                    ));
                }
            }
        }

        violations
    }

    /// 校验费率规则，返回全部违规项
    pub fn check_fee_rules(&self, rules: &FeeRuleSet) -> Vec<ValidationViolation> {
        let mut violations = Vec::new();
        let mut categories = HashSet::new();

        for (gi, group) in rules.rules.iter().enumerate() {
            let loc = format!("rules[{}]", gi);
            let category = group.category.trim();
            if category.is_empty() {
                violations.push(violation("EMPTY_CATEGORY", loc.clone(), "类目为空"));
            } else if !categories.insert(category.to_string()) {
                violations.push(violation(
                    "DUPLICATE_CATEGORY",
                    loc.clone(),
                    format!("类目规则组重复: {}", category),
                ));
            }

            for (ri, rule) in group.fee_rules.iter().enumerate() {
                let rloc = format!("{}.fee_rules[{}]", loc, ri);
                if !rule.value.is_finite() {
                    violations.push(violation("INVALID_PERCENT", rloc.clone(), "百分比必须为有限数"));
                }
                if let Some(cap) = rule.max_fee {
                    if !cap.is_finite() || cap < 0.0 {
                        violations.push(violation("INVALID_CAP", rloc, format!("封顶金额必须为非负数: {}", cap)));
                    }
                }
            }
        }

        violations
    }

    /// 违规项非空 → ValidationFailed
    pub fn ensure_valid(&self, what: &str, violations: Vec<ValidationViolation>) -> ApiResult<()> {
        if violations.is_empty() {
            return Ok(());
        }
        Err(ApiError::ValidationFailed {
            reason: format!("{}存在 {} 处错误", what, violations.len()),
            violations,
        })
    }
}
